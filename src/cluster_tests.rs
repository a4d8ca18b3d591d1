#[cfg(test)]
mod tests {
    use crate::cluster::{Agglomerative, Clustering, Divisive};
    use crate::corpus::DocumentCollection;
    use crate::metrics::pair_agreement;
    use crate::similarity::SimilarityMatrix;
    use crate::{Error, Result};
    use proptest::prelude::*;

    // Two topics over a six-term vocabulary, 1-indexed on disk.
    const TWO_TOPICS: &str = "\
6
6
14
1 1 4
1 2 3
2 1 5
2 2 2
2 3 1
3 1 3
3 2 4
4 4 5
4 5 2
5 4 3
5 5 4
5 6 1
6 5 5
6 6 3
";

    #[test]
    fn test_pipeline_three_documents() -> Result<()> {
        let docs = DocumentCollection::parse("3 2 3\n1 1 1\n2 1 1\n3 2 1\n")?;
        let sims = SimilarityMatrix::from_collection(&docs)?;
        assert!((sims.get(0, 1) - 1.0).abs() < 1e-12);
        assert_eq!(sims.get(0, 2), 0.0);
        assert_eq!(sims.get(1, 2), 0.0);

        let (hac, dendro) = Agglomerative::new(2).fit_dendrogram(&sims)?;
        assert_eq!(hac.clusters(), &[vec![0, 1], vec![2]]);
        assert_eq!(dendro.merges()[0].destination, 0);
        assert_eq!(dendro.merges()[0].source, 1);

        let hdc = Divisive::new(2).with_seed(11).fit(&sims)?;
        assert!(hdc.same_cluster(0, 1));
        assert!(!hdc.same_cluster(0, 2));

        let agreement = pair_agreement(&hac, &hdc)?;
        assert!((agreement.composite() - 1.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_both_clusterers_recover_topics() -> Result<()> {
        let docs = DocumentCollection::parse(TWO_TOPICS)?;
        let sims = SimilarityMatrix::from_collection(&docs)?;

        let hac = Agglomerative::new(2).fit(&sims)?;
        let hdc = Divisive::new(2).with_seed(2024).with_trials(25).fit(&sims)?;
        assert_eq!(hac.clusters(), &[vec![0, 1, 2], vec![3, 4, 5]]);

        let agreement = pair_agreement(&hac, &hdc)?;
        assert!((agreement.positive - 18.0 / 36.0).abs() < 1e-12);
        assert!((agreement.negative - 18.0 / 36.0).abs() < 1e-12);
        assert!(agreement.disagreement().abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_cohesion_reported_per_cluster() -> Result<()> {
        let docs = DocumentCollection::parse(TWO_TOPICS)?;
        let sims = SimilarityMatrix::from_collection(&docs)?;
        let hac = Agglomerative::new(3).fit(&sims)?;
        let cohesion = hac.average_similarities(&sims);
        assert_eq!(cohesion.len(), 3);
        for (members, avg) in hac.clusters().iter().zip(&cohesion) {
            assert!(*avg > 0.0 && *avg <= 1.0 + 1e-9);
            if members.len() == 1 {
                assert!((avg - 1.0).abs() < 1e-9);
            }
        }
        Ok(())
    }

    #[test]
    fn test_one_cluster_each_agrees_fully() -> Result<()> {
        let docs = DocumentCollection::parse(TWO_TOPICS)?;
        let sims = SimilarityMatrix::from_collection(&docs)?;
        let hac = Agglomerative::new(1).fit(&sims)?;
        let hdc = Divisive::new(1).fit(&sims)?;
        let agreement = pair_agreement(&hac, &hdc)?;
        assert_eq!(agreement.positive, 1.0);
        assert_eq!(agreement.negative, 0.0);
        Ok(())
    }

    #[test]
    fn test_failures_are_local() -> Result<()> {
        let docs = DocumentCollection::parse(TWO_TOPICS)?;
        let sims = SimilarityMatrix::from_collection(&docs)?;

        let hac = Agglomerative::new(2).fit(&sims)?;
        assert!(matches!(
            Divisive::new(7).fit(&sims),
            Err(Error::InvalidClusterCount { requested: 7, n_items: 6 })
        ));
        let hdc = Divisive::new(3).with_seed(1).fit(&sims)?;
        assert_eq!(
            pair_agreement(&hac, &hdc),
            Err(Error::MismatchedClusterCount { left: 2, right: 3 })
        );
        // Earlier results are untouched by the failures.
        assert_eq!(hac.n_clusters(), 2);
        assert_eq!(sims.n_items(), 6);
        Ok(())
    }

    #[test]
    fn test_empty_document_needs_explicit_policy() -> Result<()> {
        let docs = DocumentCollection::parse("3 2 2\n1 1 2\n3 2 1\n")?;
        assert_eq!(
            SimilarityMatrix::from_collection(&docs),
            Err(Error::ZeroVector { doc: 1 })
        );
        let (kept_docs, kept) = docs.without_empty_documents();
        let sims = SimilarityMatrix::from_collection(&kept_docs)?;
        let hac = Agglomerative::new(2).fit(&sims)?;
        assert_eq!(kept, vec![0, 2]);
        assert_eq!(hac.n_items(), 2);
        Ok(())
    }

    proptest! {
        #[test]
        fn clusterers_always_produce_partitions(
            counts in proptest::collection::vec(
                proptest::collection::vec(0u32..6, 5),
                2..10,
            ),
            k_frac in 0.0f64..1.0,
            seed in any::<u64>(),
        ) {
            // A distinct tail per document keeps every pair of vectors
            // non-parallel, so every cluster of two or more can be bisected.
            let counts: Vec<Vec<u32>> = counts
                .into_iter()
                .enumerate()
                .map(|(i, mut row)| {
                    row.push(100 + i as u32 * 37);
                    row.push(1);
                    row
                })
                .collect();
            let docs = DocumentCollection::from_dense(&counts).unwrap();
            let sims = SimilarityMatrix::from_collection(&docs).unwrap();
            let n = sims.n_items();
            let k = 1 + ((n - 1) as f64 * k_frac) as usize;

            let hac = Agglomerative::new(k).fit(&sims).unwrap();
            prop_assert_eq!(hac.n_clusters(), k);
            prop_assert_eq!(hac.n_items(), n);

            let hdc = Divisive::new(k).with_seed(seed).with_trials(4).fit(&sims).unwrap();
            prop_assert_eq!(hdc.n_clusters(), k);
            prop_assert_eq!(hdc.n_items(), n);

            let agreement = pair_agreement(&hac, &hdc).unwrap();
            prop_assert!(agreement.composite() <= 1.0 + 1e-12);
            prop_assert!(agreement.positive >= 0.0 && agreement.negative >= 0.0);
        }
    }
}
