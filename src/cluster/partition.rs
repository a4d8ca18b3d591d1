//! Flat clusterings of a document set.

use crate::error::{Error, Result};
use crate::similarity::SimilarityMatrix;

/// A partition of `{0, …, n-1}` into nonempty, disjoint clusters.
///
/// Members of each cluster are sorted ascending. Cluster order is the
/// order the producing algorithm assigns (surviving cluster id for
/// agglomerative runs, creation order for divisive runs), and
/// `labels()[doc]` is the position of `doc`'s cluster in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    clusters: Vec<Vec<usize>>,
    labels: Vec<usize>,
}

impl Partition {
    /// Build from explicit clusters over `n_items` documents.
    ///
    /// Fails unless every document in `0..n_items` appears in exactly one
    /// nonempty cluster.
    pub fn new(mut clusters: Vec<Vec<usize>>, n_items: usize) -> Result<Self> {
        if n_items == 0 {
            return Err(Error::EmptyInput);
        }
        let mut labels = vec![usize::MAX; n_items];
        for (c, members) in clusters.iter_mut().enumerate() {
            if members.is_empty() {
                return Err(Error::InvalidParameter {
                    name: "clusters",
                    message: "clusters must be nonempty",
                });
            }
            members.sort_unstable();
            for &doc in members.iter() {
                let slot = labels.get_mut(doc).ok_or(Error::InvalidParameter {
                    name: "clusters",
                    message: "document index out of range",
                })?;
                if *slot != usize::MAX {
                    return Err(Error::InvalidParameter {
                        name: "clusters",
                        message: "document assigned to more than one cluster",
                    });
                }
                *slot = c;
            }
        }
        if labels.contains(&usize::MAX) {
            return Err(Error::InvalidParameter {
                name: "clusters",
                message: "every document must be assigned to a cluster",
            });
        }
        Ok(Self { clusters, labels })
    }

    /// Build from one cluster label per document.
    ///
    /// Labels need not be consecutive; clusters are ordered by label.
    pub fn from_labels(labels: &[usize]) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::EmptyInput);
        }
        let mut distinct = labels.to_vec();
        distinct.sort_unstable();
        distinct.dedup();

        let mut clusters = vec![Vec::new(); distinct.len()];
        let mut dense = Vec::with_capacity(labels.len());
        for (doc, label) in labels.iter().enumerate() {
            // `distinct` holds every label, so the search always hits.
            let c = distinct.binary_search(label).unwrap_or_default();
            clusters[c].push(doc);
            dense.push(c);
        }
        Ok(Self {
            clusters,
            labels: dense,
        })
    }

    /// Every document in its own cluster, cluster `i` holding document `i`.
    pub fn singletons(n_items: usize) -> Result<Self> {
        Self::new((0..n_items).map(|i| vec![i]).collect(), n_items)
    }

    /// Number of documents covered.
    pub fn n_items(&self) -> usize {
        self.labels.len()
    }

    /// Number of clusters.
    pub fn n_clusters(&self) -> usize {
        self.clusters.len()
    }

    /// Clusters, each sorted ascending.
    pub fn clusters(&self) -> &[Vec<usize>] {
        &self.clusters
    }

    /// Members of cluster `c`.
    pub fn cluster(&self, c: usize) -> &[usize] {
        &self.clusters[c]
    }

    /// Cluster position of each document.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Cluster position of `doc`.
    pub fn label_of(&self, doc: usize) -> usize {
        self.labels[doc]
    }

    /// Whether two documents share a cluster.
    pub fn same_cluster(&self, a: usize, b: usize) -> bool {
        self.labels[a] == self.labels[b]
    }

    /// Average similarity of each cluster, in cluster order.
    ///
    /// The mean of `sim(a, b)` over all ordered member pairs, self pairs
    /// included, so a singleton scores its self-similarity (1.0).
    pub fn average_similarities(&self, sims: &SimilarityMatrix) -> Vec<f64> {
        self.clusters
            .iter()
            .map(|members| sims.average_similarity(members))
            .collect()
    }
}
