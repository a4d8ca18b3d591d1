//! Randomized divisive (top-down) clustering.
//!
//! Start from one cluster holding every document and repeatedly bisect the
//! least cohesive cluster until `k` clusters exist.
//!
//! # One split
//!
//! 1. **Target**: the cluster with the lowest average similarity (mean of
//!    `sim(a, b)` over all ordered member pairs, self pairs included).
//!    Singletons cannot be split and are skipped.
//! 2. **Trials**: pick two distinct members at random as seeds and send every
//!    member to the seed it is more similar to (ties to the first seed).
//!    Seeds are member documents, not computed means. A trial with an empty
//!    side is resampled, up to a fixed budget. Trials that exhaust it are
//!    dropped; the cluster is unsplittable only when every trial is.
//! 3. **Score** each trial by
//!
//!    ```text
//!    cost = cut / intra(S₁) + cut / intra(S₂)
//!    ```
//!
//!    Normalized scoring uses average similarities (`cut` divided by
//!    `|S₁|·|S₂|`, `intra` by `|S|²`); raw scoring uses the plain sums.
//!    Lower is better: little cross similarity, high internal cohesion.
//! 4. **Commit** the cheapest trial (first on ties): the target keeps `S₁`,
//!    a new cluster takes `S₂`.
//!
//! # Layout
//!
//! Clusters are contiguous ranges of one permutation of document indices.
//! A split reorders the target's range so `S₁` comes first and hands the
//! tail to the new cluster, so membership is never spliced element-wise.

use super::partition::Partition;
use super::traits::Clustering;
use crate::error::{Error, Result};
use crate::similarity::SimilarityMatrix;
use rand::prelude::*;
use std::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Randomized divisive clustering.
#[derive(Debug, Clone)]
pub struct Divisive {
    /// Number of clusters to stop at.
    n_clusters: usize,
    /// Random bisections tried per split.
    trials: usize,
    /// Score splits with averages rather than raw sums.
    normalize: bool,
    /// Random seed.
    seed: Option<u64>,
    /// Seed pairs tried per trial before giving up on a cluster.
    max_resamples: usize,
}

/// One committed split, in run order.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRecord {
    /// Cluster that was bisected; it keeps the first side.
    pub target: usize,
    /// Id of the new cluster holding the second side.
    pub created: usize,
    /// Cost of the winning trial.
    pub cost: f64,
    /// Documents moved from `target` to `created`, ascending.
    pub moved: Vec<usize>,
}

/// A candidate bisection and its cost. Discarded unless it wins.
#[derive(Debug, Clone)]
struct SplitTrial {
    first: Vec<usize>,
    second: Vec<usize>,
    cost: f64,
}

impl Divisive {
    /// Create a divisive clusterer that stops at `n_clusters` clusters.
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            trials: 50,
            normalize: true,
            seed: None,
            max_resamples: 1000,
        }
    }

    /// Set the number of random bisections tried per split.
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    /// Choose normalized (average) or raw (sum) split scoring.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set how many seed pairs a trial may draw before the cluster is
    /// declared unsplittable.
    pub fn with_max_resamples(mut self, max_resamples: usize) -> Self {
        self.max_resamples = max_resamples;
        self
    }

    /// Run to `n_clusters` and return the partition with the ordered splits.
    pub fn fit_with_trace(&self, sims: &SimilarityMatrix) -> Result<(Partition, Vec<SplitRecord>)> {
        let n = sims.n_items();
        if self.n_clusters == 0 || self.n_clusters > n {
            return Err(Error::InvalidClusterCount {
                requested: self.n_clusters,
                n_items: n,
            });
        }
        if self.trials == 0 {
            return Err(Error::InvalidParameter {
                name: "trials",
                message: "must be at least 1",
            });
        }
        if self.max_resamples == 0 {
            return Err(Error::InvalidParameter {
                name: "max_resamples",
                message: "must be at least 1",
            });
        }

        log::info!(
            "divisive clustering: {} documents -> {} clusters, {} trials per split",
            n,
            self.n_clusters,
            self.trials
        );

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        let mut arena = RangeArena::new(n);
        let mut trace = Vec::with_capacity(self.n_clusters - 1);

        while arena.len() < self.n_clusters {
            let target = choose_target(&arena, sims).ok_or(Error::InvalidClusterCount {
                requested: self.n_clusters,
                n_items: n,
            })?;

            // One RNG per trial, seeded in trial order, so the outcome does
            // not depend on how trials are scheduled.
            let trial_seeds: Vec<u64> = (0..self.trials).map(|_| rng.random()).collect();
            let best = self.best_trial(sims, arena.members(target), target, &trial_seeds)?;

            let created = arena.split(target, &best.first, &best.second);
            let mut moved = best.second;
            moved.sort_unstable();

            log::debug!(
                "split {:>6} -> {:<6} cost {:.6} sizes {}/{}",
                target,
                created,
                best.cost,
                best.first.len(),
                moved.len()
            );
            trace.push(SplitRecord {
                target,
                created,
                cost: best.cost,
                moved,
            });
        }

        let partition = Partition::new(arena.clusters(), n)?;
        log::info!("divisive clustering done after {} splits", trace.len());
        Ok((partition, trace))
    }

    /// Run every trial and keep the cheapest, first on ties.
    fn best_trial(
        &self,
        sims: &SimilarityMatrix,
        members: &[usize],
        cluster: usize,
        trial_seeds: &[u64],
    ) -> Result<SplitTrial> {
        let run = |&seed: &u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            self.trial(sims, members, cluster, &mut rng)
        };

        #[cfg(feature = "parallel")]
        let trials: Vec<Result<SplitTrial>> = trial_seeds.par_iter().map(run).collect();

        #[cfg(not(feature = "parallel"))]
        let trials: Vec<Result<SplitTrial>> = trial_seeds.iter().map(run).collect();

        cheapest(cluster, trials)
    }

    /// Draw seed pairs until both sides are nonempty, then score the split.
    fn trial(
        &self,
        sims: &SimilarityMatrix,
        members: &[usize],
        cluster: usize,
        rng: &mut StdRng,
    ) -> Result<SplitTrial> {
        for _ in 0..self.max_resamples {
            let picks = rand::seq::index::sample(rng, members.len(), 2);
            let (a, b) = (members[picks.index(0)], members[picks.index(1)]);

            let (first, second): (Vec<usize>, Vec<usize>) = members
                .iter()
                .partition(|&&m| sims.get(m, a) >= sims.get(m, b));
            if first.is_empty() || second.is_empty() {
                continue;
            }

            let cost = split_cost(sims, &first, &second, self.normalize);
            return Ok(SplitTrial {
                first,
                second,
                cost,
            });
        }
        Err(Error::UnsplittableCluster {
            cluster,
            attempts: self.max_resamples,
        })
    }
}

impl Clustering for Divisive {
    fn fit(&self, sims: &SimilarityMatrix) -> Result<Partition> {
        self.fit_with_trace(sims).map(|(partition, _)| partition)
    }

    fn n_clusters(&self) -> usize {
        self.n_clusters
    }
}

/// Cost of splitting into `first` and `second`; lower is better.
fn split_cost(sims: &SimilarityMatrix, first: &[usize], second: &[usize], normalize: bool) -> f64 {
    let within_first = sims.pair_sum(first);
    let within_second = sims.pair_sum(second);
    let cross = sims.cross_sum(first, second);

    let (intra_first, intra_second, cut) = if normalize {
        let (n1, n2) = (first.len() as f64, second.len() as f64);
        (
            within_first / (n1 * n1),
            within_second / (n2 * n2),
            cross / (n1 * n2),
        )
    } else {
        (within_first, within_second, cross)
    };

    cut / intra_first + cut / intra_second
}

/// Cheapest successful trial, first on ties.
///
/// Trials that exhausted their resample budget are skipped; the cluster is
/// unsplittable only when every trial did.
fn cheapest(cluster: usize, trials: Vec<Result<SplitTrial>>) -> Result<SplitTrial> {
    let n_trials = trials.len();
    let mut best: Option<SplitTrial> = None;
    let mut failure: Option<Error> = None;
    let mut failed = 0usize;
    for trial in trials {
        match trial {
            Ok(trial) => {
                if best.as_ref().is_none_or(|b| beats(trial.cost, b.cost)) {
                    best = Some(trial);
                }
            }
            Err(e) => {
                failed += 1;
                failure.get_or_insert(e);
            }
        }
    }
    match (best, failure) {
        (Some(best), _) => {
            if failed > 0 {
                log::debug!(
                    "cluster {}: {} of {} trials found no bisection",
                    cluster,
                    failed,
                    n_trials
                );
            }
            Ok(best)
        }
        (None, Some(e)) => Err(e),
        (None, None) => Err(Error::InvalidParameter {
            name: "trials",
            message: "must be at least 1",
        }),
    }
}

/// Whether a trial costing `candidate` replaces the incumbent. Strictly
/// cheaper wins; NaN loses to everything.
fn beats(candidate: f64, incumbent: f64) -> bool {
    if candidate.is_nan() {
        return false;
    }
    incumbent.is_nan() || candidate < incumbent
}

/// Least cohesive cluster with at least two members, lowest id on ties.
fn choose_target(arena: &RangeArena, sims: &SimilarityMatrix) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for c in 0..arena.len() {
        let members = arena.members(c);
        if members.len() < 2 {
            continue;
        }
        let avg = sims.average_similarity(members);
        if best.is_none_or(|(_, b)| avg < b) {
            best = Some((c, avg));
        }
    }
    best.map(|(c, _)| c)
}

/// Clusters as ranges over one permutation of the documents.
#[derive(Debug, Clone)]
struct RangeArena {
    order: Vec<usize>,
    ranges: Vec<Range<usize>>,
}

impl RangeArena {
    /// One cluster holding all `n` documents.
    fn new(n: usize) -> Self {
        Self {
            order: (0..n).collect(),
            ranges: vec![0..n],
        }
    }

    fn len(&self) -> usize {
        self.ranges.len()
    }

    fn members(&self, c: usize) -> &[usize] {
        &self.order[self.ranges[c].clone()]
    }

    /// Rewrite cluster `c` as `first` followed by `second`, give `second` a
    /// new id and return it. The two sides must partition `c`'s members.
    fn split(&mut self, c: usize, first: &[usize], second: &[usize]) -> usize {
        let range = self.ranges[c].clone();
        debug_assert_eq!(range.len(), first.len() + second.len());

        let mid = range.start + first.len();
        self.order[range.start..mid].copy_from_slice(first);
        self.order[mid..range.end].copy_from_slice(second);

        self.ranges[c] = range.start..mid;
        self.ranges.push(mid..range.end);
        self.ranges.len() - 1
    }

    fn clusters(&self) -> Vec<Vec<usize>> {
        (0..self.len()).map(|c| self.members(c).to_vec()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::DocumentCollection;
    use ndarray::{array, Array2};

    fn sims_of(counts: &[Vec<u32>]) -> SimilarityMatrix {
        let docs = DocumentCollection::from_dense(counts).unwrap();
        SimilarityMatrix::from_collection(&docs).unwrap()
    }

    fn corpus() -> SimilarityMatrix {
        sims_of(&[
            vec![5, 0, 0, 1],
            vec![4, 1, 0, 0],
            vec![5, 1, 1, 0],
            vec![0, 5, 0, 1],
            vec![1, 4, 0, 0],
            vec![0, 0, 6, 1],
            vec![1, 0, 5, 2],
            vec![0, 1, 1, 6],
            vec![1, 1, 0, 5],
        ])
    }

    #[test]
    fn test_k_one_performs_no_splits() {
        let sims = corpus();
        let (partition, trace) = Divisive::new(1).with_seed(7).fit_with_trace(&sims).unwrap();
        assert!(trace.is_empty());
        assert_eq!(partition.clusters(), &[(0..9).collect::<Vec<_>>()]);
    }

    #[test]
    fn test_final_cluster_count_for_every_k() {
        let sims = corpus();
        for k in 1..=sims.n_items() {
            for normalize in [true, false] {
                let p = Divisive::new(k)
                    .with_seed(42)
                    .with_trials(10)
                    .with_normalize(normalize)
                    .fit(&sims)
                    .unwrap();
                assert_eq!(p.n_clusters(), k, "k = {k}, normalize = {normalize}");
            }
        }
    }

    #[test]
    fn test_partition_holds_after_every_split() {
        let sims = corpus();
        let n = sims.n_items();
        let (partition, trace) = Divisive::new(n)
            .with_seed(3)
            .with_trials(5)
            .fit_with_trace(&sims)
            .unwrap();

        let mut labels = vec![0usize; n];
        for (step, split) in trace.iter().enumerate() {
            assert_eq!(split.created, step + 1);
            assert!(!split.moved.is_empty());
            for &doc in &split.moved {
                assert_eq!(labels[doc], split.target, "doc {doc} moved from wrong cluster");
                labels[doc] = split.created;
            }
            assert!(labels.iter().any(|&l| l == split.target), "target emptied");
            let snapshot = Partition::from_labels(&labels).unwrap();
            assert_eq!(snapshot.n_clusters(), step + 2);
            assert_eq!(snapshot.n_items(), n);
        }
        assert_eq!(partition.labels(), labels.as_slice());
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let sims = corpus();
        let a = Divisive::new(4).with_seed(99).fit_with_trace(&sims).unwrap();
        let b = Divisive::new(4).with_seed(99).fit_with_trace(&sims).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_separated_groups_split_cleanly() {
        let sims = sims_of(&[
            vec![5, 0],
            vec![4, 1],
            vec![5, 1],
            vec![0, 5],
            vec![1, 4],
            vec![1, 5],
        ]);
        let p = Divisive::new(2).with_seed(1).with_trials(30).fit(&sims).unwrap();
        assert!(p.same_cluster(0, 1) && p.same_cluster(1, 2));
        assert!(p.same_cluster(3, 4) && p.same_cluster(4, 5));
        assert!(!p.same_cluster(0, 3));
    }

    #[test]
    fn test_split_cost_normalized_and_raw() {
        let sims = SimilarityMatrix::from_array(array![
            [1.0, 0.2, 0.4],
            [0.2, 1.0, 0.6],
            [0.4, 0.6, 1.0],
        ])
        .unwrap();
        // intra = 1 and 3.2 / 4, cut = 0.6 / 2
        assert!((split_cost(&sims, &[0], &[1, 2], true) - 0.675).abs() < 1e-12);
        // intra = 1 and 3.2, cut = 0.6
        assert!((split_cost(&sims, &[0], &[1, 2], false) - 0.7875).abs() < 1e-12);
    }

    #[test]
    fn test_target_is_least_cohesive_non_singleton() {
        let sims = SimilarityMatrix::from_array(array![
            [1.0, 0.9, 0.0, 0.0, 0.0],
            [0.9, 1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.1, 0.0],
            [0.0, 0.0, 0.1, 1.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 1.0],
        ])
        .unwrap();
        let mut arena = RangeArena::new(5);
        let _ = arena.split(0, &[0, 1, 2, 3], &[4]);
        let _ = arena.split(0, &[0, 1], &[2, 3]);
        // clusters: 0 = {0, 1}, 1 = {4}, 2 = {2, 3}
        assert_eq!(choose_target(&arena, &sims), Some(2));

        let singles = RangeArena {
            order: vec![0, 1],
            ranges: vec![0..1, 1..2],
        };
        assert_eq!(choose_target(&singles, &sims), None);
    }

    #[test]
    fn test_indistinguishable_members_are_unsplittable() {
        let sims = SimilarityMatrix::from_array(Array2::ones((3, 3))).unwrap();
        let err = Divisive::new(2)
            .with_seed(5)
            .with_max_resamples(10)
            .fit(&sims)
            .unwrap_err();
        assert_eq!(
            err,
            Error::UnsplittableCluster {
                cluster: 0,
                attempts: 10
            }
        );
    }

    #[test]
    fn test_invalid_parameters() {
        let sims = corpus();
        assert!(matches!(
            Divisive::new(0).fit(&sims),
            Err(Error::InvalidClusterCount { .. })
        ));
        assert!(matches!(
            Divisive::new(10).fit(&sims),
            Err(Error::InvalidClusterCount { requested: 10, n_items: 9 })
        ));
        assert!(matches!(
            Divisive::new(2).with_trials(0).fit(&sims),
            Err(Error::InvalidParameter { name: "trials", .. })
        ));
    }

    fn trial_with_cost(cost: f64) -> Result<SplitTrial> {
        Ok(SplitTrial {
            first: vec![0],
            second: vec![1],
            cost,
        })
    }

    #[test]
    fn test_duplicate_heavy_cluster_still_splits() {
        // 200 copies of one document and a single distinct one: most seed
        // pairs are two copies, so many trials run out of resamples.
        let mut counts = vec![vec![1, 0]; 200];
        counts.push(vec![0, 1]);
        let sims = sims_of(&counts);
        let p = Divisive::new(2)
            .with_seed(17)
            .with_max_resamples(50)
            .fit(&sims)
            .unwrap();
        assert_eq!(p.n_clusters(), 2);
        assert_eq!(p.cluster(p.label_of(200)), &[200]);
    }

    #[test]
    fn test_cheapest_skips_failed_trials() {
        let unsplittable = || {
            Err(Error::UnsplittableCluster {
                cluster: 4,
                attempts: 50,
            })
        };
        let best = cheapest(
            4,
            vec![unsplittable(), trial_with_cost(0.7), unsplittable(), trial_with_cost(0.3)],
        )
        .unwrap();
        assert_eq!(best.cost, 0.3);

        let err = cheapest(4, vec![unsplittable(), unsplittable()]).unwrap_err();
        assert_eq!(
            err,
            Error::UnsplittableCluster {
                cluster: 4,
                attempts: 50
            }
        );
    }

    #[test]
    fn test_nan_cost_never_wins() {
        let best = cheapest(0, vec![trial_with_cost(f64::NAN), trial_with_cost(2.0)]).unwrap();
        assert_eq!(best.cost, 2.0);
        let best = cheapest(0, vec![trial_with_cost(1.0), trial_with_cost(f64::NAN)]).unwrap();
        assert_eq!(best.cost, 1.0);
        let best = cheapest(0, vec![trial_with_cost(f64::INFINITY), trial_with_cost(5.0)]).unwrap();
        assert_eq!(best.cost, 5.0);

        assert!(!beats(f64::NAN, 1.0));
        assert!(!beats(f64::NAN, f64::NAN));
        assert!(beats(1.0, f64::NAN));
        assert!(!beats(1.0, 1.0));
    }

    #[test]
    fn test_trial_choice_matches_sequential_loop() {
        let sims = corpus();
        let members: Vec<usize> = (0..sims.n_items()).collect();
        let divisive = Divisive::new(2).with_trials(16);
        let seeds: Vec<u64> = (0..16u64).map(|i| i * 7919 + 1).collect();

        let chosen = divisive.best_trial(&sims, &members, 0, &seeds).unwrap();

        let sequential: Vec<Result<SplitTrial>> = seeds
            .iter()
            .map(|&seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                divisive.trial(&sims, &members, 0, &mut rng)
            })
            .collect();
        let expected = cheapest(0, sequential).unwrap();

        assert_eq!(chosen.first, expected.first);
        assert_eq!(chosen.second, expected.second);
        assert_eq!(chosen.cost.to_bits(), expected.cost.to_bits());
    }

    #[test]
    fn test_equal_cohesion_targets_lowest_index() {
        let sims = SimilarityMatrix::from_array(array![
            [1.0, 0.5, 0.0, 0.0, 0.0],
            [0.5, 1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0, 0.5],
            [0.0, 0.0, 0.0, 0.5, 1.0],
        ])
        .unwrap();
        let mut arena = RangeArena::new(5);
        let _ = arena.split(0, &[2], &[0, 1, 3, 4]);
        let _ = arena.split(1, &[3, 4], &[0, 1]);
        // clusters: 0 = {2}, 1 = {3, 4}, 2 = {0, 1}, both pairs average 0.75
        assert_eq!(choose_target(&arena, &sims), Some(1));
    }

    #[test]
    fn test_duplicates_outrank_singleton_at_full_cohesion() {
        let sims = sims_of(&[vec![2, 0], vec![2, 0], vec![0, 3]]);
        let mut arena = RangeArena::new(3);
        let _ = arena.split(0, &[2], &[0, 1]);
        // clusters: 0 = {2} and 1 = {0, 1}, both averaging 1.0
        assert_eq!(sims.average_similarity(arena.members(0)), 1.0);
        assert_eq!(sims.average_similarity(arena.members(1)), 1.0);
        assert_eq!(choose_target(&arena, &sims), Some(1));
    }

    #[test]
    fn test_tied_clusters_split_in_index_order() {
        // Two mirrored, orthogonal topics of three documents each.
        let sims = sims_of(&[
            vec![3, 1, 0, 0],
            vec![1, 3, 0, 0],
            vec![2, 2, 0, 0],
            vec![0, 0, 3, 1],
            vec![0, 0, 1, 3],
            vec![0, 0, 2, 2],
        ]);
        let (partition, trace) = Divisive::new(6)
            .with_seed(21)
            .with_trials(30)
            .fit_with_trace(&sims)
            .unwrap();

        assert_eq!(trace[0].target, 0);
        assert!(trace[0].moved == [0, 1, 2] || trace[0].moved == [3, 4, 5]);
        assert!(trace[0].cost.abs() < 1e-12);
        // Both topics are equally cohesive, so cluster 0 goes first.
        assert_eq!(trace[1].target, 0);
        assert!(trace.iter().any(|split| split.target == 1));
        assert_eq!(partition.n_clusters(), 6);
    }
}
