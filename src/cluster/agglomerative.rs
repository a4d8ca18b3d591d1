//! Complete-link agglomerative clustering over a similarity matrix.
//!
//! Start from one singleton cluster per document and repeatedly merge the
//! most similar pair of active clusters until `k` remain.
//!
//! # Complete link
//!
//! The similarity of two clusters is the *smallest* document similarity
//! across them:
//!
//! ```text
//! sim(A, B) = min { sim(a, b) : a ∈ A, b ∈ B }
//! ```
//!
//! Since the minimum over a union is the minimum of the parts' minima, after
//! merging `S` into `D` the row of `D` is updated in place:
//!
//! ```text
//! sim(D ∪ S, C) = min(sim(D, C), sim(S, C))
//! ```
//!
//! which is exactly the all-pairs minimum without revisiting members.
//!
//! # Determinism
//!
//! - Pair selection scans active `(i, j)`, `i < j`, row-major; the first
//!   maximum seen wins ties.
//! - The larger cluster survives a merge; on equal sizes the lower id does.
//! - Retired ids are tracked with explicit flags, never sentinel values.
//!
//! Merge similarities are not monotone in general.

use super::dendrogram::{Dendrogram, MergeRecord};
use super::disjoint_set::DisjointSet;
use super::partition::Partition;
use super::traits::Clustering;
use crate::error::{Error, Result};
use crate::similarity::SimilarityMatrix;
use ndarray::Array2;

/// Complete-link agglomerative clustering.
#[derive(Debug, Clone)]
pub struct Agglomerative {
    /// Number of clusters to stop at.
    n_clusters: usize,
}

impl Agglomerative {
    /// Create a clusterer that stops at `n_clusters` clusters.
    pub fn new(n_clusters: usize) -> Self {
        Self { n_clusters }
    }

    /// Run to `n_clusters` and return the partition with its merge trace.
    pub fn fit_dendrogram(&self, sims: &SimilarityMatrix) -> Result<(Partition, Dendrogram)> {
        let n = sims.n_items();
        if self.n_clusters == 0 || self.n_clusters > n {
            return Err(Error::InvalidClusterCount {
                requested: self.n_clusters,
                n_items: n,
            });
        }

        log::info!(
            "agglomerative clustering: {} documents -> {} clusters",
            n,
            self.n_clusters
        );

        let mut state = MergeState::new(sims);
        let mut dendro = Dendrogram::new(n);

        while state.n_active > self.n_clusters {
            let (i, j, similarity) = state.best_pair().ok_or(Error::InvalidClusterCount {
                requested: self.n_clusters,
                n_items: n,
            })?;
            let (destination, source) = state.orient(i, j);
            let size = state.merge(destination, source);

            log::debug!(
                "merge {:>6} <- {:<6} sim {:.6} size {}",
                destination,
                source,
                similarity,
                size
            );
            dendro.push(MergeRecord {
                destination,
                source,
                similarity,
                size,
            });
        }

        let partition = Partition::new(state.forest.groups(), n)?;
        log::info!(
            "agglomerative clustering done after {} merges",
            dendro.n_merges()
        );
        Ok((partition, dendro))
    }
}

impl Clustering for Agglomerative {
    fn fit(&self, sims: &SimilarityMatrix) -> Result<Partition> {
        self.fit_dendrogram(sims).map(|(partition, _)| partition)
    }

    fn n_clusters(&self) -> usize {
        self.n_clusters
    }
}

/// Working state of one run; owns its copy of the similarities.
struct MergeState {
    /// Cluster-to-cluster complete-link similarity, indexed by cluster id.
    linkage: Array2<f64>,
    active: Vec<bool>,
    n_active: usize,
    forest: DisjointSet,
}

impl MergeState {
    fn new(sims: &SimilarityMatrix) -> Self {
        let n = sims.n_items();
        Self {
            linkage: sims.as_array().clone(),
            active: vec![true; n],
            n_active: n,
            forest: DisjointSet::new(n),
        }
    }

    /// Most similar active pair, first seen on ties.
    fn best_pair(&self) -> Option<(usize, usize, f64)> {
        let n = self.active.len();
        let mut best: Option<(usize, usize, f64)> = None;
        for i in (0..n).filter(|&i| self.active[i]) {
            for j in ((i + 1)..n).filter(|&j| self.active[j]) {
                let s = self.linkage[[i, j]];
                if best.is_none_or(|(_, _, b)| s > b) {
                    best = Some((i, j, s));
                }
            }
        }
        best
    }

    /// `(destination, source)` for a selected pair `i < j`.
    fn orient(&self, i: usize, j: usize) -> (usize, usize) {
        let (size_i, size_j) = (self.forest.size(i), self.forest.size(j));
        if size_j > size_i {
            (j, i)
        } else {
            (i, j)
        }
    }

    /// Absorb `source` into `destination` and refresh the destination row.
    fn merge(&mut self, destination: usize, source: usize) -> usize {
        let size = self.forest.union_into(destination, source);
        self.active[source] = false;
        self.n_active -= 1;

        for c in 0..self.active.len() {
            if !self.active[c] || c == destination {
                continue;
            }
            let s = self.linkage[[destination, c]].min(self.linkage[[source, c]]);
            self.linkage[[destination, c]] = s;
            self.linkage[[c, destination]] = s;
        }
        size
    }
}
