//! Merge trace of an agglomerative run.
//!
//! Clusters are named by the document index they started from. A merge
//! keeps the `destination` id alive and retires the `source` id, so the
//! live ids after any prefix of merges are exactly the destinations that
//! have not yet been absorbed.

use super::disjoint_set::DisjointSet;
use super::partition::Partition;
use crate::error::{Error, Result};

/// One merge: `source` absorbed into `destination`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeRecord {
    /// Surviving cluster id.
    pub destination: usize,
    /// Absorbed cluster id, inactive from here on.
    pub source: usize,
    /// Complete-link similarity of the two clusters at merge time.
    pub similarity: f64,
    /// Size of the surviving cluster after the merge.
    pub size: usize,
}

/// Ordered merge history for `n_items` documents.
#[derive(Debug, Clone, PartialEq)]
pub struct Dendrogram {
    merges: Vec<MergeRecord>,
    n_items: usize,
}

impl Dendrogram {
    /// Create an empty trace for n items.
    pub fn new(n_items: usize) -> Self {
        Self {
            merges: Vec::with_capacity(n_items.saturating_sub(1)),
            n_items,
        }
    }

    /// Record a merge.
    pub fn push(&mut self, record: MergeRecord) {
        self.merges.push(record);
    }

    /// Number of original items.
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Number of merges recorded.
    pub fn n_merges(&self) -> usize {
        self.merges.len()
    }

    /// Merges in the order they happened.
    pub fn merges(&self) -> &[MergeRecord] {
        &self.merges
    }

    /// Merge similarities in order. Complete link does not guarantee these
    /// are monotone.
    pub fn similarities(&self) -> Vec<f64> {
        self.merges.iter().map(|m| m.similarity).collect()
    }

    /// Partition after replaying the first `n - k` merges.
    ///
    /// Valid for `n - n_merges ≤ k ≤ n`: the trace only reaches as far down
    /// as the run that produced it.
    pub fn cut_to_k(&self, k: usize) -> Result<Partition> {
        let floor = self.n_items - self.merges.len();
        if k == 0 || k > self.n_items || k < floor {
            return Err(Error::InvalidClusterCount {
                requested: k,
                n_items: self.n_items,
            });
        }
        let mut forest = DisjointSet::new(self.n_items);
        for m in &self.merges[..self.n_items - k] {
            let _ = forest.union_into(m.destination, m.source);
        }
        Partition::new(forest.groups(), self.n_items)
    }
}
