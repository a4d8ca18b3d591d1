//! Clustering traits.

use super::partition::Partition;
use crate::error::Result;
use crate::similarity::SimilarityMatrix;

/// A flat clustering algorithm driven by document similarities.
pub trait Clustering {
    /// Cluster the documents of `sims` into [`n_clusters`](Self::n_clusters)
    /// groups.
    fn fit(&self, sims: &SimilarityMatrix) -> Result<Partition>;

    /// Get the number of clusters.
    fn n_clusters(&self) -> usize;
}
