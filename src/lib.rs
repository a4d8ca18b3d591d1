//! # doclust
//!
//! Document clustering from term counts: cosine similarity, two flat
//! clusterings built in opposite directions, and a measure of how much they
//! agree.
//!
//! ```text
//! DocumentCollection ──► SimilarityMatrix ──┬──► Agglomerative ──┐
//!                                           │                    ├──► pair_agreement
//!                                           └──► Divisive ───────┘
//! ```
//!
//! The similarity matrix is built once and borrowed read-only by each
//! clusterer; every run owns its own working state.
//!
//! Enable `parallel` to compute similarity rows and divisive split trials on
//! rayon, and `cli` for the `doclust` binary.

pub mod cluster;
pub mod corpus;
/// Error types used across `doclust`.
pub mod error;
pub mod metrics;
pub mod similarity;

#[cfg(test)]
mod cluster_tests;

pub use cluster::{
    Agglomerative, Clustering, Dendrogram, Divisive, MergeRecord, Partition, SplitRecord,
};
pub use corpus::DocumentCollection;
pub use error::{Error, Result};
pub use metrics::{adjusted_rand_index, fowlkes_mallows, pair_agreement, Agreement};
pub use similarity::SimilarityMatrix;
