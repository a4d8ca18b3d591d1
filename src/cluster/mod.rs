//! Flat clustering of documents from their similarity matrix.
//!
//! Two independent algorithms produce a [`Partition`] with a requested
//! number of clusters `k`:
//!
//! ## Agglomerative (bottom-up, complete link)
//!
//! Start with every document alone and repeatedly merge the two most
//! similar clusters, where cluster similarity is the *minimum* document
//! similarity across them. Deterministic. The merge history is kept as a
//! [`Dendrogram`] that can be cut at any coarser-or-equal level.
//!
//! ## Divisive (top-down, randomized)
//!
//! Start with one cluster and repeatedly bisect the least cohesive one,
//! trying several random seed pairs per split and keeping the cheapest
//! bisection. Reproducible with a fixed seed.
//!
//! | | Agglomerative | Divisive |
//! |---|---|---|
//! | Start | D singletons | 1 cluster |
//! | Step | merge best pair | split worst cluster |
//! | Randomness | none | seed pairs |
//! | Step cost | O(D²) scan | O(T·\|C\|²) trials |
//!
//! ## Usage
//!
//! ```rust
//! use doclust::cluster::{Agglomerative, Clustering, Divisive};
//! use doclust::{DocumentCollection, SimilarityMatrix};
//!
//! let docs = DocumentCollection::from_dense(&[
//!     vec![3, 0, 1],
//!     vec![4, 1, 0],
//!     vec![0, 5, 1],
//!     vec![1, 4, 0],
//! ])
//! .unwrap();
//! let sims = SimilarityMatrix::from_collection(&docs).unwrap();
//!
//! let hac = Agglomerative::new(2).fit(&sims).unwrap();
//! let hdc = Divisive::new(2).with_seed(7).fit(&sims).unwrap();
//! assert_eq!(hac.n_clusters(), 2);
//! assert_eq!(hdc.n_clusters(), 2);
//! ```

mod agglomerative;
mod dendrogram;
mod disjoint_set;
mod divisive;
mod partition;
mod traits;

pub use agglomerative::Agglomerative;
pub use dendrogram::{Dendrogram, MergeRecord};
pub use divisive::{Divisive, SplitRecord};
pub use partition::Partition;
pub use traits::Clustering;
