//! Cosine similarity between documents.
//!
//! ```text
//! sim(i, j) = (cᵢ · cⱼ) / (‖cᵢ‖ × ‖cⱼ‖)
//! ```
//!
//! Counts are nonnegative, so every similarity lands in [0, 1]. A document
//! with no terms has zero magnitude and no defined similarity; building the
//! matrix fails with [`Error::ZeroVector`] instead of producing NaN. Use
//! [`DocumentCollection::without_empty_documents`] to drop such documents
//! explicitly before building.
//!
//! Each unordered pair (self pairs included) is computed once and written to
//! both halves, so the matrix is exactly symmetric.

use crate::corpus::DocumentCollection;
use crate::error::{Error, Result};
use ndarray::Array2;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Tolerance used when validating externally supplied matrices.
const SYMMETRY_TOL: f64 = 1e-12;

/// Immutable D×D document similarity matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    sims: Array2<f64>,
}

impl SimilarityMatrix {
    /// Build the cosine similarity matrix of a document collection.
    pub fn from_collection(docs: &DocumentCollection) -> Result<Self> {
        let n = docs.n_docs();
        if n == 0 {
            return Err(Error::EmptyInput);
        }

        let magnitudes: Vec<f64> = (0..n)
            .map(|d| {
                docs.row(d)
                    .iter()
                    .map(|&(_, c)| {
                        let c = c as f64;
                        c * c
                    })
                    .sum::<f64>()
                    .sqrt()
            })
            .collect();
        if let Some(doc) = magnitudes.iter().position(|&m| m == 0.0) {
            return Err(Error::ZeroVector { doc });
        }

        log::info!("building {n}x{n} cosine similarity matrix");

        // Upper triangle (diagonal included), one row per document.
        let upper_row = |i: usize| -> Vec<f64> {
            (i..n)
                .map(|j| dot(docs.row(i), docs.row(j)) / (magnitudes[i] * magnitudes[j]))
                .collect()
        };

        #[cfg(feature = "parallel")]
        let rows: Vec<Vec<f64>> = (0..n).into_par_iter().map(upper_row).collect();

        #[cfg(not(feature = "parallel"))]
        let rows: Vec<Vec<f64>> = (0..n).map(upper_row).collect();

        let mut sims = Array2::zeros((n, n));
        for (i, row) in rows.into_iter().enumerate() {
            for (offset, sim) in row.into_iter().enumerate() {
                let j = i + offset;
                sims[[i, j]] = sim;
                sims[[j, i]] = sim;
            }
            sims[[i, i]] = 1.0;
        }
        log::debug!("similarity matrix ready ({} entries)", n * n);

        Ok(Self { sims })
    }

    /// Wrap a precomputed similarity matrix.
    ///
    /// The matrix must be square, nonempty, finite and symmetric.
    pub fn from_array(sims: Array2<f64>) -> Result<Self> {
        let (rows, cols) = sims.dim();
        if rows == 0 {
            return Err(Error::EmptyInput);
        }
        if rows != cols {
            return Err(Error::DimensionMismatch {
                expected: rows,
                found: cols,
            });
        }
        if sims.iter().any(|s| !s.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "sims",
                message: "similarities must be finite",
            });
        }
        for i in 0..rows {
            for j in (i + 1)..rows {
                if (sims[[i, j]] - sims[[j, i]]).abs() > SYMMETRY_TOL {
                    return Err(Error::InvalidParameter {
                        name: "sims",
                        message: "similarity matrix must be symmetric",
                    });
                }
            }
        }
        Ok(Self { sims })
    }

    /// Similarity of documents `i` and `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.sims[[i, j]]
    }

    /// Number of documents.
    pub fn n_items(&self) -> usize {
        self.sims.nrows()
    }

    /// Borrow the underlying matrix.
    pub fn as_array(&self) -> &Array2<f64> {
        &self.sims
    }

    /// Sum of `sim(a, b)` over all ordered pairs drawn from `members`,
    /// self pairs included.
    pub fn pair_sum(&self, members: &[usize]) -> f64 {
        members
            .iter()
            .map(|&a| members.iter().map(|&b| self.sims[[a, b]]).sum::<f64>())
            .sum()
    }

    /// Sum of `sim(a, b)` for `a` in `left`, `b` in `right`.
    pub fn cross_sum(&self, left: &[usize], right: &[usize]) -> f64 {
        left.iter()
            .map(|&a| right.iter().map(|&b| self.sims[[a, b]]).sum::<f64>())
            .sum()
    }

    /// Average similarity of a cluster: [`pair_sum`](Self::pair_sum)
    /// divided by `size²`. Zero for an empty slice.
    pub fn average_similarity(&self, members: &[usize]) -> f64 {
        if members.is_empty() {
            return 0.0;
        }
        let size = members.len() as f64;
        self.pair_sum(members) / (size * size)
    }
}

/// Dot product of two sparse rows sorted by term.
fn dot(a: &[(usize, u32)], b: &[(usize, u32)]) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut acc = 0u64;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                acc += a[i].1 as u64 * b[j].1 as u64;
                i += 1;
                j += 1;
            }
        }
    }
    acc as f64
}
