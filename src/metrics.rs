//! Agreement between two clusterings of the same documents.
//!
//! # Pair agreement
//!
//! Every ordered pair `(i, j)` of the D documents (self pairs included) is
//! either together or apart in each clustering. Over the D² pairs:
//!
//! | | together in B | apart in B |
//! |---|---|---|
//! | **together in A** | positive agreement | disagreement |
//! | **apart in A** | disagreement | negative agreement |
//!
//! [`pair_agreement`] reports the two agreeing fractions; their sum is the
//! composite agreement and `1 − composite` the disagreement.
//!
//! The counts come from the contingency table `n_ij = |Aᵢ ∩ Bⱼ|` rather than
//! from the D² pairs directly:
//!
//! ```text
//! together in both  = Σᵢⱼ n_ij²
//! together in A     = Σᵢ |Aᵢ|²
//! together in B     = Σⱼ |Bⱼ|²
//! apart in both     = D² − together in A − together in B + together in both
//! ```
//!
//! # Companion indices
//!
//! [`adjusted_rand_index`] and [`fowlkes_mallows`] work on unordered pairs
//! of distinct documents and take plain label slices.
//!
//! # References
//!
//! - Hubert & Arabie (1985). "Comparing partitions" (ARI)
//! - Fowlkes & Mallows (1983). "A method for comparing two hierarchical clusterings"

use crate::cluster::Partition;
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Fractions of ordered document pairs on which two clusterings agree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Agreement {
    /// Pairs together in both clusterings, over D².
    pub positive: f64,
    /// Pairs apart in both clusterings, over D².
    pub negative: f64,
}

impl Agreement {
    /// `positive + negative`.
    pub fn composite(&self) -> f64 {
        self.positive + self.negative
    }

    /// `1 − composite`.
    pub fn disagreement(&self) -> f64 {
        1.0 - self.composite()
    }
}

/// Pair agreement of two clusterings with the same cluster count.
///
/// # Errors
///
/// - [`Error::DimensionMismatch`] if they cover different document counts.
/// - [`Error::MismatchedClusterCount`] if their cluster counts differ.
pub fn pair_agreement(a: &Partition, b: &Partition) -> Result<Agreement> {
    if a.n_items() != b.n_items() {
        return Err(Error::DimensionMismatch {
            expected: a.n_items(),
            found: b.n_items(),
        });
    }
    if a.n_clusters() != b.n_clusters() {
        return Err(Error::MismatchedClusterCount {
            left: a.n_clusters(),
            right: b.n_clusters(),
        });
    }

    let n = a.n_items() as u64;
    let table = build_contingency_table(a.labels(), b.labels());
    let (rows, cols) = marginals(&table);

    let together_both: u64 = table.values().map(|&c| square(c)).sum();
    let together_a: u64 = rows.values().map(|&c| square(c)).sum();
    let together_b: u64 = cols.values().map(|&c| square(c)).sum();
    let apart_both = n * n + together_both - together_a - together_b;

    let total = (n * n) as f64;
    Ok(Agreement {
        positive: together_both as f64 / total,
        negative: apart_both as f64 / total,
    })
}

/// Adjusted Rand Index between two labelings.
///
/// 0 for chance-level agreement, 1 for identical partitions (up to label
/// renaming). Returns 0.0 for empty or unequal-length input.
pub fn adjusted_rand_index(pred: &[usize], truth: &[usize]) -> f64 {
    if pred.len() != truth.len() || pred.is_empty() {
        return 0.0;
    }

    let table = build_contingency_table(pred, truth);
    let (rows, cols) = marginals(&table);

    let sum_comb_ij: f64 = table.values().map(|&c| comb2(c) as f64).sum();
    let sum_comb_a: f64 = rows.values().map(|&a| comb2(a) as f64).sum();
    let sum_comb_b: f64 = cols.values().map(|&b| comb2(b) as f64).sum();
    let comb_n = comb2(pred.len()) as f64;

    if comb_n == 0.0 {
        return 1.0;
    }

    // ARI = (index - expected) / (max - expected)
    let expected = sum_comb_a * sum_comb_b / comb_n;
    let max_index = (sum_comb_a + sum_comb_b) / 2.0;

    let denom = max_index - expected;
    if denom.abs() < 1e-10 {
        return 1.0;
    }

    (sum_comb_ij - expected) / denom
}

/// Fowlkes-Mallows index: geometric mean of pairwise precision and recall.
///
/// Returns 0.0 for unequal-length input or fewer than two documents.
pub fn fowlkes_mallows(pred: &[usize], truth: &[usize]) -> f64 {
    if pred.len() != truth.len() || pred.len() < 2 {
        return 0.0;
    }

    let table = build_contingency_table(pred, truth);
    let (rows, cols) = marginals(&table);

    let tp: usize = table.values().map(|&c| comb2(c)).sum();
    let pred_pairs: usize = rows.values().map(|&c| comb2(c)).sum();
    let truth_pairs: usize = cols.values().map(|&c| comb2(c)).sum();

    if pred_pairs == 0 || truth_pairs == 0 {
        return 0.0;
    }
    let precision = tp as f64 / pred_pairs as f64;
    let recall = tp as f64 / truth_pairs as f64;
    (precision * recall).sqrt()
}

fn build_contingency_table(a: &[usize], b: &[usize]) -> HashMap<(usize, usize), usize> {
    let mut table = HashMap::new();
    for (&x, &y) in a.iter().zip(b.iter()) {
        *table.entry((x, y)).or_insert(0) += 1;
    }
    table
}

/// Row and column sums of a contingency table.
fn marginals(
    table: &HashMap<(usize, usize), usize>,
) -> (HashMap<usize, usize>, HashMap<usize, usize>) {
    let mut rows = HashMap::new();
    let mut cols = HashMap::new();
    for (&(r, c), &count) in table {
        *rows.entry(r).or_insert(0) += count;
        *cols.entry(c).or_insert(0) += count;
    }
    (rows, cols)
}

fn square(n: usize) -> u64 {
    let n = n as u64;
    n * n
}

fn comb2(n: usize) -> usize {
    if n < 2 {
        0
    } else {
        n * (n - 1) / 2
    }
}
