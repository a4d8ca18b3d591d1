//! Disjoint-set forest over document indices.
//!
//! The caller decides which root survives a union, so the forest can mirror
//! an external orientation rule (here: smaller cluster into larger, ties to
//! the lower id). Finds use path halving.

#[derive(Debug, Clone)]
pub(crate) struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    /// `n` singleton sets, set `i` rooted at `i`.
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    /// Root of the set containing `x`.
    pub(crate) fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Size of the set rooted at `root`.
    pub(crate) fn size(&self, root: usize) -> usize {
        self.size[root]
    }

    /// Attach root `source` under root `destination`; returns the new size.
    pub(crate) fn union_into(&mut self, destination: usize, source: usize) -> usize {
        debug_assert_eq!(self.parent[destination], destination);
        debug_assert_eq!(self.parent[source], source);
        debug_assert_ne!(destination, source);
        self.parent[source] = destination;
        self.size[destination] += self.size[source];
        self.size[destination]
    }

    /// Group all elements by root, roots ascending, members ascending.
    pub(crate) fn groups(&mut self) -> Vec<Vec<usize>> {
        let n = self.parent.len();
        let mut by_root: Vec<Vec<usize>> = vec![Vec::new(); n];
        for x in 0..n {
            let r = self.find(x);
            by_root[r].push(x);
        }
        by_root.into_iter().filter(|g| !g.is_empty()).collect()
    }
}
