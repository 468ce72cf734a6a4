pub mod config;
pub mod error;
pub mod iter;
pub mod tree;
mod node;

/// Minimum degree used by `BTree::new` and `BTreeConfig::default`.
pub const DEFAULT_MIN_DEGREE: usize = 2;

/// Smallest minimum degree a tree can be built with.
pub const LOWEST_MIN_DEGREE: usize = 2;

/// Values a node holds when full.
pub(crate) const fn max_values(min_degree: usize) -> usize {
    2 * min_degree - 1
}

/// Values every non-root node must keep.
pub(crate) const fn min_values(min_degree: usize) -> usize {
    min_degree - 1
}
