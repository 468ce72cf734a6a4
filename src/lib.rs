//! # zeyrho
//!
//! An in-memory B-tree holding a multiset of ordered values.
//!
//! Insertion splits full nodes on the way down and deletion tops up thin
//! nodes on the way down, so both walk from the root to a leaf exactly once.
//! Every leaf sits at the same depth and every non-root node holds between
//! `t - 1` and `2t - 1` values, where `t` is the minimum degree chosen when
//! the tree is built.
//!
//! ```rust
//! use zeyrho::BTree;
//!
//! let mut tree = BTree::new();
//! for v in [10, 20, 5, 6, 12, 30, 7, 17] {
//!     tree.add(v);
//! }
//!
//! assert!(tree.contains(&12));
//! assert!(tree.remove(&12));
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![5, 6, 7, 10, 17, 20, 30]);
//! ```
//!
//! The tree is single threaded. Callers sharing one across threads have to
//! serialize access themselves.

mod tracing_helpers;

pub mod zeyrho;

pub use zeyrho::btree::config::BTreeConfig;
pub use zeyrho::btree::error::{BTreeError, Result};
pub use zeyrho::btree::iter::{IntoIter, Iter};
pub use zeyrho::btree::tree::BTree;
pub use zeyrho::MultiSet;
