use std::fmt::{Debug, Display, Formatter};

use crate::tracing_helpers::{debug_log, trace_log};
use crate::zeyrho::btree::config::BTreeConfig;
use crate::zeyrho::btree::error::{BTreeError, Result};
use crate::zeyrho::btree::iter::{IntoIter, Iter};
use crate::zeyrho::btree::node::Node;
use crate::zeyrho::btree::DEFAULT_MIN_DEGREE;
use crate::zeyrho::MultiSet;

/// An in-memory B-tree holding a multiset of ordered values.
///
/// Equal values may be added any number of times; each `remove` takes out
/// one of them.
pub struct BTree<T> {
    root: Option<Node<T>>,
    len: usize,
    min_degree: usize,
}

impl<T: Ord> BTree<T> {
    /// Builds an empty tree with a minimum degree of 2.
    pub fn new() -> Self {
        BTree {
            root: None,
            len: 0,
            min_degree: DEFAULT_MIN_DEGREE,
        }
    }

    pub fn with_min_degree(min_degree: usize) -> Result<Self> {
        Self::from_config(&BTreeConfig::with_min_degree(min_degree))
    }

    pub fn from_config(config: &BTreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(BTree {
            root: None,
            len: 0,
            min_degree: config.min_degree,
        })
    }

    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    /// Number of values stored, counting duplicates.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of levels, 0 for an empty tree.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root.as_ref();
        while let Some(node) = current {
            height += 1;
            current = node.children.first();
        }
        height
    }

    /// Adds `value`, keeping any equal values already present.
    ///
    /// # Panics
    ///
    /// Panics if a node primitive reports a broken contract, which means the
    /// tree itself is corrupt.
    pub fn add(&mut self, value: T) {
        if let Err(err) = self.try_add(value) {
            panic!("b-tree add failed: {err}");
        }
    }

    /// Adds `value`, surfacing node contract violations instead of panicking.
    pub fn try_add(&mut self, value: T) -> Result<()> {
        match self.root.take() {
            None => {
                self.root = Some(Node::new_leaf_root(value, self.min_degree));
            }
            Some(root) => {
                let mut root = if root.is_full() {
                    debug_log!(len = self.len, "splitting full root");
                    root.split_full_root()
                } else {
                    root
                };
                let inserted = Self::insert_non_full(&mut root, value);
                self.root = Some(root);
                inserted?;
            }
        }

        self.len += 1;
        Ok(())
    }

    // Walks down from a node that is not full, splitting any full child
    // before stepping into it, so the leaf reached always has room.
    fn insert_non_full(node: &mut Node<T>, value: T) -> Result<()> {
        let mut node = node;
        loop {
            if node.is_leaf() {
                return node.insert_into_leaf(value);
            }

            let mut index = node.child_index_for(&value);
            if node.children[index].is_full() {
                node.split_full_child(index);
                if value >= node.values[index] {
                    index += 1;
                }
            }
            node = &mut node.children[index];
        }
    }

    /// Removes one value equal to `value`. Returns `false`, leaving the tree
    /// untouched, when there is none.
    ///
    /// # Panics
    ///
    /// Panics if a node primitive reports a broken contract.
    pub fn remove(&mut self, value: &T) -> bool {
        match self.try_remove(value) {
            Ok(removed) => removed,
            Err(err) => panic!("b-tree remove failed: {err}"),
        }
    }

    /// Removes one value equal to `value`, surfacing node contract violations.
    pub fn try_remove(&mut self, value: &T) -> Result<bool> {
        if !self.contains(value) {
            return Ok(false);
        }

        let Some(root) = self.root.as_mut() else {
            return Ok(false);
        };

        let removed = Self::remove_value(root, value)?;
        if removed {
            self.len -= 1;
            self.collapse_root();
        }
        Ok(removed)
    }

    fn remove_value(node: &mut Node<T>, value: &T) -> Result<bool> {
        if node.is_leaf() {
            // Every non-root node on the way here was topped up to at least
            // `min_degree` values, and the root is exempt from the minimum.
            return node.delete_from_leaf(value);
        }

        let min_degree = node.min_degree();

        let Some(index) = node.index_of(value) else {
            let index = node.child_index_for(value);
            let index = Self::ensure_child_can_shrink(node, index)?;
            return Self::remove_value(&mut node.children[index], value);
        };

        // The value sits in this internal node, so swap in a neighbour from a
        // leaf below and remove that instead.
        if node.children[index].len() >= min_degree {
            let predecessor = Self::pop_last_from(&mut node.children[index])?
                .ok_or_else(|| BTreeError::Invariant("left child has no predecessor".into()))?;
            node.replace_value(index, predecessor);
            return Ok(true);
        }

        if node.children[index + 1].len() >= min_degree {
            let successor = Self::pop_first_from(&mut node.children[index + 1])?
                .ok_or_else(|| BTreeError::Invariant("right child has no successor".into()))?;
            node.replace_value(index, successor);
            return Ok(true);
        }

        trace_log!(index, "merging around removed separator");
        let merged = node.push_down(index);
        Self::remove_value(merged, value)
    }

    fn pop_first_from(node: &mut Node<T>) -> Result<Option<T>> {
        if node.is_leaf() {
            return Ok(node.remove_first().map(|(value, _)| value));
        }

        let index = Self::ensure_child_can_shrink(node, 0)?;
        Self::pop_first_from(&mut node.children[index])
    }

    fn pop_last_from(node: &mut Node<T>) -> Result<Option<T>> {
        if node.is_leaf() {
            return Ok(node.remove_last().map(|(value, _)| value));
        }

        let last = node.children.len() - 1;
        let index = Self::ensure_child_can_shrink(node, last)?;
        Self::pop_last_from(&mut node.children[index])
    }

    // Makes sure the child at `index` holds at least `min_degree` values
    // before the walk steps into it, borrowing from the richer sibling or
    // merging with a sibling. Returns where the child ended up.
    fn ensure_child_can_shrink(node: &mut Node<T>, index: usize) -> Result<usize> {
        let min_degree = node.min_degree();
        if node.children[index].len() >= min_degree {
            return Ok(index);
        }

        let left = index.checked_sub(1);
        let right = (index + 1 < node.children.len()).then_some(index + 1);

        let richest_sibling = match (left, right) {
            (Some(left), Some(right)) => {
                if node.children[left].len() > node.children[right].len() {
                    Some(left)
                } else {
                    Some(right)
                }
            }
            (left, right) => left.or(right),
        };

        match richest_sibling {
            Some(sibling) if node.children[sibling].len() >= min_degree => {
                Self::rotate_and_push_down(node, index, sibling)?;
                Ok(index)
            }
            _ => match (right, left) {
                (Some(_), _) => {
                    node.push_down(index);
                    Ok(index)
                }
                (None, Some(left)) => {
                    node.push_down(left);
                    Ok(left)
                }
                (None, None) => Err(BTreeError::Invariant(
                    "internal node has a single child".into(),
                )),
            },
        }
    }

    /// Moves one value from `sibling_index` up into `node` and the separator
    /// between them down into the child at `child_index`.
    ///
    /// ```text
    ///     [6      10]             [7   10]
    ///  [1]  [7 8 9] [11]   =>  [1 6] [8 9] [11]
    /// ```
    fn rotate_and_push_down(node: &mut Node<T>, child_index: usize, sibling_index: usize) -> Result<()> {
        if sibling_index > child_index {
            let (up, moved_child) = node.children[sibling_index]
                .remove_first()
                .ok_or_else(|| BTreeError::Invariant("right sibling is empty".into()))?;
            let down = node.replace_value(child_index, up);
            node.children[child_index].add_end(down, moved_child);
            trace_log!(child_index, "rotated from right sibling");
        } else {
            let (up, moved_child) = node.children[sibling_index]
                .remove_last()
                .ok_or_else(|| BTreeError::Invariant("left sibling is empty".into()))?;
            let down = node.replace_value(sibling_index, up);
            node.children[child_index].add_front(down, moved_child);
            trace_log!(child_index, "rotated from left sibling");
        }
        Ok(())
    }

    // A root left without values either empties the tree or hands over to
    // its only child.
    fn collapse_root(&mut self) {
        let Some(root) = self.root.take() else {
            return;
        };

        if !root.values.is_empty() {
            self.root = Some(root);
            return;
        }

        if root.is_leaf() {
            debug_log!("tree emptied");
            return;
        }

        debug_log!("collapsing root, height shrinks");
        self.root = root.children.into_iter().next();
    }

    /// Returns whether a value equal to `value` is stored.
    pub fn contains(&self, value: &T) -> bool {
        let mut current = self.root.as_ref();
        while let Some(node) = current {
            let mut index = 0;
            while index < node.values.len() {
                if *value == node.values[index] {
                    return true;
                }
                if *value < node.values[index] {
                    break;
                }
                index += 1;
            }

            if node.is_leaf() {
                return false;
            }
            current = node.children.get(index);
        }
        false
    }

    /// Smallest stored value.
    pub fn first(&self) -> Option<&T> {
        let mut node = self.root.as_ref()?;
        while let Some(child) = node.children.first() {
            node = child;
        }
        node.values.first()
    }

    /// Largest stored value.
    pub fn last(&self) -> Option<&T> {
        let mut node = self.root.as_ref()?;
        while let Some(child) = node.children.last() {
            node = child;
        }
        node.values.last()
    }

    /// Removes and returns the smallest value.
    ///
    /// # Panics
    ///
    /// Panics if a node primitive reports a broken contract.
    pub fn pop_first(&mut self) -> Option<T> {
        let root = self.root.as_mut()?;
        match Self::pop_first_from(root) {
            Ok(popped) => self.finish_pop(popped),
            Err(err) => panic!("b-tree pop_first failed: {err}"),
        }
    }

    /// Removes and returns the largest value.
    ///
    /// # Panics
    ///
    /// Panics if a node primitive reports a broken contract.
    pub fn pop_last(&mut self) -> Option<T> {
        let root = self.root.as_mut()?;
        match Self::pop_last_from(root) {
            Ok(popped) => self.finish_pop(popped),
            Err(err) => panic!("b-tree pop_last failed: {err}"),
        }
    }

    fn finish_pop(&mut self, popped: Option<T>) -> Option<T> {
        if popped.is_some() {
            self.len -= 1;
            self.collapse_root();
        }
        popped
    }

    /// Drops every node.
    pub fn clear(&mut self) {
        debug_log!(len = self.len, "clearing tree");
        self.root = None;
        self.len = 0;
    }

    /// Ascending iterator over the stored values.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.root.as_ref(), self.len)
    }

    /// Copies the values out in ascending order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Checks every structural invariant of the tree.
    ///
    /// Values must be in order with separators bracketing their children,
    /// every leaf must sit at the same depth, every non-root node must hold
    /// `t - 1..=2t - 1` values and the stored count must match.
    pub fn validate(&self) -> Result<()> {
        let Some(root) = self.root.as_ref() else {
            if self.len != 0 {
                return Err(BTreeError::Invariant(format!(
                    "empty tree reports {} values",
                    self.len
                )));
            }
            return Ok(());
        };

        if root.min_degree() != self.min_degree {
            return Err(BTreeError::Invariant("root has the wrong minimum degree".into()));
        }

        let mut leaf_depth = None;
        let count = root.validate_subtree(true, None, None, 0, &mut leaf_depth)?;
        if count != self.len {
            return Err(BTreeError::Invariant(format!(
                "tree holds {count} values but reports {}",
                self.len
            )));
        }
        Ok(())
    }

    #[cfg(test)]
    fn root(&self) -> Option<&Node<T>> {
        self.root.as_ref()
    }
}

impl<T: Ord> Default for BTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> MultiSet<T> for BTree<T> {
    fn add(&mut self, value: T) {
        BTree::add(self, value)
    }

    fn remove(&mut self, value: &T) -> bool {
        BTree::remove(self, value)
    }

    fn contains(&self, value: &T) -> bool {
        BTree::contains(self, value)
    }

    fn len(&self) -> usize {
        BTree::len(self)
    }

    fn clear(&mut self) {
        BTree::clear(self)
    }

    fn is_empty(&self) -> bool {
        BTree::is_empty(self)
    }
}

impl<T: Ord> FromIterator<T> for BTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = BTree::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for BTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<'a, T: Ord> IntoIterator for &'a BTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Ord> IntoIterator for BTree<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<T: Ord + Debug> Debug for BTree<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Debug> Display for BTree<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("root\n")?;

        match &self.root {
            None => f.write_str("None"),
            Some(node) => write!(f, "{node}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_tree(values: &[i32]) -> BTree<i32> {
        let mut tree = BTree::new();
        for value in values {
            tree.add(*value);
            tree.validate().unwrap();
        }
        tree
    }

    fn collect(tree: &BTree<i32>) -> Vec<i32> {
        tree.iter().copied().collect()
    }

    #[test]
    fn test_empty_tree() {
        let mut tree: BTree<i32> = BTree::new();

        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert!(!tree.contains(&1));
        assert!(!tree.remove(&1));
        assert_eq!(tree.first(), None);
        assert_eq!(tree.pop_first(), None);
        assert_eq!(tree.pop_last(), None);
        assert_eq!(tree.iter().next(), None);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_rejects_low_min_degree() {
        assert_eq!(
            BTree::<i32>::with_min_degree(1).err(),
            Some(BTreeError::InvalidMinDegree(1))
        );
        assert_eq!(BTree::<i32>::with_min_degree(4).unwrap().min_degree(), 4);
    }

    #[test]
    fn test_single_leaf_root() {
        let tree = create_tree(&[2, 1, 3]);

        let root = tree.root().unwrap();
        assert!(root.is_leaf());
        assert_eq!(root.values, vec![1, 2, 3]);
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn test_root_splits_when_full() {
        let tree = create_tree(&[1, 2, 3, 4]);

        let root = tree.root().unwrap();
        assert_eq!(root.values, vec![2]);
        let children: Vec<Vec<i32>> = root.children.iter().map(|c| c.values.clone()).collect();
        assert_eq!(children, vec![vec![1], vec![3, 4]]);
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn test_split_scenario() {
        let tree = create_tree(&[10, 20, 5, 6, 12, 30, 7, 17]);

        assert_eq!(collect(&tree), vec![5, 6, 7, 10, 12, 17, 20, 30]);
        assert!(tree.root().unwrap().values.len() > 1);
        assert_eq!(tree.len(), 8);
    }

    #[test]
    fn test_remove_from_leaf_root() {
        let mut tree = create_tree(&[1, 2, 3]);

        assert!(tree.remove(&2));
        assert!(!tree.remove(&2));
        assert_eq!(collect(&tree), vec![1, 3]);

        assert!(tree.remove(&1));
        assert!(tree.remove(&3));
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        tree.validate().unwrap();
    }

    #[test]
    fn test_remove_internal_value_uses_successor() {
        // root [2 4 6] over [1] [3] [5] [7 8]
        let mut tree = create_tree(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(tree.root().unwrap().values, vec![2, 4, 6]);

        assert!(tree.remove(&6));
        tree.validate().unwrap();

        assert_eq!(tree.root().unwrap().values, vec![2, 4, 7]);
        assert!(!tree.contains(&6));
        assert_eq!(tree.len(), 7);
    }

    #[test]
    fn test_remove_internal_value_uses_predecessor() {
        // root [2] over [0 1] [3 4 5]
        let mut tree = create_tree(&[1, 2, 3, 4, 5, 0]);
        assert_eq!(tree.root().unwrap().values, vec![2]);
        assert_eq!(tree.root().unwrap().children[0].values, vec![0, 1]);

        assert!(tree.remove(&2));
        tree.validate().unwrap();

        assert_eq!(tree.root().unwrap().values, vec![1]);
        assert_eq!(tree.root().unwrap().children[0].values, vec![0]);
        assert_eq!(tree.root().unwrap().children[1].values, vec![3, 4, 5]);
        assert_eq!(collect(&tree), vec![0, 1, 3, 4, 5]);
    }

    #[test]
    fn test_remove_internal_value_merges() {
        let mut tree = create_tree(&[1, 2, 3, 4, 5, 6, 7, 8]);

        assert!(tree.remove(&2));
        tree.validate().unwrap();

        assert_eq!(tree.root().unwrap().values, vec![4, 6]);
        assert_eq!(tree.root().unwrap().children[0].values, vec![1, 3]);
    }

    #[test]
    fn test_merge_collapses_root() {
        let mut tree = create_tree(&[1, 2, 3, 4]);
        assert!(tree.remove(&4));
        tree.validate().unwrap();
        assert_eq!(tree.height(), 2);

        // root [2] over [1] [3]: removing the separator merges and collapses
        assert!(tree.remove(&2));
        tree.validate().unwrap();
        assert_eq!(tree.height(), 1);
        assert_eq!(collect(&tree), vec![1, 3]);
    }

    #[test]
    fn test_absent_value_leaves_structure_alone() {
        let mut tree = create_tree(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        let before = tree.to_string();

        assert!(!tree.remove(&100));
        assert!(!tree.remove(&0));

        assert_eq!(tree.to_string(), before);
        assert_eq!(tree.len(), 11);
    }

    #[test]
    fn test_duplicates() {
        let mut tree = create_tree(&[5, 5, 5, 1, 5, 9, 5, 5]);

        assert_eq!(tree.len(), 8);
        assert_eq!(collect(&tree), vec![1, 5, 5, 5, 5, 5, 5, 9]);

        for remaining in (0..6).rev() {
            assert!(tree.remove(&5));
            tree.validate().unwrap();
            assert_eq!(collect(&tree).iter().filter(|v| **v == 5).count(), remaining);
        }
        assert!(!tree.remove(&5));
        assert_eq!(collect(&tree), vec![1, 9]);
    }

    #[test]
    fn test_first_last_and_pops() {
        let mut tree = create_tree(&[8, 3, 10, 1, 6, 14, 4, 7, 13]);

        assert_eq!(tree.first(), Some(&1));
        assert_eq!(tree.last(), Some(&14));

        assert_eq!(tree.pop_first(), Some(1));
        tree.validate().unwrap();
        assert_eq!(tree.pop_last(), Some(14));
        tree.validate().unwrap();

        assert_eq!(collect(&tree), vec![3, 4, 6, 7, 8, 10, 13]);
        assert_eq!(tree.len(), 7);
    }

    #[test]
    fn test_clear() {
        let mut tree = create_tree(&[1, 2, 3, 4, 5]);

        tree.clear();

        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert!(!tree.contains(&3));
        tree.add(3);
        assert_eq!(collect(&tree), vec![3]);
    }

    #[test]
    fn test_larger_degree() {
        let mut tree = BTree::with_min_degree(4).unwrap();
        for value in (0..200).rev() {
            tree.add(value);
        }
        tree.validate().unwrap();
        assert_eq!(collect(&tree), (0..200).collect::<Vec<_>>());

        for value in (0..200).step_by(3) {
            assert!(tree.remove(&value));
            tree.validate().unwrap();
        }
        assert_eq!(
            collect(&tree),
            (0..200).filter(|v| v % 3 != 0).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_display() {
        let tree = create_tree(&[1, 2, 3, 4]);

        assert_eq!(
            tree.to_string(),
            "root\n separators: [2]\n  values: [1]\n  values: [3, 4]\n"
        );
        assert_eq!(BTree::<i32>::new().to_string(), "root\nNone");
        assert_eq!(format!("{:?}", tree), "{1, 2, 3, 4}");
    }

    #[test]
    fn test_collect_and_extend() {
        let mut tree: BTree<i32> = vec![3, 1, 2].into_iter().collect();
        tree.extend([0, 4]);

        assert_eq!(tree.to_vec(), vec![0, 1, 2, 3, 4]);
        assert_eq!(tree.into_iter().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    }
}
