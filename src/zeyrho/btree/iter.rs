use std::iter::FusedIterator;

use crate::zeyrho::btree::node::Node;
use crate::zeyrho::btree::tree::BTree;

/// Ascending iterator over a `BTree`, created by `BTree::iter`.
///
/// Keeps the path from the root to the next value on an explicit stack.
/// Each frame holds a node and the index of the next value to yield from it;
/// after yielding value `i` of an internal node the walk descends to the
/// left-most leaf under child `i + 1`.
pub struct Iter<'a, T> {
    stack: Vec<(&'a Node<T>, usize)>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(super) fn new(root: Option<&'a Node<T>>, len: usize) -> Self {
        let mut iter = Iter {
            stack: Vec::new(),
            remaining: len,
        };
        if let Some(root) = root {
            iter.descend_left(root);
        }
        iter
    }

    fn descend_left(&mut self, node: &'a Node<T>) {
        let mut node = node;
        loop {
            self.stack.push((node, 0));
            match node.children.first() {
                Some(child) => node = child,
                None => break,
            }
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            let node = frame.0;
            let index = frame.1;

            if index < node.values.len() {
                frame.1 += 1;
                if let Some(child) = node.children.get(index + 1) {
                    self.descend_left(child);
                }
                self.remaining = self.remaining.saturating_sub(1);
                return Some(&node.values[index]);
            }

            self.stack.pop();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Owning ascending iterator, created by `BTree::into_iter`.
///
/// Values are taken out of the tree one at a time from either end.
pub struct IntoIter<T> {
    tree: BTree<T>,
}

impl<T: Ord> IntoIter<T> {
    pub(super) fn new(tree: BTree<T>) -> Self {
        IntoIter { tree }
    }
}

impl<T: Ord> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.tree.pop_first()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len(), Some(self.tree.len()))
    }
}

impl<T: Ord> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.tree.pop_last()
    }
}

impl<T: Ord> ExactSizeIterator for IntoIter<T> {}

impl<T: Ord> FusedIterator for IntoIter<T> {}
