use std::fmt::{Debug, Display, Formatter};
use std::mem;

use crate::tracing_helpers::trace_log;
use crate::zeyrho::btree::error::{BTreeError, Result};
use crate::zeyrho::btree::{max_values, min_values, LOWEST_MIN_DEGREE};

/// A single B-tree node.
///
/// Internal nodes always hold one more child than values. A node never
/// changes between leaf and internal after it is built; the tree swaps in a
/// new root instead.
#[derive(Debug)]
pub(super) struct Node<T> {
    pub(super) values: Vec<T>,
    pub(super) children: Vec<Node<T>>,
    leaf: bool,
    min_degree: usize,
}

impl<T> Node<T> {
    pub(super) fn is_leaf(&self) -> bool {
        self.leaf
    }

    pub(super) fn is_full(&self) -> bool {
        self.values.len() == max_values(self.min_degree)
    }

    pub(super) fn len(&self) -> usize {
        self.values.len()
    }

    pub(super) fn min_degree(&self) -> usize {
        self.min_degree
    }

    // Checks the shape a node is about to be built with. Ordering is checked
    // separately by `debug_check_values` since it needs `T: Ord`.
    fn validate_potential_state(
        root: bool,
        leaf: bool,
        min_degree: usize,
        values: usize,
        children: usize,
    ) -> Result<()> {
        if min_degree < LOWEST_MIN_DEGREE {
            return Err(BTreeError::InvalidMinDegree(min_degree));
        }

        if values == 0 && children != 0 {
            return Err(BTreeError::Invariant("an empty node cannot have children".into()));
        }

        if values > max_values(min_degree) {
            return Err(BTreeError::Invariant(format!(
                "{values} values exceeds the maximum of {}",
                max_values(min_degree)
            )));
        }

        if !root && values < min_values(min_degree) {
            return Err(BTreeError::Invariant(format!(
                "non-root node holds {values} values, needs at least {}",
                min_values(min_degree)
            )));
        }

        if leaf && children != 0 {
            return Err(BTreeError::Invariant("a leaf cannot have children".into()));
        }

        if !leaf && values != 0 && values + 1 != children {
            return Err(BTreeError::Invariant(format!(
                "internal node has {values} values but {children} children"
            )));
        }

        Ok(())
    }

    fn debug_check_shape(&self, root: bool) {
        if cfg!(debug_assertions) {
            if let Err(err) = Self::validate_potential_state(
                root,
                self.leaf,
                self.min_degree,
                self.values.len(),
                self.children.len(),
            ) {
                panic!("{err}");
            }
        }
    }

    fn fmt_depth(&self, f: &mut Formatter<'_>, depth: usize) -> std::fmt::Result
    where
        T: Debug,
    {
        f.write_str(&" ".repeat(depth))?;
        if self.leaf {
            writeln!(f, "values: {:?}", self.values)?;
        } else {
            writeln!(f, "separators: {:?}", self.values)?;
        }
        for child in &self.children {
            child.fmt_depth(f, depth + 1)?;
        }
        Ok(())
    }
}

impl<T: Ord> Node<T> {
    pub(super) fn new(
        root: bool,
        leaf: bool,
        min_degree: usize,
        values: Vec<T>,
        children: Vec<Node<T>>,
    ) -> Self {
        let node = Node {
            values,
            children,
            leaf,
            min_degree,
        };
        node.debug_check_shape(root);
        node.debug_check_values();
        node
    }

    pub(super) fn new_leaf_root(value: T, min_degree: usize) -> Self {
        Node::new(true, true, min_degree, vec![value], Vec::new())
    }

    fn debug_check_values(&self) {
        if cfg!(debug_assertions) {
            debug_assert!(
                self.values.windows(2).all(|pair| pair[0] <= pair[1]),
                "node values are out of order"
            );
        }
    }

    /// Index of the child a descent for `value` continues into. Equal values
    /// route right.
    pub(super) fn child_index_for(&self, value: &T) -> usize {
        self.values
            .iter()
            .position(|v| value < v)
            .unwrap_or(self.values.len())
    }

    /// Index of the first value equal to `value`.
    pub(super) fn index_of(&self, value: &T) -> Option<usize> {
        self.values.iter().position(|v| v == value)
    }

    // Moves the median and everything above it out of this full node. This
    // node keeps the lower half, the median and a new upper-half sibling are
    // returned.
    fn split_off_upper_half(&mut self) -> (T, Node<T>) {
        let median_index = self.values.len() / 2;

        let mut upper_values = self.values.split_off(median_index);
        let median = upper_values.remove(0);

        let upper_children = if self.leaf {
            Vec::new()
        } else {
            self.children.split_off(median_index + 1)
        };

        self.debug_check_shape(false);
        let right = Node::new(false, self.leaf, self.min_degree, upper_values, upper_children);

        (median, right)
    }

    /// Splits the full child at `index`, pulling its median up into this node.
    ///
    /// ```text
    ///     [3          9]
    /// [1 2] [4 5 6 7 8] [10 11]
    ///
    ///     [3     6     9]
    /// [1 2] [4 5] [7 8] [10 11]
    /// ```
    pub(super) fn split_full_child(&mut self, index: usize) {
        debug_assert!(self.children[index].is_full(), "split of a non-full child");

        let (median, right) = self.children[index].split_off_upper_half();
        self.values.insert(index, median);
        self.children.insert(index + 1, right);

        trace_log!(index, "split full child");
        self.debug_check_values();
    }

    /// Splits this full root into a new root holding only the median.
    pub(super) fn split_full_root(mut self) -> Node<T> {
        debug_assert!(self.is_full(), "split of a non-full root");

        let min_degree = self.min_degree;
        let (median, right) = self.split_off_upper_half();

        Node::new(true, false, min_degree, vec![median], vec![self, right])
    }

    /// Inserts `value` after any equal values already in this leaf.
    pub(super) fn insert_into_leaf(&mut self, value: T) -> Result<()> {
        if !self.leaf {
            return Err(BTreeError::NotALeaf { operation: "insert into" });
        }

        if self.is_full() {
            return Err(BTreeError::NodeFull);
        }

        let index = self
            .values
            .iter()
            .position(|v| v > &value)
            .unwrap_or(self.values.len());

        self.values.insert(index, value);
        self.debug_check_values();
        Ok(())
    }

    /// Removes the first value equal to `value`, returning whether one was found.
    pub(super) fn delete_from_leaf(&mut self, value: &T) -> Result<bool> {
        if !self.leaf {
            return Err(BTreeError::NotALeaf { operation: "delete from" });
        }

        match self.index_of(value) {
            Some(index) => {
                self.values.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Overwrites the value at `index`, returning the old one. The new value
    /// has to fit between its neighbours.
    pub(super) fn replace_value(&mut self, index: usize, value: T) -> T {
        let old = mem::replace(&mut self.values[index], value);
        self.debug_check_values();
        old
    }

    /// Merges the children either side of the value at `index` together with
    /// that value, returning the merged child now at `index`.
    ///
    /// ```text
    ///     [3     6]
    /// [1 2] [4 5] [7 8]
    ///
    ///           [6]
    /// [1 2 3 4 5] [7 8]
    /// ```
    pub(super) fn push_down(&mut self, index: usize) -> &mut Node<T> {
        let separator = self.values.remove(index);
        let Node {
            values: right_values,
            children: right_children,
            ..
        } = self.children.remove(index + 1);

        let merged = &mut self.children[index];
        merged.values.push(separator);
        merged.values.extend(right_values);
        merged.children.extend(right_children);

        trace_log!(index, size = merged.values.len(), "pushed down separator");
        merged.debug_check_shape(false);
        merged.debug_check_values();
        merged
    }

    /// Prepends a value and, for internal nodes, the child to its left.
    pub(super) fn add_front(&mut self, value: T, child: Option<Node<T>>) {
        self.values.insert(0, value);
        self.debug_check_values();
        if let Some(child) = child {
            debug_assert!(!self.leaf, "child added to a leaf");
            self.children.insert(0, child);
        }
    }

    /// Appends a value and, for internal nodes, the child to its right.
    pub(super) fn add_end(&mut self, value: T, child: Option<Node<T>>) {
        self.values.push(value);
        self.debug_check_values();
        if let Some(child) = child {
            debug_assert!(!self.leaf, "child added to a leaf");
            self.children.push(child);
        }
    }

    /// Removes the first value and, for internal nodes, the first child.
    pub(super) fn remove_first(&mut self) -> Option<(T, Option<Node<T>>)> {
        if self.values.is_empty() {
            return None;
        }

        let value = self.values.remove(0);
        let child = if self.leaf {
            None
        } else {
            Some(self.children.remove(0))
        };
        Some((value, child))
    }

    /// Removes the last value and, for internal nodes, the last child.
    pub(super) fn remove_last(&mut self) -> Option<(T, Option<Node<T>>)> {
        let value = self.values.pop()?;
        let child = if self.leaf { None } else { self.children.pop() };
        Some((value, child))
    }

    /// Checks the subtree rooted here, returning how many values it holds.
    ///
    /// `lower` and `upper` bound every value of the subtree; `leaf_depth` is
    /// filled in by the first leaf reached and compared against every other.
    pub(super) fn validate_subtree(
        &self,
        root: bool,
        lower: Option<&T>,
        upper: Option<&T>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
    ) -> Result<usize> {
        Self::validate_potential_state(
            root,
            self.leaf,
            self.min_degree,
            self.values.len(),
            self.children.len(),
        )?;

        if self.values.is_empty() {
            return Err(BTreeError::Invariant("a node in the tree holds no values".into()));
        }

        if !self.values.windows(2).all(|pair| pair[0] <= pair[1]) {
            return Err(BTreeError::Invariant(format!("values out of order at depth {depth}")));
        }

        let in_bounds = self.values.iter().all(|v| {
            lower.map_or(true, |lower| lower <= v) && upper.map_or(true, |upper| v <= upper)
        });
        if !in_bounds {
            return Err(BTreeError::Invariant(format!(
                "values at depth {depth} escape their separators"
            )));
        }

        if self.leaf {
            match *leaf_depth {
                None => *leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    return Err(BTreeError::Invariant(format!(
                        "leaf at depth {depth}, expected {expected}"
                    )));
                }
                Some(_) => {}
            }
            return Ok(self.values.len());
        }

        let mut count = self.values.len();
        for (index, child) in self.children.iter().enumerate() {
            if child.min_degree != self.min_degree {
                return Err(BTreeError::Invariant("mixed minimum degrees".into()));
            }
            let child_lower = if index == 0 { lower } else { self.values.get(index - 1) };
            let child_upper = self.values.get(index).or(upper);
            count += child.validate_subtree(false, child_lower, child_upper, depth + 1, leaf_depth)?;
        }
        Ok(count)
    }
}

impl<T: Debug> Display for Node<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.fmt_depth(f, 1)
    }
}
