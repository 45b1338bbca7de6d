//! Order-statistics tree backed by an AVL tree
//!
//! `SumTree` stores an ordered sequence of items. Every node caches the sum
//! of its subtree's item summaries plus the subtree's item count, so that
//! both positional access (by item index) and rank queries (by any monotone
//! measure over the summaries, e.g. byte or codepoint offset) run in
//! O(log N).
//!
//! It supports:
//! - Rank queries with a configurable tie-break ([`Bias`])
//! - Range splicing (erase a run of items and insert a new run) in
//!   O(k + log N) via split/join
//! - In-place item updates with re-synthesis along the root path

use std::cmp::max;
use std::ops::Range;

/// Aggregate over a run of items
pub trait Summary: Copy + Default + std::fmt::Debug {
    fn combine(self, other: Self) -> Self;
}

/// An item that can be stored in a [`SumTree`]
pub trait Summarize: Clone {
    type Summary: Summary;

    fn summary(&self) -> Self::Summary;
}

/// Tie-break for a rank query whose target falls exactly on an item boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bias {
    /// Inclusive: resolve to the item *ending* at the target
    Left,
    /// Exclusive: resolve to the item *starting* at the target
    Right,
}

/// Result of a positional or rank query
#[derive(Debug)]
pub struct Located<'a, T: Summarize> {
    /// Index of the item in the sequence
    pub index: usize,
    /// Sum of all items strictly before this one
    pub before: T::Summary,
    pub item: &'a T,
}

#[derive(Clone, Debug)]
struct Node<T: Summarize> {
    left: Option<Box<Node<T>>>,
    right: Option<Box<Node<T>>>,
    item: T,

    // Metadata
    sum: T::Summary, // Sum of this subtree
    count: usize,    // Number of items in this subtree
    height: usize,   // Height for AVL balancing
}

impl<T: Summarize> Node<T> {
    fn leaf(item: T) -> Box<Self> {
        let sum = item.summary();
        Box::new(Self {
            left: None,
            right: None,
            item,
            sum,
            count: 1,
            height: 1,
        })
    }
}

/// An ordered sequence of summarized items.
#[derive(Clone, Debug)]
pub struct SumTree<T: Summarize> {
    root: Option<Box<Node<T>>>,
}

impl<T: Summarize> Default for SumTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Summarize> SumTree<T> {
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Build a perfectly balanced tree in O(N)
    pub fn from_items(items: Vec<T>) -> Self {
        let len = items.len();
        let mut iter = items.into_iter();
        Self {
            root: build(&mut iter, len),
        }
    }

    /// Number of items
    pub fn len(&self) -> usize {
        count(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Sum over all items
    pub fn summary(&self) -> T::Summary {
        self.root.as_ref().map_or_else(T::Summary::default, |n| n.sum)
    }

    /// Height of the tree (0 when empty)
    pub fn depth(&self) -> usize {
        height(&self.root)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.locate(index).map(|l| l.item)
    }

    pub fn last(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Find the item at `index` together with the sum of its predecessors
    pub fn locate(&self, index: usize) -> Option<Located<'_, T>> {
        let mut node = self.root.as_deref()?;
        let mut before = T::Summary::default();
        let mut remaining = index;
        let mut base = 0;
        loop {
            let left_count = count(&node.left);
            if remaining < left_count {
                node = node.left.as_deref()?;
                continue;
            }
            if let Some(left) = node.left.as_deref() {
                before = before.combine(left.sum);
            }
            if remaining == left_count {
                return Some(Located {
                    index: base + left_count,
                    before,
                    item: &node.item,
                });
            }
            before = before.combine(node.item.summary());
            remaining -= left_count + 1;
            base += left_count + 1;
            node = node.right.as_deref()?;
        }
    }

    /// Rank query: find the item containing `target` in the dimension
    /// extracted by `measure`.
    ///
    /// With [`Bias::Right`] this is the first item whose end is strictly past
    /// `target`; with [`Bias::Left`] the first item whose end is at or past
    /// it. Returns `None` when no such item exists (past the end).
    /// `measure` must be monotone over prefix sums.
    pub fn find<F>(&self, target: usize, measure: F, bias: Bias) -> Option<Located<'_, T>>
    where
        F: Fn(&T::Summary) -> usize,
    {
        let hit = |end: usize| match bias {
            Bias::Left => end >= target,
            Bias::Right => end > target,
        };

        let mut node = self.root.as_deref()?;
        let mut before = T::Summary::default();
        let mut index = 0;
        loop {
            if let Some(left) = node.left.as_deref() {
                let left_end = before.combine(left.sum);
                if hit(measure(&left_end)) {
                    node = left;
                    continue;
                }
                before = left_end;
                index += left.count;
            }
            let item_end = before.combine(node.item.summary());
            if hit(measure(&item_end)) {
                return Some(Located {
                    index,
                    before,
                    item: &node.item,
                });
            }
            before = item_end;
            index += 1;
            node = node.right.as_deref()?;
        }
    }

    /// Modify the item at `index` in place. Returns `false` if out of range.
    pub fn update<F>(&mut self, index: usize, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        if index >= self.len() {
            return false;
        }
        update_at(self.root.as_mut(), index, f);
        true
    }

    /// Replace the items in `range` with `items`.
    pub fn splice(&mut self, range: Range<usize>, items: Vec<T>) {
        let len = self.len();
        assert!(
            range.start <= range.end && range.end <= len,
            "splice range {:?} out of bounds (len: {})",
            range,
            len
        );

        // Split at start, split the right part at the range length, drop the middle.
        let (left, rest) = split(self.root.take(), range.start);
        let (_, right) = split(rest, range.end - range.start);

        let count = items.len();
        let mut iter = items.into_iter();
        let middle = build(&mut iter, count);

        self.root = merge(merge(left, middle), right);
    }

    pub fn push(&mut self, item: T) {
        let len = self.len();
        self.splice(len..len, vec![item]);
    }

    /// In-order iterator over all items
    pub fn iter(&self) -> Iter<'_, T> {
        self.iter_from(0)
    }

    /// In-order iterator starting at item `index`
    pub fn iter_from(&self, index: usize) -> Iter<'_, T> {
        let mut stack = Vec::new();
        let mut node = self.root.as_deref();
        let mut remaining = index;
        while let Some(n) = node {
            let left_count = count(&n.left);
            if remaining < left_count {
                stack.push(n);
                node = n.left.as_deref();
            } else if remaining == left_count {
                stack.push(n);
                break;
            } else {
                remaining -= left_count + 1;
                node = n.right.as_deref();
            }
        }
        Iter { stack }
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

/// In-order iterator over a [`SumTree`]
pub struct Iter<'a, T: Summarize> {
    stack: Vec<&'a Node<T>>,
}

impl<'a, T: Summarize> Iter<'a, T> {
    fn push_left(&mut self, mut node: &'a Node<T>) {
        self.stack.push(node);
        while let Some(left) = &node.left {
            self.stack.push(left);
            node = left;
        }
    }
}

impl<'a, T: Summarize> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(right) = node.right.as_deref() {
            self.push_left(right);
        }
        Some(&node.item)
    }
}

// --- Tree Operations ---

fn height<T: Summarize>(node: &Option<Box<Node<T>>>) -> usize {
    node.as_ref().map_or(0, |n| n.height)
}

fn count<T: Summarize>(node: &Option<Box<Node<T>>>) -> usize {
    node.as_ref().map_or(0, |n| n.count)
}

fn update<T: Summarize>(node: &mut Node<T>) {
    let mut sum = T::Summary::default();
    if let Some(left) = &node.left {
        sum = sum.combine(left.sum);
    }
    sum = sum.combine(node.item.summary());
    if let Some(right) = &node.right {
        sum = sum.combine(right.sum);
    }
    node.sum = sum;
    node.count = count(&node.left) + 1 + count(&node.right);
    node.height = 1 + max(height(&node.left), height(&node.right));
}

fn balance<T: Summarize>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    update(&mut node);
    let balance_factor = height(&node.left) as isize - height(&node.right) as isize;

    if balance_factor > 1 {
        let left = node.left.as_ref().expect("left-heavy node has a left child");
        if height(&left.left) >= height(&left.right) {
            return rotate_right(node);
        } else {
            return rotate_left_right(node);
        }
    } else if balance_factor < -1 {
        let right = node.right.as_ref().expect("right-heavy node has a right child");
        if height(&right.right) >= height(&right.left) {
            return rotate_left(node);
        } else {
            return rotate_right_left(node);
        }
    }
    node
}

fn rotate_right<T: Summarize>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    let mut new_root = node.left.take().expect("rotate_right needs a left child");
    node.left = new_root.right.take();
    update(&mut node);
    new_root.right = Some(node);
    update(&mut new_root);
    new_root
}

fn rotate_left<T: Summarize>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    let mut new_root = node.right.take().expect("rotate_left needs a right child");
    node.right = new_root.left.take();
    update(&mut node);
    new_root.left = Some(node);
    update(&mut new_root);
    new_root
}

fn rotate_left_right<T: Summarize>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    if let Some(left) = node.left.take() {
        node.left = Some(rotate_left(left));
    }
    rotate_right(node)
}

fn rotate_right_left<T: Summarize>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    if let Some(right) = node.right.take() {
        node.right = Some(rotate_right(right));
    }
    rotate_left(node)
}

// --- Build, Split and Merge ---

/// Consume `n` items from `items` into a balanced subtree, in order
fn build<T: Summarize>(items: &mut impl Iterator<Item = T>, n: usize) -> Option<Box<Node<T>>> {
    if n == 0 {
        return None;
    }
    let left_count = n / 2;
    let left = build(items, left_count);
    let item = items.next()?;
    let right = build(items, n - left_count - 1);

    let mut node = Node::leaf(item);
    node.left = left;
    node.right = right;
    update(&mut node);
    Some(node)
}

/// Split into the first `index` items and the rest
fn split<T: Summarize>(
    root: Option<Box<Node<T>>>,
    index: usize,
) -> (Option<Box<Node<T>>>, Option<Box<Node<T>>>) {
    match root {
        None => (None, None),
        Some(mut node) => {
            let left_count = count(&node.left);
            let left_child = node.left.take();
            let right_child = node.right.take();

            if index <= left_count {
                let (l, r) = split(left_child, index);
                (l, Some(join_with_root(r, node, right_child)))
            } else {
                let (l, r) = split(right_child, index - left_count - 1);
                (Some(join_with_root(left_child, node, l)), r)
            }
        }
    }
}

fn merge<T: Summarize>(
    left: Option<Box<Node<T>>>,
    right: Option<Box<Node<T>>>,
) -> Option<Box<Node<T>>> {
    match (left, right) {
        (None, r) => r,
        (l, None) => l,
        (Some(l), Some(r)) => {
            let (new_left, center) = delete_max(l);
            Some(join_with_root(new_left, center, Some(r)))
        }
    }
}

fn delete_max<T: Summarize>(mut node: Box<Node<T>>) -> (Option<Box<Node<T>>>, Box<Node<T>>) {
    if let Some(right) = node.right.take() {
        let (new_right, max) = delete_max(right);
        node.right = new_right;
        (Some(balance(node)), max)
    } else {
        (node.left.take(), node)
    }
}

/// Join `left`, `center`, `right` (in that order) into one balanced tree.
/// `center` must have no children.
fn join_with_root<T: Summarize>(
    left: Option<Box<Node<T>>>,
    mut center: Box<Node<T>>,
    right: Option<Box<Node<T>>>,
) -> Box<Node<T>> {
    let lh = height(&left);
    let rh = height(&right);

    if (lh as isize - rh as isize).abs() <= 1 {
        center.left = left;
        center.right = right;
        update(&mut center);
        center
    } else if lh > rh {
        let Some(mut left_node) = left else {
            unreachable!("taller side is non-empty")
        };
        let new_right = join_with_root(left_node.right.take(), center, right);
        left_node.right = Some(new_right);
        balance(left_node)
    } else {
        let Some(mut right_node) = right else {
            unreachable!("taller side is non-empty")
        };
        let new_left = join_with_root(left, center, right_node.left.take());
        right_node.left = Some(new_left);
        balance(right_node)
    }
}

fn update_at<T: Summarize, F: FnOnce(&mut T)>(node: Option<&mut Box<Node<T>>>, index: usize, f: F) {
    let Some(node) = node else {
        return;
    };
    let left_count = count(&node.left);
    if index < left_count {
        update_at(node.left.as_mut(), index, f);
    } else if index == left_count {
        f(&mut node.item);
    } else {
        update_at(node.right.as_mut(), index - left_count - 1, f);
    }
    update(node);
}
