use std::mem;

use tracing::trace;

use crate::{
    error::{Error, Result},
    KeyVal,
};

/// Result of looking up a key inside a single node.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SearchResult {
    /// The key is stored at this position.
    Found(usize),
    /// The key is not in this node. For internal nodes this is the index of the
    /// child subtree that would contain the key.
    NotFound(usize),
}

/// Which entry a deletion descent is looking for.
#[derive(Debug)]
pub enum Target<'a, K> {
    Key(&'a K),
    /// The largest entry of the subtree (in-order predecessor of the parent separator).
    Max,
    /// The smallest entry of the subtree (in-order successor of the parent separator).
    Min,
}

/// A single B-tree node.
///
/// Holds up to `2d - 1` entries sorted by key and, if it is an internal node,
/// exactly one more child than entries.
pub struct BtreeNode<K, V> {
    entries: Vec<KeyVal<K, V>>,
    children: Vec<Box<BtreeNode<K, V>>>,
    is_leaf: bool,
    order: usize,
}

impl<K, V> BtreeNode<K, V>
where
    K: Ord,
{
    pub fn new(order: usize, is_leaf: bool) -> BtreeNode<K, V> {
        let children = if is_leaf {
            Vec::new()
        } else {
            Vec::with_capacity(2 * order)
        };
        BtreeNode {
            entries: Vec::with_capacity(2 * order - 1),
            children,
            is_leaf,
            order,
        }
    }

    /// Number of live entries in this node.
    pub fn key_num(&self) -> usize {
        self.entries.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    pub fn max_keys(&self) -> usize {
        2 * self.order - 1
    }

    pub fn is_full(&self) -> bool {
        self.key_num() == self.max_keys()
    }

    /// A node is leanable if it can donate one entry without falling below `d - 1` entries.
    pub fn is_leanable(&self) -> bool {
        self.key_num() >= self.order
    }

    pub fn entries(&self) -> &[KeyVal<K, V>] {
        &self.entries
    }

    pub fn children(&self) -> &[Box<BtreeNode<K, V>>] {
        &self.children
    }

    pub fn child(&self, i: usize) -> &BtreeNode<K, V> {
        &self.children[i]
    }

    pub fn child_mut(&mut self, i: usize) -> &mut BtreeNode<K, V> {
        &mut self.children[i]
    }

    pub fn get_key_val(&self, i: usize) -> Option<&KeyVal<K, V>> {
        self.entries.get(i)
    }

    pub fn binary_search(&self, key: &K) -> SearchResult {
        match self.entries.binary_search_by(|e| e.key().cmp(key)) {
            Ok(i) => SearchResult::Found(i),
            Err(i) => SearchResult::NotFound(i),
        }
    }

    /// Locate the target of a deletion descent in this node.
    ///
    /// `Max` and `Min` only report `Found` in leaves, internal nodes always point to the
    /// outermost child. The node must not be an empty leaf for `Max`.
    pub fn locate(&self, target: &Target<'_, K>) -> SearchResult {
        match target {
            Target::Key(key) => self.binary_search(key),
            Target::Max if self.is_leaf => SearchResult::Found(self.key_num() - 1),
            Target::Max => SearchResult::NotFound(self.key_num()),
            Target::Min if self.is_leaf => SearchResult::Found(0),
            Target::Min => SearchResult::NotFound(0),
        }
    }

    /// Find the node in this subtree that stores the key.
    pub fn search_node(&self, key: &K) -> Option<&BtreeNode<K, V>> {
        match self.binary_search(key) {
            SearchResult::Found(_) => Some(self),
            SearchResult::NotFound(_) if self.is_leaf => None,
            SearchResult::NotFound(i) => self.children[i].search_node(key),
        }
    }

    pub fn search_node_mut(&mut self, key: &K) -> Option<&mut BtreeNode<K, V>> {
        match self.binary_search(key) {
            SearchResult::Found(_) => Some(self),
            SearchResult::NotFound(_) if self.is_leaf => None,
            SearchResult::NotFound(i) => self.children[i].search_node_mut(key),
        }
    }

    pub fn search(&self, key: &K) -> Option<&KeyVal<K, V>> {
        let node = self.search_node(key)?;
        match node.binary_search(key) {
            SearchResult::Found(i) => node.entries.get(i),
            SearchResult::NotFound(_) => None,
        }
    }

    /// Replace the entry with the same key and return the previous one.
    pub fn update(&mut self, entry: KeyVal<K, V>) -> Result<KeyVal<K, V>> {
        match self.binary_search(entry.key()) {
            SearchResult::Found(i) => Ok(mem::replace(&mut self.entries[i], entry)),
            SearchResult::NotFound(_) => Err(Error::KeyNotInNode),
        }
    }

    /// Insert an entry at its ordered position, shifting all larger entries one slot to the
    /// right. The node must not be full and must not contain the key.
    ///
    /// Returns the position of the new entry.
    pub fn insert_inside(&mut self, entry: KeyVal<K, V>) -> usize {
        debug_assert!(!self.is_full());
        let i = match self.binary_search(entry.key()) {
            SearchResult::Found(i) | SearchResult::NotFound(i) => i,
        };
        self.entries.insert(i, entry);
        i
    }

    /// Remove the entry at the given position, shifting all larger entries one slot to the
    /// left.
    pub fn remove_inside(&mut self, i: usize) -> KeyVal<K, V> {
        self.entries.remove(i)
    }

    /// Put a new entry at position `i` and return the one that was there before.
    pub fn replace_entry(&mut self, i: usize, entry: KeyVal<K, V>) -> KeyVal<K, V> {
        mem::replace(&mut self.entries[i], entry)
    }

    /// Split the full child at index `i`.
    ///
    /// The upper `d - 1` entries (and upper `d` children) move into a new sibling that is
    /// inserted at `i + 1`, the median entry is promoted into this node at position `i`.
    pub fn split_child(&mut self, i: usize) {
        let d = self.order;
        let child = &mut self.children[i];
        debug_assert!(child.is_full());

        let mut sibling = BtreeNode::new(d, child.is_leaf);
        sibling.entries.extend(child.entries.drain(d..));
        if !child.is_leaf {
            sibling.children.extend(child.children.drain(d..));
        }
        let median = child.entries.remove(d - 1);

        self.entries.insert(i, median);
        self.children.insert(i + 1, Box::new(sibling));
        trace!(child = i, "split full child node");
    }

    /// Move all entries and children of the sibling `src` into this node, keeping them
    /// ordered.
    ///
    /// Whether `src` holds the smaller or the larger keys is decided by comparing the
    /// first entries. Returns the position at which the separator between both nodes
    /// has to be inserted.
    pub fn merge_node(&mut self, mut src: BtreeNode<K, V>) -> usize {
        debug_assert!(self.key_num() + src.key_num() < self.max_keys());

        let src_is_lower = match (src.entries.first(), self.entries.first()) {
            (Some(s), Some(d)) => s < d,
            _ => false,
        };
        if src_is_lower {
            let slot = src.key_num();
            src.entries.append(&mut self.entries);
            mem::swap(&mut self.entries, &mut src.entries);
            src.children.append(&mut self.children);
            mem::swap(&mut self.children, &mut src.children);
            slot
        } else {
            let slot = self.key_num();
            self.entries.append(&mut src.entries);
            self.children.append(&mut src.children);
            slot
        }
    }

    /// Merge the children at `i` and `i + 1` into one node at `i`, sinking the separator
    /// entry `i` into the merged node.
    pub fn merge_children(&mut self, i: usize) {
        let separator = self.entries.remove(i);
        let right = self.children.remove(i + 1);
        let merged = &mut self.children[i];
        let slot = merged.merge_node(*right);
        merged.entries.insert(slot, separator);
        trace!(child = i, keys = merged.key_num(), "merged sibling nodes");
    }

    /// Rotate the last entry of the left sibling of child `i` through the parent separator
    /// into the front of child `i`.
    pub fn borrow_from_left(&mut self, i: usize) {
        let (lower, upper) = self.children.split_at_mut(i);
        let left = &mut lower[i - 1];
        let child = &mut upper[0];

        let last = left.key_num() - 1;
        let donated = left.remove_inside(last);
        let separator = mem::replace(&mut self.entries[i - 1], donated);
        child.entries.insert(0, separator);
        if !left.is_leaf {
            let moved = left.children.remove(last + 1);
            child.children.insert(0, moved);
        }
        trace!(child = i, "borrowed entry from left sibling");
    }

    /// Rotate the first entry of the right sibling of child `i` through the parent
    /// separator into the back of child `i`.
    pub fn borrow_from_right(&mut self, i: usize) {
        let (lower, upper) = self.children.split_at_mut(i + 1);
        let child = &mut lower[i];
        let right = &mut upper[0];

        let donated = right.remove_inside(0);
        let separator = mem::replace(&mut self.entries[i], donated);
        child.entries.push(separator);
        if !right.is_leaf {
            child.children.push(right.children.remove(0));
        }
        trace!(child = i, "borrowed entry from right sibling");
    }

    /// Add a child at the end of the child list of an internal node.
    pub fn push_child(&mut self, child: Box<BtreeNode<K, V>>) {
        debug_assert!(!self.is_leaf);
        self.children.push(child);
    }

    /// Take the only remaining child out of an internal node without entries.
    pub fn take_sole_child(&mut self) -> Option<Box<BtreeNode<K, V>>> {
        if self.is_leaf || !self.entries.is_empty() || self.children.len() != 1 {
            return None;
        }
        self.children.pop()
    }
}
