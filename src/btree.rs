use tracing::debug;

use crate::{
    error::{Error, Result},
    BtreeConfig, KeyVal, MAX_ORDER,
};

use node::{BtreeNode, SearchResult, Target};

mod node;

/// In-memory B-tree index.
///
/// The tree is parameterized by its order `d` (minimum degree): every node except the root
/// holds between `d - 1` and `2d - 1` entries and all leaves are at the same depth.
/// Insertion splits full nodes on the way down and deletion rebalances on the way down, so
/// both operations finish in a single pass from the root.
///
/// Readers only need shared access, so lookups can run in parallel. Modifications take
/// `&mut self` and are therefore serialized by the caller.
pub struct BtreeIndex<K, V> {
    root: Box<BtreeNode<K, V>>,
    order: usize,
    nr_elements: usize,
}

impl<K, V> Default for BtreeIndex<K, V>
where
    K: Ord,
{
    fn default() -> Self {
        BtreeIndex::empty(BtreeConfig::default().order)
    }
}

impl<K, V> BtreeIndex<K, V>
where
    K: Ord,
{
    /// Create a new empty index with the given configuration.
    pub fn with_config(config: BtreeConfig) -> Result<BtreeIndex<K, V>> {
        if config.order < 2 {
            return Err(Error::OrderTooSmall(config.order));
        } else if config.order > MAX_ORDER {
            return Err(Error::OrderTooLarge(config.order));
        }
        Ok(BtreeIndex::empty(config.order))
    }

    fn empty(order: usize) -> BtreeIndex<K, V> {
        debug!(order, "created empty B-tree index");

        // Always start with an empty leaf as root
        BtreeIndex {
            root: Box::new(BtreeNode::new(order, true)),
            order,
            nr_elements: 0,
        }
    }

    /// Create a new empty index with the given order (minimum degree).
    pub fn new(order: usize) -> Result<BtreeIndex<K, V>> {
        BtreeIndex::with_config(BtreeConfig::default().order(order))
    }

    /// Searches for a key and returns the stored key/value pair if found.
    pub fn search(&self, key: &K) -> Option<&KeyVal<K, V>> {
        self.root.search(key)
    }

    /// Searches for a key in the index and returns the value if found.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.search(key).map(|e| e.val())
    }

    /// Returns whether the index contains the given key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.root.search_node(key).is_some()
    }

    /// Insert a new element into the index.
    ///
    /// If the key already exists, only its value is replaced and the shape of the tree
    /// stays the same.
    pub fn put(&mut self, key: K, value: V) -> Result<()> {
        let entry = KeyVal::new(key, value);
        if let Some(node) = self.root.search_node_mut(entry.key()) {
            node.update(entry)?;
            return Ok(());
        }
        self.insert(entry);
        self.nr_elements += 1;
        Ok(())
    }

    /// Remove the key from the index and return its value.
    ///
    /// Deleting a key that does not exist is a no-op and returns `None`.
    pub fn delete(&mut self, key: &K) -> Result<Option<V>> {
        if !self.contains_key(key) {
            return Ok(None);
        }
        let removed = remove_entry(&mut self.root, &Target::Key(key))?;
        self.nr_elements -= 1;

        // A merge below the root may have sunk its last separator
        if let Some(new_root) = self.root.take_sole_child() {
            self.root = new_root;
            debug!(height = self.height(), "collapsed root node");
        }

        let (_, value) = removed.into_parts();
        Ok(Some(value))
    }

    /// Returns true if the index does not contain any elements.
    pub fn is_empty(&self) -> bool {
        self.nr_elements == 0
    }

    /// Returns the number of elements in the index.
    pub fn len(&self) -> usize {
        self.nr_elements
    }

    /// Returns the order (minimum degree) of the tree.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Returns the number of levels of the tree, an empty tree has height 1.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = self.root.as_ref();
        while !node.is_leaf() {
            node = node.child(0);
            height += 1;
        }
        height
    }

    /// Check all structural invariants of the tree.
    ///
    /// This walks the complete tree and is meant for tests and diagnostics.
    pub fn validate(&self) -> Result<()> {
        let mut walk = ValidationWalk {
            order: self.order,
            leaf_depth: None,
            previous: None,
            nr_elements: 0,
        };
        walk.check(&self.root, true, 1)?;
        if walk.nr_elements != self.nr_elements {
            return Err(Error::InvariantViolated(format!(
                "tree contains {} entries but the index length is {}",
                walk.nr_elements, self.nr_elements
            )));
        }
        Ok(())
    }

    fn insert(&mut self, entry: KeyVal<K, V>) {
        if self.root.is_full() {
            // Create a new root node, with the full old root as only child, and split it
            let new_root = Box::new(BtreeNode::new(self.order, false));
            let old_root = std::mem::replace(&mut self.root, new_root);
            self.root.push_child(old_root);
            self.root.split_child(0);
            debug!(height = self.height(), "split full root node");
        }
        insert_nonfull(&mut self.root, entry);
    }

    #[cfg(test)]
    fn root(&self) -> &BtreeNode<K, V> {
        &self.root
    }
}

/// Insert into a node that is guaranteed not to be full.
///
/// Full children are split before descending into them, so no split ever needs to be
/// propagated back up.
fn insert_nonfull<K: Ord, V>(node: &mut BtreeNode<K, V>, entry: KeyVal<K, V>) {
    if node.is_leaf() {
        node.insert_inside(entry);
        return;
    }
    let mut i = match node.binary_search(entry.key()) {
        SearchResult::Found(i) | SearchResult::NotFound(i) => i,
    };
    if node.child(i).is_full() {
        node.split_child(i);
        // The promoted median now separates the two halves
        if let Some(median) = node.get_key_val(i) {
            if entry.key() > median.key() {
                i += 1;
            }
        }
    }
    insert_nonfull(node.child_mut(i), entry);
}

/// Remove the target entry from the subtree rooted at `node`.
///
/// Before descending into a child, the child is made leanable (at least `d` entries) by
/// borrowing from a sibling or merging with it, so the entry can always be taken out of a
/// leaf without any fix-up on the way back.
fn remove_entry<K: Ord, V>(
    node: &mut BtreeNode<K, V>,
    target: &Target<'_, K>,
) -> Result<KeyVal<K, V>> {
    match node.locate(target) {
        SearchResult::Found(i) if node.is_leaf() => Ok(node.remove_inside(i)),
        SearchResult::Found(i) => {
            if node.child(i).is_leanable() {
                let predecessor = remove_entry(node.child_mut(i), &Target::Max)?;
                Ok(node.replace_entry(i, predecessor))
            } else if node.child(i + 1).is_leanable() {
                let successor = remove_entry(node.child_mut(i + 1), &Target::Min)?;
                Ok(node.replace_entry(i, successor))
            } else {
                node.merge_children(i);
                remove_entry(node.child_mut(i), target)
            }
        }
        SearchResult::NotFound(_) if node.is_leaf() => Err(Error::KeyNotInNode),
        SearchResult::NotFound(i) => {
            let i = if node.child(i).is_leanable() {
                i
            } else {
                rebalance_child(node, i)
            };
            remove_entry(node.child_mut(i), target)
        }
    }
}

/// Give the child at `i` at least `d` entries.
///
/// Returns the index of the child that now covers the key range of the original child,
/// which differs from `i` when it was merged into its left sibling.
fn rebalance_child<K: Ord, V>(node: &mut BtreeNode<K, V>, i: usize) -> usize {
    let has_right = i < node.key_num();
    if i > 0 && node.child(i - 1).is_leanable() {
        node.borrow_from_left(i);
        i
    } else if has_right && node.child(i + 1).is_leanable() {
        node.borrow_from_right(i);
        i
    } else if has_right {
        node.merge_children(i);
        i
    } else {
        node.merge_children(i - 1);
        i - 1
    }
}

struct ValidationWalk<'a, K> {
    order: usize,
    leaf_depth: Option<usize>,
    previous: Option<&'a K>,
    nr_elements: usize,
}

impl<'a, K: Ord> ValidationWalk<'a, K> {
    fn check<V>(&mut self, node: &'a BtreeNode<K, V>, is_root: bool, depth: usize) -> Result<()> {
        let key_num = node.key_num();
        if key_num > 2 * self.order - 1 {
            return Err(Error::InvariantViolated(format!(
                "node at depth {} has {} entries, the maximum is {}",
                depth,
                key_num,
                2 * self.order - 1
            )));
        }
        if !is_root && key_num < self.order - 1 {
            return Err(Error::InvariantViolated(format!(
                "node at depth {} has {} entries, the minimum is {}",
                depth,
                key_num,
                self.order - 1
            )));
        }

        if node.is_leaf() {
            if !node.children().is_empty() {
                return Err(Error::InvariantViolated(format!(
                    "leaf at depth {} has child nodes",
                    depth
                )));
            }
            match self.leaf_depth {
                Some(expected) if expected != depth => {
                    return Err(Error::InvariantViolated(format!(
                        "leaf at depth {} but other leaves are at depth {}",
                        depth, expected
                    )));
                }
                Some(_) => {}
                None => self.leaf_depth = Some(depth),
            }
            for e in node.entries() {
                self.visit(e.key(), depth)?;
            }
        } else {
            if node.children().len() != key_num + 1 {
                return Err(Error::InvariantViolated(format!(
                    "internal node at depth {} has {} entries but {} children",
                    depth,
                    key_num,
                    node.children().len()
                )));
            }
            if is_root && key_num == 0 {
                return Err(Error::InvariantViolated(
                    "internal root node without entries".to_string(),
                ));
            }
            // In-order traversal: child, entry, child, ..., child
            for (i, e) in node.entries().iter().enumerate() {
                self.check(node.child(i), false, depth + 1)?;
                self.visit(e.key(), depth)?;
            }
            self.check(node.child(key_num), false, depth + 1)?;
        }
        Ok(())
    }

    fn visit(&mut self, key: &'a K, depth: usize) -> Result<()> {
        if let Some(previous) = self.previous {
            if previous >= key {
                return Err(Error::InvariantViolated(format!(
                    "keys are not strictly increasing in in-order traversal (node at depth {})",
                    depth
                )));
            }
        }
        self.previous = Some(key);
        self.nr_elements += 1;
        Ok(())
    }
}
