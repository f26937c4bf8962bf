// File: ./src/catalog_index.rs
// Ordered, key-indexed view over a product catalog snapshot.
//
// The index is a plain binary search tree keyed by the normalized product name.
// It is rebuilt once per session from a bulk fetch, supports insertion and
// exact-key search, and never deletes or rebalances. Sorted input degrades it to
// a list (O(n) lookups); that is accepted for the bounded catalogs it holds.
//
// Insert, search, depth, traversal, drop and `Debug` never recurse per node, so
// a degenerate tree cannot exhaust the stack. Test helpers may.
use crate::model::{CatalogRecord, Payload};
use std::cmp::Ordering;
use std::fmt;

/// Child slot of a node (or the root slot of the index).
pub type Link = Option<Box<IndexNode>>;

/// One node of the tree. Each node is owned by its parent, the root by the index.
pub struct IndexNode {
    pub key: String,
    pub payload: Payload,
    left: Link,
    right: Link,
}

impl IndexNode {
    fn leaf(key: String, payload: Payload) -> Self {
        Self {
            key,
            payload,
            left: None,
            right: None,
        }
    }

    pub fn left(&self) -> Option<&IndexNode> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&IndexNode> {
        self.right.as_deref()
    }
}

// Shallow: children are shown by key only.
impl fmt::Debug for IndexNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexNode")
            .field("key", &self.key)
            .field("left", &self.left().map(|n| n.key.as_str()))
            .field("right", &self.right().map(|n| n.key.as_str()))
            .finish_non_exhaustive()
    }
}

// Covers bare `Link`s from the free `insert` as well as `CatalogIndex`.
impl Drop for IndexNode {
    fn drop(&mut self) {
        let mut pending: Vec<Box<IndexNode>> = Vec::new();
        pending.extend(self.left.take());
        pending.extend(self.right.take());
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
    }
}

/// Inserts `key` below `slot`. Returns false when the key is already present,
/// in which case the existing payload is left untouched (first write wins).
fn insert_into(slot: &mut Link, key: String, payload: Payload) -> bool {
    let mut cur = slot;
    while let Some(node) = cur {
        cur = match key.as_str().cmp(node.key.as_str()) {
            Ordering::Less => &mut node.left,
            Ordering::Greater => &mut node.right,
            Ordering::Equal => return false,
        };
    }
    *cur = Some(Box::new(IndexNode::leaf(key, payload)));
    true
}

/// Inserts `key` into the tree rooted at `root` and returns the (possibly new) root.
/// Only the path from the root to the new leaf is touched.
pub fn insert(mut root: Link, key: String, payload: Payload) -> Link {
    insert_into(&mut root, key, payload);
    root
}

/// Exact-match search. `key` must already be normalized; no folding happens here.
pub fn search<'a>(root: Option<&'a IndexNode>, key: &str) -> Option<&'a IndexNode> {
    let mut cur = root;
    while let Some(node) = cur {
        cur = match key.cmp(node.key.as_str()) {
            Ordering::Less => node.left(),
            Ordering::Greater => node.right(),
            Ordering::Equal => return Some(node),
        };
    }
    None
}

/// Outcome of building an index from a batch of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub inserted: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

#[derive(Debug, Default)]
pub struct CatalogIndex {
    root: Link,
    len: usize,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from records in the order given.
    /// Later records whose key is already present are discarded.
    pub fn from_records<I>(records: I) -> (Self, BuildReport)
    where
        I: IntoIterator<Item = CatalogRecord>,
    {
        let mut index = Self::new();
        let mut report = BuildReport::default();
        for record in records {
            if index.insert(record) {
                report.inserted += 1;
            } else {
                report.duplicates += 1;
            }
        }
        (index, report)
    }

    /// Returns true if the record was added, false if its key was already indexed.
    pub fn insert(&mut self, record: CatalogRecord) -> bool {
        let CatalogRecord { key, payload } = record;
        let added = insert_into(&mut self.root, key, payload);
        if added {
            self.len += 1;
        } else {
            log::debug!("catalog index: duplicate key ignored");
        }
        added
    }

    pub fn search(&self, key: &str) -> Option<&Payload> {
        search(self.root(), key).map(|node| &node.payload)
    }

    pub fn contains(&self, key: &str) -> bool {
        search(self.root(), key).is_some()
    }

    pub fn root(&self) -> Option<&IndexNode> {
        self.root.as_deref()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes on the longest root-to-leaf path (0 for an empty index).
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack: Vec<(&IndexNode, usize)> = self.root().map(|n| (n, 1)).into_iter().collect();
        while let Some((node, d)) = stack.pop() {
            max = max.max(d);
            stack.extend(node.left().map(|n| (n, d + 1)));
            stack.extend(node.right().map(|n| (n, d + 1)));
        }
        max
    }

    /// In-order traversal, ascending by key.
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left_spine(self.root());
        iter
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

pub struct Iter<'a> {
    stack: Vec<&'a IndexNode>,
}

impl<'a> Iter<'a> {
    fn push_left_spine(&mut self, mut node: Option<&'a IndexNode>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Payload);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right());
        Some((node.key.as_str(), &node.payload))
    }
}

impl<'a> IntoIterator for &'a CatalogIndex {
    type Item = (&'a str, &'a Payload);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(price: f64) -> Payload {
        let mut map = Payload::new();
        map.insert("Unit_Price".to_string(), json!(price));
        map
    }

    /// Checks the BST invariant directly on the node structure.
    fn assert_ordered(node: Option<&IndexNode>, low: Option<&str>, high: Option<&str>) {
        let Some(n) = node else { return };
        if let Some(low) = low {
            assert!(n.key.as_str() > low, "{} should be > {}", n.key, low);
        }
        if let Some(high) = high {
            assert!(n.key.as_str() < high, "{} should be < {}", n.key, high);
        }
        assert_ordered(n.left(), low, Some(n.key.as_str()));
        assert_ordered(n.right(), Some(n.key.as_str()), high);
    }

    #[test]
    fn test_free_functions_build_and_search() {
        let mut root = None;
        for (k, p) in [("milk", 1.0), ("bread", 2.0), ("eggs", 3.0), ("tea", 4.0)] {
            root = insert(root, k.to_string(), payload(p));
        }
        assert_eq!(root.as_ref().unwrap().key, "milk");
        let hit = search(root.as_deref(), "eggs").unwrap();
        assert_eq!(hit.payload["Unit_Price"], json!(3.0));
        assert!(search(root.as_deref(), "coffee").is_none());
        assert_ordered(root.as_deref(), None, None);
    }

    #[test]
    fn test_search_empty_root() {
        assert!(search(None, "milk").is_none());
        let index = CatalogIndex::new();
        assert!(index.search("milk").is_none());
        assert!(index.is_empty());
        assert_eq!(index.depth(), 0);
        assert_eq!(index.iter().count(), 0);
    }

    #[test]
    fn test_first_write_wins() {
        let mut index = CatalogIndex::new();
        assert!(index.insert(CatalogRecord::new("Milk", payload(1.0))));
        assert!(!index.insert(CatalogRecord::new("MILK", payload(9.0))));
        assert_eq!(index.len(), 1);
        assert_eq!(index.search("milk").unwrap()["Unit_Price"], json!(1.0));
    }

    #[test]
    fn test_search_does_not_normalize() {
        let (index, _) = CatalogIndex::from_records([CatalogRecord::new("Milk", payload(1.0))]);
        assert!(index.search("milk").is_some());
        assert!(index.search("Milk").is_none());
        assert!(index.search(" milk").is_none());
    }

    #[test]
    fn test_sorted_input_degenerates_without_overflow() {
        let n = 10_000;
        let records = (0..n).map(|i| CatalogRecord::new(&format!("item{:06}", i), payload(i as f64)));
        let (index, report) = CatalogIndex::from_records(records);
        assert_eq!(report.inserted, n);
        assert_eq!(index.depth(), n);
        assert!(index.contains("item009999"));
        assert_eq!(index.iter().count(), n);
        drop(index);
    }

    #[test]
    fn test_deep_bare_link_drops_and_formats() {
        let n = 10_000;
        let mut root: Link = None;
        for i in 0..n {
            root = insert(root, format!("item{:06}", i), Payload::new());
        }
        let shown = format!("{:?}", root);
        assert!(shown.contains("item000000"));
        assert!(shown.contains("item000001"));
        assert!(!shown.contains("item000002"));

        let (index, _) = CatalogIndex::from_records(
            (0..n).map(|i| CatalogRecord::new(&format!("item{:06}", i), Payload::new())),
        );
        assert!(format!("{:?}", index).len() < 200);
        drop(index);
        drop(root);
    }

    #[test]
    fn test_ordering_invariant_under_mixed_inserts() {
        let mut index = CatalogIndex::new();
        let mut state: u64 = 0x2545_F491_4F6C_DD1D;
        for _ in 0..500 {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let key = format!("k{}", (state >> 33) % 300);
            index.insert(CatalogRecord::new(&key, Payload::new()));
        }
        assert_ordered(index.root(), None, None);
        let keys: Vec<&str> = index.iter().map(|(k, _)| k).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(keys.len(), index.len());
    }

    #[test]
    fn test_clear_resets() {
        let (mut index, _) = CatalogIndex::from_records([
            CatalogRecord::new("a", Payload::new()),
            CatalogRecord::new("b", Payload::new()),
        ]);
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert!(index.search("a").is_none());
    }
}
