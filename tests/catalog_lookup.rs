// Tests for building the catalog index and looking products up.
use pantry::CatalogIndex;
use pantry::catalog_index::{IndexNode, insert, search};
use pantry::model::{CatalogRecord, Payload, normalize_key};
use serde_json::json;
use std::collections::HashSet;

fn payload(id: usize) -> Payload {
    let mut map = Payload::new();
    map.insert("id".to_string(), json!(id));
    map
}

fn check_subtree(node: Option<&IndexNode>, keys: &mut Vec<String>) {
    let Some(n) = node else { return };
    check_subtree(n.left(), keys);
    keys.push(n.key.clone());
    check_subtree(n.right(), keys);

    if let Some(l) = n.left() {
        assert!(l.key < n.key);
    }
    if let Some(r) = n.right() {
        assert!(r.key > n.key);
    }
}

#[test]
fn test_every_inserted_key_is_found() {
    let names = [
        "Basmati Rice",
        "Whole Milk",
        "Eggs",
        "Green Tea",
        "Apples",
        "Yogurt",
        "Bread",
        "Coffee",
        "Honey",
        "Lentils",
    ];
    let (index, report) = CatalogIndex::from_records(
        names
            .iter()
            .enumerate()
            .map(|(i, n)| CatalogRecord::new(n, payload(i))),
    );
    assert_eq!(report.inserted, names.len());

    for (i, name) in names.iter().enumerate() {
        let hit = index.search(&normalize_key(name)).unwrap();
        assert_eq!(hit["id"], json!(i), "lookup of {name}");
    }
    assert!(index.search("butter").is_none());
    assert!(index.search("").is_none());
}

#[test]
fn test_in_order_walk_matches_sorted_distinct_keys() {
    let raw = ["m", "c", "x", "a", "e", "c", "z", "b", "m", "y", "d"];
    let mut index = CatalogIndex::new();
    for (i, k) in raw.iter().enumerate() {
        index.insert(CatalogRecord::new(k, payload(i)));
    }

    let mut expected: Vec<String> = raw
        .iter()
        .map(|k| k.to_string())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    expected.sort();

    let mut walked = Vec::new();
    check_subtree(index.root(), &mut walked);
    assert_eq!(walked, expected);

    let iterated: Vec<&str> = index.iter().map(|(k, _)| k).collect();
    assert_eq!(iterated, expected);
    assert_eq!(index.len(), expected.len());
}

#[test]
fn test_duplicate_keeps_first_payload_regardless_of_stream_order() {
    let records = vec![
        CatalogRecord::new("Sugar", payload(1)),
        CatalogRecord::new("Salt", payload(2)),
        CatalogRecord::new("sugar", payload(3)),
    ];
    let (index, report) = CatalogIndex::from_records(records);
    assert_eq!(report.duplicates, 1);
    assert_eq!(index.search("sugar").unwrap()["id"], json!(1));
}

#[test]
fn test_root_returning_insert() {
    let mut root = None;
    root = insert(root, "b".to_string(), payload(1));
    root = insert(root, "a".to_string(), payload(2));
    root = insert(root, "b".to_string(), payload(3));

    let top = root.as_deref().unwrap();
    assert_eq!(top.key, "b");
    assert_eq!(top.left().unwrap().key, "a");
    assert!(top.right().is_none());
    assert_eq!(search(root.as_deref(), "b").unwrap().payload["id"], json!(1));
}

#[test]
fn test_empty_build() {
    let (index, report) = CatalogIndex::from_records(Vec::new());
    assert_eq!(report.inserted, 0);
    assert!(index.is_empty());
    assert!(index.search("anything").is_none());
}
