use memory_btree_index::{BtreeConfig, BtreeIndex, Error, KeyVal, MAX_ORDER};

#[test]
fn construct_rejects_small_order() {
    assert!(matches!(
        BtreeIndex::<u32, u32>::new(1),
        Err(Error::OrderTooSmall(1))
    ));
    assert!(BtreeIndex::<u32, u32>::new(2).is_ok());
}

#[test]
fn construct_rejects_huge_order() {
    assert!(matches!(
        BtreeIndex::<u32, u32>::new(usize::MAX / 2 + 1),
        Err(Error::OrderTooLarge(_))
    ));
    assert!(matches!(
        BtreeIndex::<u32, u32>::with_config(BtreeConfig::default().order(MAX_ORDER + 1)),
        Err(Error::OrderTooLarge(_))
    ));
}

#[test]
fn config_from_json() {
    let config: BtreeConfig = serde_json::from_str(r#"{"order": 3}"#).unwrap();
    assert_eq!(BtreeConfig::default().order(3), config);

    // Missing fields fall back to the defaults
    let config: BtreeConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(BtreeConfig::default(), config);

    let t: BtreeIndex<u32, u32> = BtreeIndex::with_config(config).unwrap();
    assert_eq!(32, t.order());
}

#[test]
fn search_returns_key_val() {
    let mut t = BtreeIndex::new(2).unwrap();
    t.put("b", 2).unwrap();
    t.put("a", 1).unwrap();

    let found: &KeyVal<&str, i32> = t.search(&"a").unwrap();
    assert_eq!(&"a", found.key());
    assert_eq!(&1, found.val());
    assert!(t.search(&"c").is_none());
}

#[test]
fn put_overwrites_last_value() {
    let mut t = BtreeIndex::new(3).unwrap();
    for round in 0..3 {
        for k in 0..200u32 {
            t.put(k, k + round).unwrap();
        }
    }
    assert_eq!(200, t.len());
    for k in 0..200u32 {
        assert_eq!(Some(&(k + 2)), t.get(&k));
    }
    t.validate().unwrap();
}

#[test]
fn delete_keeps_other_entries() {
    let mut t = BtreeIndex::new(2).unwrap();
    for k in 0..300u32 {
        t.put(k, k.to_string()).unwrap();
    }
    for k in (0..300u32).filter(|k| k % 3 == 0) {
        assert_eq!(Some(k.to_string()), t.delete(&k).unwrap());
    }
    t.validate().unwrap();
    for k in 0..300u32 {
        if k % 3 == 0 {
            assert_eq!(None, t.get(&k));
        } else {
            assert_eq!(Some(&k.to_string()), t.get(&k));
        }
    }
    assert_eq!(200, t.len());
}

#[test]
fn empty_after_deleting_everything() {
    let mut t = BtreeIndex::new(2).unwrap();
    for k in 1..=20u32 {
        t.put(k, ()).unwrap();
    }
    assert!(t.height() > 1);
    for k in 1..=20u32 {
        t.delete(&k).unwrap();
        assert!(!t.contains_key(&k));
    }
    assert!(t.is_empty());
    assert_eq!(1, t.height());
    t.validate().unwrap();

    // The tree is usable again
    t.put(5, ()).unwrap();
    assert!(t.contains_key(&5));
}
