#![no_main]
use libfuzzer_sys::fuzz_target;

use std::collections::BTreeMap;
use memory_btree_index::BtreeIndex;

fuzz_target!(|data: (Vec<(u32, u32)>, Vec<u32>, u8)| {
    let order = (data.2 as usize).max(2);
    let mut m = BTreeMap::default();
    let mut fixture = BtreeIndex::new(order).unwrap();

    for (key, value) in data.0 {
        m.insert(key, value);
        fixture.put(key, value).unwrap();
    }
    for key in data.1 {
        assert_eq!(m.remove(&key), fixture.delete(&key).unwrap());
    }

    // Check len() function
    assert_eq!(m.len(), fixture.len());

    // get query for each entry
    for (k, v1) in m.iter() {
        assert!(fixture.contains_key(k));
        assert_eq!(Some(v1), fixture.get(k));
    }

    fixture.validate().unwrap();
});
