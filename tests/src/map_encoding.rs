use std::collections::HashMap;

use mapwire::Message;
use mapwire_maps::test::MapTest;
use proptest::prelude::*;

use crate::{encode_deterministic, length_delimited_fields, roundtrip};

fn properties(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|&(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[test]
fn name_and_one_property() {
    let msg = MapTest {
        name: "a".to_string(),
        properties: properties(&[("x", "1")]),
        ..Default::default()
    };
    let buf = roundtrip(&msg).unwrap();
    assert_eq!(
        buf,
        [0x0A, 0x01, 0x61, 0x12, 0x06, 0x0A, 0x01, 0x78, 0x12, 0x01, 0x31]
    );
}

#[test]
fn integer_property() {
    let mut msg = MapTest::default();
    msg.integer_properties.insert(5, 7);
    let buf = roundtrip(&msg).unwrap();
    assert_eq!(buf, [0x1A, 0x04, 0x08, 0x05, 0x10, 0x07]);
}

#[test]
fn both_maps_round_trip() {
    let mut msg = MapTest {
        name: "a".to_string(),
        properties: properties(&[("x", "1")]),
        ..Default::default()
    };
    msg.integer_properties.insert(5, 10);

    let decoded = MapTest::decode(msg.encode_to_vec().as_slice()).unwrap();
    assert_eq!(decoded.name, "a");
    assert_eq!(decoded.properties, properties(&[("x", "1")]));
    assert_eq!(decoded.integer_properties, HashMap::from([(5, 10)]));
}

#[test]
fn zero_key_and_value_are_written() {
    let mut msg = MapTest::default();
    msg.integer_properties.insert(0, 0);
    msg.properties.insert(String::new(), String::new());
    let buf = encode_deterministic(&msg).unwrap();
    assert_eq!(
        buf,
        [
            0x12, 0x04, 0x0A, 0x00, 0x12, 0x00, // properties { "": "" }
            0x1A, 0x04, 0x08, 0x00, 0x10, 0x00, // integer_properties { 0: 0 }
        ]
    );
    roundtrip(&msg).unwrap();
}

#[test]
fn empty_maps_are_omitted() {
    let msg = MapTest::default();
    assert!(roundtrip(&msg).unwrap().is_empty());

    let named = MapTest {
        name: "only".to_string(),
        ..Default::default()
    };
    let buf = roundtrip(&named).unwrap();
    assert_eq!(buf, [0x0A, 0x04, b'o', b'n', b'l', b'y']);
}

#[test]
fn one_entry_per_pair() {
    let msg = MapTest {
        properties: properties(&[("a", "1"), ("b", "2"), ("c", "3")]),
        ..Default::default()
    };
    let buf = roundtrip(&msg).unwrap();
    let fields = length_delimited_fields(&buf).unwrap();
    assert_eq!(fields.len(), 3);
    assert!(fields.iter().all(|(tag, _)| *tag == 2));

    let mut payloads: Vec<_> = fields.into_iter().map(|(_, payload)| payload).collect();
    payloads.sort();
    assert_eq!(
        payloads,
        vec![
            vec![0x0A, 0x01, b'a', 0x12, 0x01, b'1'],
            vec![0x0A, 0x01, b'b', 0x12, 0x01, b'2'],
            vec![0x0A, 0x01, b'c', 0x12, 0x01, b'3'],
        ]
    );
}

#[test]
fn duplicate_keys_last_wins() {
    let buf = [
        0x1A, 0x04, 0x08, 0x05, 0x10, 0x01, // 5 => 1
        0x1A, 0x04, 0x08, 0x06, 0x10, 0x03, // 6 => 3
        0x1A, 0x04, 0x08, 0x05, 0x10, 0x02, // 5 => 2
    ];
    let msg = MapTest::decode(&buf[..]).unwrap();
    assert_eq!(msg.integer_properties.len(), 2);
    assert_eq!(msg.integer_properties[&5], 2);
    assert_eq!(msg.integer_properties[&6], 3);
}

#[test]
fn missing_key_or_value_decodes_as_zero() {
    let buf = [
        0x12, 0x03, 0x12, 0x01, b'v', // properties entry without a key
        0x1A, 0x02, 0x08, 0x09, // integer_properties entry without a value
        0x1A, 0x00, // empty entry
    ];
    let msg = MapTest::decode(&buf[..]).unwrap();
    assert_eq!(msg.properties, properties(&[("", "v")]));
    assert_eq!(msg.integer_properties.len(), 2);
    assert_eq!(msg.integer_properties[&9], 0);
    assert_eq!(msg.integer_properties[&0], 0);
}

#[test]
fn value_before_key_and_unknown_entry_fields() {
    let buf = [
        0x12, 0x08, // properties entry
        0x12, 0x01, b'v', // value first
        0x18, 0x2A, // unknown varint field 3
        0x0A, 0x01, b'k', // key last
    ];
    let msg = MapTest::decode(&buf[..]).unwrap();
    assert_eq!(msg.properties, properties(&[("k", "v")]));
}

#[test]
fn merge_adds_to_existing_entries() {
    let mut msg = MapTest {
        properties: properties(&[("keep", "1"), ("replace", "old")]),
        ..Default::default()
    };
    let update = MapTest {
        properties: properties(&[("replace", "new"), ("add", "2")]),
        ..Default::default()
    };
    msg.merge(update.encode_to_vec().as_slice()).unwrap();
    assert_eq!(
        msg.properties,
        properties(&[("keep", "1"), ("replace", "new"), ("add", "2")])
    );
}

#[test]
fn negative_integers_round_trip() {
    let mut msg = MapTest::default();
    msg.integer_properties.insert(i32::MIN, -1);
    msg.integer_properties.insert(-1, i32::MIN);
    msg.integer_properties.insert(i32::MAX, i32::MAX);
    let buf = roundtrip(&msg).unwrap();
    // Each negative int32 takes ten bytes on the wire.
    let fields = length_delimited_fields(&buf).unwrap();
    let mut lengths: Vec<_> = fields.iter().map(|(_, payload)| payload.len()).collect();
    lengths.sort_unstable();
    assert_eq!(lengths, vec![1 + 5 + 1 + 5, 1 + 10 + 1 + 10, 1 + 10 + 1 + 10]);
}

#[test]
fn deterministic_encoding_sorts_by_key() {
    let mut msg = MapTest {
        properties: properties(&[("b", "2"), ("c", "3"), ("a", "1")]),
        ..Default::default()
    };
    msg.integer_properties.extend([(10, 0), (-3, 0), (2, 0)]);

    let buf = encode_deterministic(&msg).unwrap();
    assert_eq!(buf.len(), msg.encoded_len());
    let fields = length_delimited_fields(&buf).unwrap();
    // First byte of each key: strings carry a length prefix, varints do not.
    let keys: Vec<_> = fields
        .iter()
        .map(|(tag, payload)| match tag {
            2 => (*tag, payload[2]),
            _ => (*tag, payload[1]),
        })
        .collect();
    assert_eq!(
        keys,
        vec![
            (2, b'a'),
            (2, b'b'),
            (2, b'c'),
            (3, 0xFD), // -3 is a ten byte varint
            (3, 2),
            (3, 10),
        ]
    );
    assert_eq!(MapTest::decode(buf.as_slice()).unwrap(), msg);
}

proptest! {
    #[test]
    fn equal_maps_encode_identically_when_deterministic(
        entries in prop::collection::vec((any::<i32>(), any::<i32>()), 0..32),
    ) {
        let forward = MapTest {
            integer_properties: entries.iter().cloned().collect(),
            ..Default::default()
        };
        let reverse = MapTest {
            integer_properties: entries.iter().rev().cloned().collect(),
            ..Default::default()
        };
        // Collecting in reverse keeps the first occurrence of a repeated key.
        prop_assume!(forward == reverse);
        prop_assert_eq!(
            encode_deterministic(&forward).unwrap(),
            encode_deterministic(&reverse).unwrap()
        );
    }

    #[test]
    fn arbitrary_messages_round_trip(
        name in "\\PC*",
        properties in prop::collection::hash_map("\\PC*", "\\PC*", 0..16),
        integer_properties in prop::collection::hash_map(any::<i32>(), any::<i32>(), 0..16),
    ) {
        let msg = MapTest { name, properties, integer_properties };
        prop_assert!(roundtrip(&msg).is_ok());
    }
}
