//! Fixed test vectors for the canonical primitives.

use std::collections::{BTreeMap, BTreeSet};

use color_eyre::eyre::Result;

use super::super::*;

#[test]
fn compact_integer_layouts() -> Result<()> {
    let mut buf = Vec::new();
    buf.write_compact_u64(0)?;
    buf.write_compact_u64(0xfc)?;
    buf.write_compact_u64(0xfd)?;
    buf.write_compact_u64(0x1_0000)?;
    buf.write_compact_u64(0x1_0000_0000)?;

    assert_eq!(
        buf,
        vec![
            0x00,
            0xfc,
            0xfd, 0xfd, 0x00,
            0xfe, 0x00, 0x00, 0x01, 0x00,
            0xff, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
        ],
    );

    Ok(())
}

#[test]
fn non_shortest_compact_integers_are_rejected() {
    // 0x42 spelled with the two-byte layout
    let bytes = [0xfdu8, 0x42, 0x00];
    assert!(bytes.as_slice().read_compact_u64().is_err());

    // 0xffff spelled with the four-byte layout
    let bytes = [0xfeu8, 0xff, 0xff, 0x00, 0x00];
    assert!(bytes.as_slice().read_compact_u64().is_err());

    // 0xffff_ffff spelled with the eight-byte layout
    let bytes = [0xffu8, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00];
    assert!(bytes.as_slice().read_compact_u64().is_err());
}

#[test]
fn zigzag_pairs_signs() -> Result<()> {
    for (value, expected) in [(0i64, 0u64), (-1, 1), (1, 2), (-2, 3), (2, 4)] {
        let mut buf = Vec::new();
        buf.write_compact_i64(value)?;
        let mut expected_buf = Vec::new();
        expected_buf.write_compact_u64(expected)?;
        assert_eq!(buf, expected_buf, "zigzag of {value}");

        let decoded = buf.as_slice().read_compact_i64()?;
        assert_eq!(decoded, value);
    }

    Ok(())
}

#[test]
fn option_presence_byte_is_strict() -> Result<()> {
    let none: Option<u64> = None;
    assert_eq!(none.canonical_serialize_to_vec()?, vec![0x00]);

    let some: Option<u64> = Some(7);
    assert_eq!(some.canonical_serialize_to_vec()?, vec![0x01, 0x07]);

    // any other presence byte is malformed
    let result: Result<Option<u64>, _> = [0x02u8, 0x07].as_slice().canonical_deserialize_into();
    assert!(result.is_err());

    Ok(())
}

#[test]
fn sets_must_be_strictly_ascending() -> Result<()> {
    let set: BTreeSet<u8> = [1, 2, 3].into_iter().collect();
    let bytes = set.canonical_serialize_to_vec()?;
    assert_eq!(bytes, vec![3, 1, 2, 3]);

    // descending order is rejected
    let result: Result<BTreeSet<u8>, _> = [3u8, 3, 2, 1].as_slice().canonical_deserialize_into();
    assert!(result.is_err());

    // duplicates are rejected
    let result: Result<BTreeSet<u8>, _> = [2u8, 1, 1].as_slice().canonical_deserialize_into();
    assert!(result.is_err());

    Ok(())
}

#[test]
fn map_keys_must_be_strictly_ascending() -> Result<()> {
    let map: BTreeMap<u8, u8> = [(1, 10), (2, 20)].into_iter().collect();
    let bytes = map.canonical_serialize_to_vec()?;
    assert_eq!(bytes, vec![2, 1, 10, 2, 20]);

    let result: Result<BTreeMap<u8, u8>, _> =
        [2u8, 2, 20, 1, 10].as_slice().canonical_deserialize_into();
    assert!(result.is_err());

    Ok(())
}
