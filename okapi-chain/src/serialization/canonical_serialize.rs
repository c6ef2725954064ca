use std::{
    collections::{BTreeMap, BTreeSet},
    io,
};

use byteorder::WriteBytesExt;

use super::WriteLedgerExt;

/// Consensus-critical serialization for Okapi.
///
/// This trait provides a generic serialization for consensus-critical
/// formats, such as transaction bodies and the persisted ledger state. It is
/// intended for use only in consensus-critical contexts; in other contexts,
/// such as diagnostics, it would be preferable to use Serde.
pub trait CanonicalSerialize: Sized {
    /// Write `self` to the given `writer` using the canonical format.
    ///
    /// Notice that the error type is [`std::io::Error`]; this indicates that
    /// serialization MUST be infallible up to errors in the underlying
    /// writer. In other words, any type implementing `CanonicalSerialize`
    /// must make illegal states unrepresentable.
    fn canonical_serialize<W: io::Write>(&self, writer: W) -> Result<(), io::Error>;

    /// Helper function to construct a vec to serialize the current struct into
    fn canonical_serialize_to_vec(&self) -> Result<Vec<u8>, io::Error> {
        let mut data = Vec::new();
        self.canonical_serialize(&mut data)?;
        Ok(data)
    }
}

impl CanonicalSerialize for u8 {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_u8(*self)
    }
}

impl CanonicalSerialize for u64 {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_compact_u64(*self)
    }
}

impl CanonicalSerialize for i64 {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_compact_i64(*self)
    }
}

impl<T: CanonicalSerialize> CanonicalSerialize for Vec<T> {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_compact_u64(self.len() as u64)?;
        for x in self {
            x.canonical_serialize(&mut writer)?;
        }
        Ok(())
    }
}

/// An optional value is a presence byte followed by the value.
///
/// Only `0x00` (absent) and `0x01` (present) are legal presence bytes, so
/// presence is never ambiguous.
impl<T: CanonicalSerialize> CanonicalSerialize for Option<T> {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        match self {
            None => writer.write_u8(0x00),
            Some(x) => {
                writer.write_u8(0x01)?;
                x.canonical_serialize(&mut writer)
            }
        }
    }
}

/// A set is a length followed by its elements in strictly ascending order.
impl<T: CanonicalSerialize + Ord> CanonicalSerialize for BTreeSet<T> {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_compact_u64(self.len() as u64)?;
        for x in self {
            x.canonical_serialize(&mut writer)?;
        }
        Ok(())
    }
}

/// A map is a length followed by its entries with strictly ascending keys.
impl<K, V> CanonicalSerialize for BTreeMap<K, V>
where
    K: CanonicalSerialize + Ord,
    V: CanonicalSerialize,
{
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_compact_u64(self.len() as u64)?;
        for (k, v) in self {
            k.canonical_serialize(&mut writer)?;
            v.canonical_serialize(&mut writer)?;
        }
        Ok(())
    }
}
