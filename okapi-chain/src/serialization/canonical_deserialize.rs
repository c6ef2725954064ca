use std::{
    collections::{BTreeMap, BTreeSet},
    io,
};

use byteorder::ReadBytesExt;

use super::{ReadLedgerExt, SerializationError};

/// Consensus-critical deserialization for Okapi.
///
/// This is the inverse of [`CanonicalSerialize`](super::CanonicalSerialize).
/// Implementations reject every non-canonical spelling of a value, so a
/// successful parse followed by a re-serialization reproduces the input
/// bytes exactly.
pub trait CanonicalDeserialize: Sized {
    /// Try to read `self` from the given `reader`.
    fn canonical_deserialize<R: io::Read>(reader: R) -> Result<Self, SerializationError>;
}

impl CanonicalDeserialize for u8 {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(reader.read_u8()?)
    }
}

impl CanonicalDeserialize for u64 {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        reader.read_compact_u64()
    }
}

impl CanonicalDeserialize for i64 {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        reader.read_compact_i64()
    }
}

impl<T: CanonicalDeserialize> CanonicalDeserialize for Vec<T> {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let len = reader.read_compact_u64()?;
        let mut vec = Vec::new();
        for _ in 0..len {
            vec.push(T::canonical_deserialize(&mut reader)?);
        }
        Ok(vec)
    }
}

impl<T: CanonicalDeserialize> CanonicalDeserialize for Option<T> {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        match reader.read_u8()? {
            0x00 => Ok(None),
            0x01 => Ok(Some(T::canonical_deserialize(&mut reader)?)),
            _ => Err(SerializationError::Parse("invalid option presence byte")),
        }
    }
}

impl<T: CanonicalDeserialize + Ord> CanonicalDeserialize for BTreeSet<T> {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let len = reader.read_compact_u64()?;
        let mut set = BTreeSet::new();
        let mut last: Option<T> = None;
        for _ in 0..len {
            let x = T::canonical_deserialize(&mut reader)?;
            if let Some(prev) = last.take() {
                if prev >= x {
                    return Err(SerializationError::Parse(
                        "set elements not in strictly ascending order",
                    ));
                }
                set.insert(prev);
            }
            last = Some(x);
        }
        if let Some(prev) = last {
            set.insert(prev);
        }
        Ok(set)
    }
}

impl<K, V> CanonicalDeserialize for BTreeMap<K, V>
where
    K: CanonicalDeserialize + Ord,
    V: CanonicalDeserialize,
{
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let len = reader.read_compact_u64()?;
        let mut map = BTreeMap::new();
        let mut last: Option<(K, V)> = None;
        for _ in 0..len {
            let k = K::canonical_deserialize(&mut reader)?;
            let v = V::canonical_deserialize(&mut reader)?;
            if let Some((prev_k, prev_v)) = last.take() {
                if prev_k >= k {
                    return Err(SerializationError::Parse(
                        "map keys not in strictly ascending order",
                    ));
                }
                map.insert(prev_k, prev_v);
            }
            last = Some((k, v));
        }
        if let Some((prev_k, prev_v)) = last {
            map.insert(prev_k, prev_v);
        }
        Ok(map)
    }
}

/// Helper for deserializing more succinctly via type inference
pub trait CanonicalDeserializeInto {
    /// Deserialize based on type inference
    fn canonical_deserialize_into<T>(self) -> Result<T, SerializationError>
    where
        T: CanonicalDeserialize;
}

impl<R: io::Read> CanonicalDeserializeInto for R {
    fn canonical_deserialize_into<T>(self) -> Result<T, SerializationError>
    where
        T: CanonicalDeserialize,
    {
        T::canonical_deserialize(self)
    }
}
