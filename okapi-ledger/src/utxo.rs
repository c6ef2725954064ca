//! The UTxO: the map of unspent transaction outputs.
//!
//! The map is persistent: every operation returns a new logical value that
//! shares structure with the old one, so keeping the pre-state alongside
//! the post-state costs logarithmic, not linear, space. No ledger rule
//! ever mutates a shared map.

use std::{collections::BTreeSet, io};

use okapi_chain::{
    address::Address,
    serialization::{
        CanonicalDeserialize, CanonicalSerialize, ReadLedgerExt, SerializationError,
        WriteLedgerExt,
    },
    transaction::{Body, TxIn},
    value::{self, CompactValue, Value},
};

/// An unspent output, in stored form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UtxoOut {
    /// The address the output pays to.
    pub address: Address,
    /// The value held, in the compact stored form.
    pub value: CompactValue,
}

impl CanonicalSerialize for UtxoOut {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.address.canonical_serialize(&mut writer)?;
        self.value.canonical_serialize(&mut writer)
    }
}

impl CanonicalDeserialize for UtxoOut {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(UtxoOut {
            address: Address::canonical_deserialize(&mut reader)?,
            value: CompactValue::canonical_deserialize(&mut reader)?,
        })
    }
}

/// The map of unspent transaction outputs.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Utxo(im::OrdMap<TxIn, UtxoOut>);

impl Utxo {
    /// The empty UTxO.
    pub fn new() -> Utxo {
        Utxo::default()
    }

    /// A UTxO holding a single entry.
    pub fn singleton(input: TxIn, output: UtxoOut) -> Utxo {
        Utxo(im::OrdMap::unit(input, output))
    }

    /// The outputs a transaction body produces, keyed by the body's id and
    /// the output index.
    ///
    /// Fails when an output's value is not strictly positive; such bodies
    /// never make it past validation.
    pub fn outputs_of(body: &Body) -> Result<Utxo, value::Error> {
        let id = body.id();
        let mut map = im::OrdMap::new();
        for (index, output) in body.outputs().iter().enumerate() {
            map.insert(
                TxIn {
                    id,
                    index: index as u32,
                },
                UtxoOut {
                    address: output.address.clone(),
                    value: output.value.to_compact()?,
                },
            );
        }
        Ok(Utxo(map))
    }

    /// The number of unspent outputs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the UTxO is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up an unspent output.
    pub fn get(&self, input: &TxIn) -> Option<&UtxoOut> {
        self.0.get(input)
    }

    /// Whether an output is unspent.
    pub fn contains_key(&self, input: &TxIn) -> bool {
        self.0.contains_key(input)
    }

    /// The set of spendable inputs.
    pub fn domain(&self) -> BTreeSet<TxIn> {
        self.0.keys().copied().collect()
    }

    /// Iterate over the unspent outputs.
    pub fn range(&self) -> impl Iterator<Item = &UtxoOut> {
        self.0.values()
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> impl Iterator<Item = (&TxIn, &UtxoOut)> {
        self.0.iter()
    }

    /// The entries whose keys are in `keys`.
    pub fn restrict_by_keys(&self, keys: &BTreeSet<TxIn>) -> Utxo {
        keys.iter()
            .filter_map(|input| self.0.get(input).map(|output| (*input, output.clone())))
            .collect()
    }

    /// The entries whose keys are not in `keys`.
    pub fn exclude_by_keys(&self, keys: &BTreeSet<TxIn>) -> Utxo {
        let mut map = self.0.clone();
        for input in keys {
            map.remove(input);
        }
        Utxo(map)
    }

    /// The entries whose outputs appear in `outputs`.
    pub fn restrict_by_range(&self, outputs: &[UtxoOut]) -> Utxo {
        self.0
            .iter()
            .filter(|(_, output)| outputs.contains(output))
            .map(|(input, output)| (*input, output.clone()))
            .collect()
    }

    /// Add an entry unless the key is already present.
    pub fn insert_if_absent(&self, input: TxIn, output: UtxoOut) -> Utxo {
        if self.0.contains_key(&input) {
            self.clone()
        } else {
            Utxo(self.0.update(input, output))
        }
    }

    /// Remove an entry.
    pub fn remove(&self, input: &TxIn) -> Utxo {
        Utxo(self.0.without(input))
    }

    /// The union of two UTxOs; on a key collision the entry from `self`
    /// wins.
    pub fn union(&self, other: &Utxo) -> Utxo {
        Utxo(self.0.clone().union(other.0.clone()))
    }

    /// The union of two UTxOs; on a key collision the entry from `other`
    /// wins.
    pub fn override_with(&self, other: &Utxo) -> Utxo {
        Utxo(other.0.clone().union(self.0.clone()))
    }

    /// The union of two UTxOs whose key sets must be disjoint.
    ///
    /// # Panics
    ///
    /// Panics on a key collision. Transaction ids are outputs of a
    /// collision-resistant hash, so a collision here means an invariant was
    /// broken upstream; preferring either side would silently corrupt the
    /// ledger.
    pub fn union_disjoint(&self, other: &Utxo) -> Utxo {
        for input in other.0.keys() {
            assert!(
                !self.0.contains_key(input),
                "colliding transaction id in UTxO union: {input:?}",
            );
        }
        self.union(other)
    }

    /// The total value held by the UTxO.
    pub fn balance(&self) -> Result<Value, value::Error> {
        let mut total = Value::zero();
        for output in self.0.values() {
            total = (total + output.value.value())?;
        }
        Ok(total)
    }
}

impl FromIterator<(TxIn, UtxoOut)> for Utxo {
    fn from_iter<I: IntoIterator<Item = (TxIn, UtxoOut)>>(iter: I) -> Utxo {
        Utxo(iter.into_iter().collect())
    }
}

impl CanonicalSerialize for Utxo {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_compact_u64(self.0.len() as u64)?;
        for (input, output) in &self.0 {
            input.canonical_serialize(&mut writer)?;
            output.canonical_serialize(&mut writer)?;
        }
        Ok(())
    }
}

impl CanonicalDeserialize for Utxo {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let len = reader.read_compact_u64()?;
        let mut map = im::OrdMap::new();
        let mut last: Option<TxIn> = None;
        for _ in 0..len {
            let input = TxIn::canonical_deserialize(&mut reader)?;
            if last.map_or(false, |prev| prev >= input) {
                return Err(SerializationError::Parse(
                    "map keys not in strictly ascending order",
                ));
            }
            last = Some(input);
            let output = UtxoOut::canonical_deserialize(&mut reader)?;
            map.insert(input, output);
        }
        Ok(Utxo(map))
    }
}

#[cfg(test)]
mod tests;
