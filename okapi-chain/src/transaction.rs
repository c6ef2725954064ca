//! Transactions and transaction bodies.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

mod hash;
mod serialize;
mod witness;

#[cfg(any(test, feature = "proptest-impl"))]
pub mod arbitrary;

#[cfg(test)]
mod tests;

pub use hash::Hash;
pub use witness::{BootstrapWitness, VKeyWitness, WitnessSet};

use crate::{
    address::{Address, RewardAccount},
    amount::Coin,
    certificate::Certificate,
    parameters::{Slot, Update},
    primitives::digest,
    serialization::CanonicalSerialize,
    value::Value,
};

/// A reference to the output of a previous transaction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct TxIn {
    /// The transaction that produced the output being spent.
    pub id: hash::Hash,
    /// The index of the output within that transaction; the first output
    /// is 0.
    pub index: u32,
}

/// A transaction output: an address and the value it holds.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct TxOut {
    /// The address the value is locked by.
    pub address: Address,
    /// The value held.
    pub value: Value,
}

/// Auxiliary transaction metadata: an opaque blob committed to by the body.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Metadata(pub Vec<u8>);

impl Metadata {
    /// The hash the body must declare for this metadata.
    pub fn hash(&self) -> MetadataHash {
        MetadataHash(digest::blake2b_256(&self.0))
    }
}

/// The hash of a transaction's metadata.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct MetadataHash(pub [u8; 32]);

impl std::fmt::Debug for MetadataHash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_tuple("MetadataHash")
            .field(&hex::encode(self.0))
            .finish()
    }
}

/// A transaction body.
///
/// The fields are private: a body is assembled once, by [`Body::new`], and
/// never mutated afterwards, so its identifier is fixed at construction.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Body {
    inputs: BTreeSet<TxIn>,
    outputs: Vec<TxOut>,
    certificates: Vec<Certificate>,
    forge: Value,
    withdrawals: BTreeMap<RewardAccount, Coin>,
    fee: Coin,
    ttl: Slot,
    update: Option<Update>,
    metadata_hash: Option<MetadataHash>,
}

impl Body {
    /// Assemble a transaction body.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        inputs: BTreeSet<TxIn>,
        outputs: Vec<TxOut>,
        certificates: Vec<Certificate>,
        forge: Value,
        withdrawals: BTreeMap<RewardAccount, Coin>,
        fee: Coin,
        ttl: Slot,
        update: Option<Update>,
        metadata_hash: Option<MetadataHash>,
    ) -> Body {
        Body {
            inputs,
            outputs,
            certificates,
            forge,
            withdrawals,
            fee,
            ttl,
            update,
            metadata_hash,
        }
    }

    /// The outputs this body consumes.
    pub fn inputs(&self) -> &BTreeSet<TxIn> {
        &self.inputs
    }

    /// The outputs this body produces, in order.
    pub fn outputs(&self) -> &[TxOut] {
        &self.outputs
    }

    /// The certificates this body carries, in order.
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    /// The non-base assets created (positive) or burned (negative).
    pub fn forge(&self) -> &Value {
        &self.forge
    }

    /// The reward-account withdrawals.
    pub fn withdrawals(&self) -> &BTreeMap<RewardAccount, Coin> {
        &self.withdrawals
    }

    /// The declared fee.
    pub fn fee(&self) -> Coin {
        self.fee
    }

    /// The last slot this body may be applied in.
    pub fn ttl(&self) -> Slot {
        self.ttl
    }

    /// The protocol-parameter update, if any.
    pub fn update(&self) -> Option<&Update> {
        self.update.as_ref()
    }

    /// The declared metadata hash, if any.
    pub fn metadata_hash(&self) -> Option<&MetadataHash> {
        self.metadata_hash.as_ref()
    }

    /// The identifier of this body: the hash of its canonical encoding.
    pub fn id(&self) -> Hash {
        Hash::from(self)
    }
}

/// A transaction: a body, the witnesses authorizing it, and optional
/// metadata.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transaction {
    body: Body,
    witnesses: WitnessSet,
    metadata: Option<Metadata>,
}

impl Transaction {
    /// Assemble a transaction.
    pub fn new(body: Body, witnesses: WitnessSet, metadata: Option<Metadata>) -> Transaction {
        Transaction {
            body,
            witnesses,
            metadata,
        }
    }

    /// The transaction body.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// The witness set.
    pub fn witnesses(&self) -> &WitnessSet {
        &self.witnesses
    }

    /// The metadata, if any.
    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// The transaction identifier: the hash of the body's canonical
    /// encoding. Witnesses and metadata do not contribute.
    pub fn id(&self) -> Hash {
        self.body.id()
    }

    /// The size of this transaction's canonical encoding, in bytes.
    pub fn size(&self) -> u64 {
        self.canonical_serialize_to_vec()
            .expect("serializing into a Vec never fails")
            .len() as u64
    }
}
