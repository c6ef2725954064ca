//! Transaction witnesses.
//!
//! A key witness is a verification key and a signature over the body hash.
//! Bootstrap witnesses discharge legacy addresses and additionally carry
//! the chain code and attributes the legacy key-hash scheme commits to.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
};

use crate::{
    keys::{PaymentKeyHash, WitnessKeyHash},
    primitives::{digest, ed25519},
    script::{MultiSig, ScriptHash},
};

use super::Hash;

/// A verification-key witness.
#[derive(Copy, Clone, Debug)]
pub struct VKeyWitness {
    /// The verification key; its hash must match a required witness hash.
    pub vkey: ed25519::VerificationKeyBytes,
    /// A signature over the transaction body hash.
    pub signature: ed25519::Signature,
}

impl VKeyWitness {
    /// Construct a witness for a body hash with a signing key.
    pub fn sign(signing_key: &ed25519::SigningKey, body_hash: &Hash) -> VKeyWitness {
        VKeyWitness {
            vkey: ed25519::VerificationKey::from(signing_key).into(),
            signature: signing_key.sign(body_hash.as_ref()),
        }
    }

    /// Check the signature against a body hash.
    pub fn verify(&self, body_hash: &Hash) -> Result<(), ed25519::Error> {
        ed25519::VerificationKey::try_from(self.vkey)
            .and_then(|vkey| vkey.verify(&self.signature, body_hash.as_ref()))
    }

    /// The hash of the witnessing key.
    pub fn key_hash(&self) -> WitnessKeyHash {
        WitnessKeyHash::of(&self.vkey)
    }

    fn as_bytes(&self) -> ([u8; 32], [u8; 64]) {
        (self.vkey.into(), self.signature.into())
    }
}

impl PartialEq for VKeyWitness {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for VKeyWitness {}

impl PartialOrd for VKeyWitness {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VKeyWitness {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(&other.as_bytes())
    }
}

/// A witness discharging a legacy bootstrap address.
#[derive(Clone, Debug)]
pub struct BootstrapWitness {
    /// The verification key.
    pub vkey: ed25519::VerificationKeyBytes,
    /// A signature over the transaction body hash.
    pub signature: ed25519::Signature,
    /// The derivation chain code of the legacy key.
    pub chain_code: [u8; 32],
    /// The address attributes the legacy key hash commits to.
    pub attributes: Vec<u8>,
}

impl BootstrapWitness {
    /// Check the signature against a body hash.
    pub fn verify(&self, body_hash: &Hash) -> Result<(), ed25519::Error> {
        ed25519::VerificationKey::try_from(self.vkey)
            .and_then(|vkey| vkey.verify(&self.signature, body_hash.as_ref()))
    }

    /// The root key hash this witness discharges.
    ///
    /// Legacy key hashes commit to the chain code and the address
    /// attributes along with the key itself.
    pub fn key_hash(&self) -> PaymentKeyHash {
        let vkey_bytes: [u8; 32] = self.vkey.into();
        let mut bytes = Vec::with_capacity(64 + self.attributes.len());
        bytes.extend_from_slice(&vkey_bytes);
        bytes.extend_from_slice(&self.chain_code);
        bytes.extend_from_slice(&self.attributes);
        PaymentKeyHash(digest::blake2b_224(&bytes))
    }

    fn as_bytes(&self) -> ([u8; 32], [u8; 64], [u8; 32], &[u8]) {
        (
            self.vkey.into(),
            self.signature.into(),
            self.chain_code,
            &self.attributes,
        )
    }
}

impl PartialEq for BootstrapWitness {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for BootstrapWitness {}

impl PartialOrd for BootstrapWitness {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BootstrapWitness {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(&other.as_bytes())
    }
}

/// The witnesses carried by a transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WitnessSet {
    /// Verification-key witnesses.
    pub vkey_witnesses: BTreeSet<VKeyWitness>,
    /// Scripts, keyed by their hash.
    ///
    /// # Correctness
    ///
    /// Each key must be the hash of its script; the deserializer rejects
    /// anything else, and [`WitnessSet::insert_script`] maintains it.
    pub scripts: BTreeMap<ScriptHash, MultiSig>,
    /// Witnesses discharging legacy bootstrap addresses.
    pub bootstrap_witnesses: BTreeSet<BootstrapWitness>,
}

impl WitnessSet {
    /// Add a script witness under its hash.
    pub fn insert_script(&mut self, script: MultiSig) {
        self.scripts.insert(script.hash(), script);
    }

    /// The hashes of every key that provided a witness, bootstrap
    /// witnesses included.
    pub fn key_hashes(&self) -> BTreeSet<WitnessKeyHash> {
        self.vkey_witnesses
            .iter()
            .map(VKeyWitness::key_hash)
            .chain(
                self.bootstrap_witnesses
                    .iter()
                    .map(|witness| witness.key_hash().as_witness()),
            )
            .collect()
    }
}
