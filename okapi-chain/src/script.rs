//! Native multisignature scripts.
//!
//! A [`MultiSig`] script locks an output (or a reward account, or an asset
//! policy) behind a combination of key witnesses: a single required signer,
//! all of a list, any of a list, or at least `m` of a list. Scripts are
//! identified by the hash of their canonical encoding prefixed with a
//! language tag, so future script languages hash into a disjoint space.

use std::{collections::BTreeSet, fmt, io};

use byteorder::{ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest::prelude::*;

use crate::{
    keys::WitnessKeyHash,
    primitives::digest,
    serialization::{
        CanonicalDeserialize, CanonicalSerialize, ReadLedgerExt, SerializationError,
        WriteLedgerExt,
    },
};

/// The language tag prepended to a native script's encoding before hashing.
const NATIVE_SCRIPT_TAG: u8 = 0x00;

/// The hash identifying a script.
///
/// Script hashes double as asset policy identifiers: forging an asset under
/// a policy requires satisfying the script with that hash.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[cfg_attr(
    any(test, feature = "proptest-impl"),
    derive(proptest_derive::Arbitrary)
)]
pub struct ScriptHash(pub [u8; 28]);

impl From<[u8; 28]> for ScriptHash {
    fn from(bytes: [u8; 28]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for ScriptHash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ScriptHash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ScriptHash")
            .field(&hex::encode(self.0))
            .finish()
    }
}

impl CanonicalSerialize for ScriptHash {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_all(&self.0)
    }
}

impl CanonicalDeserialize for ScriptHash {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Self(reader.read_28_bytes()?))
    }
}

/// A native multisignature script.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum MultiSig {
    /// Satisfied when the named key has witnessed the transaction.
    Signature(WitnessKeyHash),
    /// Satisfied when every sub-script is satisfied.
    AllOf(Vec<MultiSig>),
    /// Satisfied when at least one sub-script is satisfied.
    AnyOf(Vec<MultiSig>),
    /// Satisfied when at least `required` of the sub-scripts are satisfied.
    AtLeast {
        /// The number of sub-scripts that must be satisfied.
        required: u64,
        /// The sub-scripts.
        scripts: Vec<MultiSig>,
    },
}

impl MultiSig {
    /// The hash identifying this script.
    pub fn hash(&self) -> ScriptHash {
        let mut bytes = vec![NATIVE_SCRIPT_TAG];
        self.canonical_serialize(&mut bytes)
            .expect("serializing into a Vec never fails");
        ScriptHash(digest::blake2b_224(&bytes))
    }

    /// Evaluate this script against the set of keys that have witnessed the
    /// transaction.
    pub fn evaluate(&self, witnessed: &BTreeSet<WitnessKeyHash>) -> bool {
        match self {
            MultiSig::Signature(hash) => witnessed.contains(hash),
            MultiSig::AllOf(scripts) => scripts.iter().all(|s| s.evaluate(witnessed)),
            MultiSig::AnyOf(scripts) => scripts.iter().any(|s| s.evaluate(witnessed)),
            MultiSig::AtLeast { required, scripts } => {
                let satisfied = scripts.iter().filter(|s| s.evaluate(witnessed)).count();
                satisfied as u64 >= *required
            }
        }
    }
}

impl CanonicalSerialize for MultiSig {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        write_multisig(self, &mut writer)
    }
}

// `MultiSig` is a recursive enum (its `AllOf`/`AnyOf`/`AtLeast` variants hold
// `Vec<MultiSig>`), and its `CanonicalSerialize` impl recurses into that
// `Vec`'s own (generic) `CanonicalSerialize` impl, which recurses back into
// `MultiSig`'s. Doing that recursion through the generic `W: io::Write`
// parameter makes the compiler generate a new `&mut &mut ... W` instantiation
// per recursive call, which never reaches a fixed point. Recursing through a
// `&mut dyn io::Write` trait object instead keeps the writer's type constant
// across calls, so the recursion is ordinary (and ordinarily monomorphized).
fn write_multisig(script: &MultiSig, writer: &mut dyn io::Write) -> Result<(), io::Error> {
    fn write_scripts(scripts: &[MultiSig], writer: &mut dyn io::Write) -> Result<(), io::Error> {
        writer.write_compact_u64(scripts.len() as u64)?;
        for script in scripts {
            write_multisig(script, &mut *writer)?;
        }
        Ok(())
    }

    match script {
        MultiSig::Signature(hash) => {
            writer.write_u8(0)?;
            hash.canonical_serialize(&mut *writer)
        }
        MultiSig::AllOf(scripts) => {
            writer.write_u8(1)?;
            write_scripts(scripts, writer)
        }
        MultiSig::AnyOf(scripts) => {
            writer.write_u8(2)?;
            write_scripts(scripts, writer)
        }
        MultiSig::AtLeast { required, scripts } => {
            writer.write_u8(3)?;
            writer.write_compact_u64(*required)?;
            write_scripts(scripts, writer)
        }
    }
}

impl CanonicalDeserialize for MultiSig {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        match reader.read_u8()? {
            0 => Ok(MultiSig::Signature(WitnessKeyHash::canonical_deserialize(
                &mut reader,
            )?)),
            1 => Ok(MultiSig::AllOf(Vec::canonical_deserialize(&mut reader)?)),
            2 => Ok(MultiSig::AnyOf(Vec::canonical_deserialize(&mut reader)?)),
            3 => {
                let required = reader.read_compact_u64()?;
                let scripts = Vec::canonical_deserialize(&mut reader)?;
                Ok(MultiSig::AtLeast { required, scripts })
            }
            _ => Err(SerializationError::Parse("invalid multisig script tag")),
        }
    }
}

#[cfg(any(test, feature = "proptest-impl"))]
impl Arbitrary for MultiSig {
    type Parameters = ();

    fn arbitrary_with(_args: ()) -> Self::Strategy {
        let leaf = any::<WitnessKeyHash>().prop_map(MultiSig::Signature);
        leaf.prop_recursive(3, 12, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(MultiSig::AllOf),
                prop::collection::vec(inner.clone(), 0..4).prop_map(MultiSig::AnyOf),
                (0u64..4, prop::collection::vec(inner, 0..4))
                    .prop_map(|(required, scripts)| MultiSig::AtLeast { required, scripts }),
            ]
        })
        .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}
