//! Verification-key hashes and their roles.
//!
//! A verification key can authorize spending, staking, pool operation, or
//! protocol-parameter updates. The ledger rules never confuse these roles at
//! runtime: each role is a distinct newtype over the same 28-byte digest,
//! and the only way to compare hashes across roles is the explicit
//! [`as_witness`](PaymentKeyHash::as_witness) coercion into the witness
//! role, which is what signature checking works in.

use std::{fmt, io};

use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

use crate::{
    primitives::{digest, ed25519},
    serialization::{CanonicalDeserialize, CanonicalSerialize, ReadLedgerExt, SerializationError},
};

macro_rules! key_hash_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
        #[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
        pub struct $name(pub [u8; 28]);

        impl $name {
            /// Compute the hash of a verification key.
            pub fn of(vkey: &ed25519::VerificationKeyBytes) -> Self {
                let bytes: [u8; 32] = (*vkey).into();
                Self(digest::blake2b_224(&bytes))
            }

            /// Coerce this hash into the witness role.
            ///
            /// The coercion is deliberately one-way: a witness hash can be
            /// compared against any role, but never converted back.
            pub fn as_witness(self) -> WitnessKeyHash {
                WitnessKeyHash(self.0)
            }
        }

        impl From<[u8; 28]> for $name {
            fn from(bytes: [u8; 28]) -> Self {
                Self(bytes)
            }
        }

        impl From<$name> for [u8; 28] {
            fn from(hash: $name) -> Self {
                hash.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.debug_tuple(stringify!($name))
                    .field(&hex::encode(self.0))
                    .finish()
            }
        }

        impl CanonicalSerialize for $name {
            fn canonical_serialize<W: io::Write>(
                &self,
                mut writer: W,
            ) -> Result<(), io::Error> {
                writer.write_all(&self.0)
            }
        }

        impl CanonicalDeserialize for $name {
            fn canonical_deserialize<R: io::Read>(
                mut reader: R,
            ) -> Result<Self, SerializationError> {
                Ok(Self(reader.read_28_bytes()?))
            }
        }
    };
}

key_hash_newtype!(
    /// The hash of a verification key in the payment role: it locks ordinary
    /// outputs.
    PaymentKeyHash
);

key_hash_newtype!(
    /// The hash of a verification key in the staking role: it controls a
    /// reward account and its delegation.
    StakingKeyHash
);

key_hash_newtype!(
    /// The hash of a stake pool's cold key.
    PoolKeyHash
);

key_hash_newtype!(
    /// The hash of a genesis key, entitled to vote on protocol-parameter
    /// updates through its delegate.
    GenesisKeyHash
);

key_hash_newtype!(
    /// The hash of a verification key in the witness role.
    ///
    /// Witness hashes are what signature checking produces and consumes;
    /// every other role reaches this type through `as_witness`.
    WitnessKeyHash
);
