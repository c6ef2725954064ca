//! Delegation certificates.
//!
//! Certificates are on-chain commands that modify the delegation state:
//! registering and deregistering stake credentials, delegating them to
//! pools, and registering or retiring the pools themselves.

use std::{collections::BTreeSet, io};

use byteorder::{ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

use crate::{
    address::{RewardAccount, StakeCredential},
    amount::Coin,
    keys::{PoolKeyHash, StakingKeyHash},
    parameters::Epoch,
    script::ScriptHash,
    serialization::{
        CanonicalDeserialize, CanonicalSerialize, ReadLedgerExt, SerializationError,
        WriteLedgerExt,
    },
};

/// A rational in `[0, 1]`, used for pool margins.
///
/// The bounds are validated by the pool rule, not the representation, so a
/// malformed certificate can be parsed and then rejected with a structured
/// failure.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct UnitInterval {
    /// The numerator.
    pub numerator: u64,
    /// The denominator.
    pub denominator: u64,
}

impl UnitInterval {
    /// Whether this is a well-formed fraction in `[0, 1]`.
    pub fn is_proper(&self) -> bool {
        self.denominator != 0 && self.numerator <= self.denominator
    }
}

impl CanonicalSerialize for UnitInterval {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_compact_u64(self.numerator)?;
        writer.write_compact_u64(self.denominator)
    }
}

impl CanonicalDeserialize for UnitInterval {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(UnitInterval {
            numerator: reader.read_compact_u64()?,
            denominator: reader.read_compact_u64()?,
        })
    }
}

/// The declared parameters of a stake pool.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct PoolParams {
    /// The hash of the pool's cold key.
    pub operator: PoolKeyHash,
    /// The stake the operator promises to hold in the pool.
    pub pledge: Coin,
    /// The fixed operating cost charged per epoch.
    pub cost: Coin,
    /// The fraction of rewards the operator takes after cost.
    pub margin: UnitInterval,
    /// The account the operator's share is paid into.
    pub reward_account: RewardAccount,
    /// The staking keys of the pool's owners, who back the pledge.
    pub owners: BTreeSet<StakingKeyHash>,
}

impl CanonicalSerialize for PoolParams {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.operator.canonical_serialize(&mut writer)?;
        self.pledge.canonical_serialize(&mut writer)?;
        self.cost.canonical_serialize(&mut writer)?;
        self.margin.canonical_serialize(&mut writer)?;
        self.reward_account.canonical_serialize(&mut writer)?;
        self.owners.canonical_serialize(&mut writer)
    }
}

impl CanonicalDeserialize for PoolParams {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(PoolParams {
            operator: PoolKeyHash::canonical_deserialize(&mut reader)?,
            pledge: Coin::canonical_deserialize(&mut reader)?,
            cost: Coin::canonical_deserialize(&mut reader)?,
            margin: UnitInterval::canonical_deserialize(&mut reader)?,
            reward_account: RewardAccount::canonical_deserialize(&mut reader)?,
            owners: BTreeSet::canonical_deserialize(&mut reader)?,
        })
    }
}

/// An on-chain command modifying the delegation state.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub enum Certificate {
    /// Register a stake credential, reserving the key deposit.
    StakeRegistration(StakeCredential),
    /// Deregister a stake credential, refunding the key deposit.
    StakeDeregistration(StakeCredential),
    /// Point a registered credential's stake at a pool.
    StakeDelegation {
        /// The delegating credential.
        delegator: StakeCredential,
        /// The pool delegated to.
        pool: PoolKeyHash,
    },
    /// Register a stake pool, or update a registered pool's parameters.
    PoolRegistration(PoolParams),
    /// Schedule a pool's retirement at the start of an epoch.
    PoolRetirement {
        /// The retiring pool.
        pool: PoolKeyHash,
        /// The epoch the retirement takes effect.
        epoch: Epoch,
    },
}

impl Certificate {
    /// Whether this certificate kind must be authorized by a key witness.
    ///
    /// Registration is the exception: anyone may pay the deposit to
    /// register a credential, so no witness is demanded.
    pub fn requires_vkey_witness(&self) -> bool {
        !matches!(self, Certificate::StakeRegistration(_))
    }
}

impl CanonicalSerialize for Certificate {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        match self {
            Certificate::StakeRegistration(credential) => {
                writer.write_u8(0)?;
                credential.canonical_serialize(&mut writer)
            }
            Certificate::StakeDeregistration(credential) => {
                writer.write_u8(1)?;
                credential.canonical_serialize(&mut writer)
            }
            Certificate::StakeDelegation { delegator, pool } => {
                writer.write_u8(2)?;
                delegator.canonical_serialize(&mut writer)?;
                pool.canonical_serialize(&mut writer)
            }
            Certificate::PoolRegistration(params) => {
                writer.write_u8(3)?;
                params.canonical_serialize(&mut writer)
            }
            Certificate::PoolRetirement { pool, epoch } => {
                writer.write_u8(4)?;
                pool.canonical_serialize(&mut writer)?;
                epoch.canonical_serialize(&mut writer)
            }
        }
    }
}

impl CanonicalDeserialize for Certificate {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        match reader.read_u8()? {
            0 => Ok(Certificate::StakeRegistration(
                StakeCredential::canonical_deserialize(&mut reader)?,
            )),
            1 => Ok(Certificate::StakeDeregistration(
                StakeCredential::canonical_deserialize(&mut reader)?,
            )),
            2 => Ok(Certificate::StakeDelegation {
                delegator: StakeCredential::canonical_deserialize(&mut reader)?,
                pool: PoolKeyHash::canonical_deserialize(&mut reader)?,
            }),
            3 => Ok(Certificate::PoolRegistration(
                PoolParams::canonical_deserialize(&mut reader)?,
            )),
            4 => Ok(Certificate::PoolRetirement {
                pool: PoolKeyHash::canonical_deserialize(&mut reader)?,
                epoch: Epoch::canonical_deserialize(&mut reader)?,
            }),
            _ => Err(SerializationError::Parse("invalid certificate tag")),
        }
    }
}

/// A StakeCredential is a single byte tag plus the credential hash.
impl CanonicalSerialize for StakeCredential {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        match self {
            StakeCredential::Key(hash) => {
                writer.write_u8(0)?;
                hash.canonical_serialize(&mut writer)
            }
            StakeCredential::Script(hash) => {
                writer.write_u8(1)?;
                hash.canonical_serialize(&mut writer)
            }
        }
    }
}

impl CanonicalDeserialize for StakeCredential {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        match reader.read_u8()? {
            0 => Ok(StakeCredential::Key(StakingKeyHash::canonical_deserialize(
                &mut reader,
            )?)),
            1 => Ok(StakeCredential::Script(ScriptHash::canonical_deserialize(
                &mut reader,
            )?)),
            _ => Err(SerializationError::Parse("invalid credential tag")),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::serialization::CanonicalDeserializeInto;

    proptest! {
        #[test]
        fn certificate_round_trips(cert in any::<Certificate>()) {
            let bytes = cert.canonical_serialize_to_vec().unwrap();
            let decoded: Certificate = bytes.as_slice().canonical_deserialize_into().unwrap();
            prop_assert_eq!(decoded, cert);
        }
    }

    #[test]
    fn only_registration_skips_the_witness() {
        let credential = StakeCredential::Key(StakingKeyHash([7; 28]));

        assert!(!Certificate::StakeRegistration(credential).requires_vkey_witness());
        assert!(Certificate::StakeDeregistration(credential).requires_vkey_witness());
        assert!(Certificate::StakeDelegation {
            delegator: credential,
            pool: PoolKeyHash([1; 28]),
        }
        .requires_vkey_witness());
    }

    #[test]
    fn margin_bounds() {
        assert!(UnitInterval { numerator: 0, denominator: 1 }.is_proper());
        assert!(UnitInterval { numerator: 1, denominator: 1 }.is_proper());
        assert!(!UnitInterval { numerator: 2, denominator: 1 }.is_proper());
        assert!(!UnitInterval { numerator: 0, denominator: 0 }.is_proper());
    }
}
