//! Network and protocol parameters.

use std::{collections::BTreeMap, fmt, io};

use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

use crate::{
    amount::Coin,
    keys::GenesisKeyHash,
    serialization::{
        CanonicalDeserialize, CanonicalSerialize, ReadLedgerExt, SerializationError,
        WriteLedgerExt,
    },
};

/// The number of slots in an epoch.
pub const SLOTS_PER_EPOCH: u64 = 432_000;

/// An Okapi network.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub enum Network {
    /// The production network.
    #[default]
    Mainnet,
    /// The test network.
    Testnet,
}

impl Network {
    /// The discriminant carried in address headers.
    pub fn id(&self) -> u8 {
        match self {
            Network::Mainnet => 1,
            Network::Testnet => 0,
        }
    }

    /// Recover a network from an address-header discriminant.
    pub fn from_id(id: u8) -> Option<Network> {
        match id {
            1 => Some(Network::Mainnet),
            0 => Some(Network::Testnet),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Network::Mainnet => f.write_str("Mainnet"),
            Network::Testnet => f.write_str("Testnet"),
        }
    }
}

/// A slot: the chain's smallest unit of time.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Slot(pub u64);

impl Slot {
    /// The epoch this slot falls in.
    pub fn epoch(&self) -> Epoch {
        Epoch(self.0 / SLOTS_PER_EPOCH)
    }
}

/// An epoch number.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Epoch(pub u64);

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl CanonicalSerialize for Slot {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_compact_u64(self.0)
    }
}

impl CanonicalDeserialize for Slot {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Slot(reader.read_compact_u64()?))
    }
}

impl CanonicalSerialize for Epoch {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_compact_u64(self.0)
    }
}

impl CanonicalDeserialize for Epoch {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Epoch(reader.read_compact_u64()?))
    }
}

/// A protocol version: a major number that hard-forks, and a minor one that
/// doesn't.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct ProtocolVersion {
    /// Incompatible rule changes.
    pub major: u64,
    /// Compatible rule changes.
    pub minor: u64,
}

impl CanonicalSerialize for ProtocolVersion {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_compact_u64(self.major)?;
        writer.write_compact_u64(self.minor)
    }
}

impl CanonicalDeserialize for ProtocolVersion {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(ProtocolVersion {
            major: reader.read_compact_u64()?,
            minor: reader.read_compact_u64()?,
        })
    }
}

/// The chain-wide tunable parameters.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// The per-byte fee coefficient.
    pub min_fee_a: u64,
    /// The flat fee term.
    pub min_fee_b: u64,
    /// The maximum size of a transaction's canonical encoding, in bytes.
    pub max_tx_size: u64,
    /// The refundable deposit reserved when a stake credential registers.
    pub key_deposit: Coin,
    /// The refundable deposit reserved when a stake pool registers.
    pub pool_deposit: Coin,
    /// The minimum base-asset quantity of an output.
    pub min_utxo_value: Coin,
    /// The minimum declared operating cost of a stake pool.
    pub min_pool_cost: Coin,
    /// The maximum number of epochs a pool retirement may be scheduled ahead.
    pub e_max: u64,
    /// The current protocol version.
    pub protocol_version: ProtocolVersion,
}

impl ProtocolParams {
    /// The minimum fee for a transaction of the given encoded size.
    pub fn min_fee(&self, tx_size: u64) -> Coin {
        let fee = self
            .min_fee_a
            .saturating_mul(tx_size)
            .saturating_add(self.min_fee_b)
            .min(crate::amount::MAX_MONEY as u64);
        (fee as i64)
            .try_into()
            .expect("fee is clamped to the valid coin range")
    }
}

/// A partial parameter assignment proposed by a genesis key.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct ProtocolParamsUpdate {
    /// A new per-byte fee coefficient, if proposed.
    pub min_fee_a: Option<u64>,
    /// A new flat fee term, if proposed.
    pub min_fee_b: Option<u64>,
    /// A new maximum transaction size, if proposed.
    pub max_tx_size: Option<u64>,
    /// A new stake-credential deposit, if proposed.
    pub key_deposit: Option<Coin>,
    /// A new stake-pool deposit, if proposed.
    pub pool_deposit: Option<Coin>,
    /// A new output minimum, if proposed.
    pub min_utxo_value: Option<Coin>,
    /// A new pool cost floor, if proposed.
    pub min_pool_cost: Option<Coin>,
    /// A new retirement horizon, if proposed.
    pub e_max: Option<u64>,
    /// A new protocol version, if proposed.
    pub protocol_version: Option<ProtocolVersion>,
}

impl CanonicalSerialize for ProtocolParamsUpdate {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.min_fee_a.canonical_serialize(&mut writer)?;
        self.min_fee_b.canonical_serialize(&mut writer)?;
        self.max_tx_size.canonical_serialize(&mut writer)?;
        self.key_deposit.canonical_serialize(&mut writer)?;
        self.pool_deposit.canonical_serialize(&mut writer)?;
        self.min_utxo_value.canonical_serialize(&mut writer)?;
        self.min_pool_cost.canonical_serialize(&mut writer)?;
        self.e_max.canonical_serialize(&mut writer)?;
        self.protocol_version.canonical_serialize(&mut writer)
    }
}

impl CanonicalDeserialize for ProtocolParamsUpdate {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(ProtocolParamsUpdate {
            min_fee_a: Option::canonical_deserialize(&mut reader)?,
            min_fee_b: Option::canonical_deserialize(&mut reader)?,
            max_tx_size: Option::canonical_deserialize(&mut reader)?,
            key_deposit: Option::canonical_deserialize(&mut reader)?,
            pool_deposit: Option::canonical_deserialize(&mut reader)?,
            min_utxo_value: Option::canonical_deserialize(&mut reader)?,
            min_pool_cost: Option::canonical_deserialize(&mut reader)?,
            e_max: Option::canonical_deserialize(&mut reader)?,
            protocol_version: Option::canonical_deserialize(&mut reader)?,
        })
    }
}

/// A protocol-parameter update carried by a transaction: one proposal per
/// voting genesis key, targeted at an epoch.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Update {
    /// The proposals, keyed by the genesis key voting for each.
    pub proposals: BTreeMap<GenesisKeyHash, ProtocolParamsUpdate>,
    /// The epoch the proposals target.
    pub epoch: Epoch,
}

impl CanonicalSerialize for Update {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.proposals.canonical_serialize(&mut writer)?;
        self.epoch.canonical_serialize(&mut writer)
    }
}

impl CanonicalDeserialize for Update {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Update {
            proposals: BTreeMap::canonical_deserialize(&mut reader)?,
            epoch: Epoch::canonical_deserialize(&mut reader)?,
        })
    }
}
