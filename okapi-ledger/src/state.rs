//! Ledger state records.

use std::{collections::BTreeMap, io};

use okapi_chain::{
    address::{RewardAccount, StakeCredential},
    amount::Coin,
    certificate::PoolParams,
    keys::{GenesisKeyHash, PoolKeyHash, WitnessKeyHash},
    parameters::{Epoch, Network, ProtocolParamsUpdate},
    serialization::{CanonicalDeserialize, CanonicalSerialize, SerializationError},
};

use crate::utxo::Utxo;

/// Pending protocol-parameter proposals, one per genesis key.
pub type ProposedUpdates = BTreeMap<GenesisKeyHash, ProtocolParamsUpdate>;

/// The value-flow side of the ledger state.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UtxoState {
    /// The unspent outputs.
    pub utxo: Utxo,
    /// The coin currently reserved as key and pool deposits.
    pub deposited: Coin,
    /// The fees accumulated for the current epoch's reward pot.
    pub fees: Coin,
    /// The pending protocol-parameter proposals.
    pub proposals: ProposedUpdates,
}

impl CanonicalSerialize for UtxoState {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.utxo.canonical_serialize(&mut writer)?;
        self.deposited.canonical_serialize(&mut writer)?;
        self.fees.canonical_serialize(&mut writer)?;
        self.proposals.canonical_serialize(&mut writer)
    }
}

impl CanonicalDeserialize for UtxoState {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(UtxoState {
            utxo: Utxo::canonical_deserialize(&mut reader)?,
            deposited: Coin::canonical_deserialize(&mut reader)?,
            fees: Coin::canonical_deserialize(&mut reader)?,
            proposals: ProposedUpdates::canonical_deserialize(&mut reader)?,
        })
    }
}

/// The delegation side of the ledger state.
///
/// A stake credential is registered exactly when its reward account exists;
/// registration creates the account with a zero balance, and deregistration
/// requires it to be empty again.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DelegationState {
    /// Reward accounts, one per registered stake credential.
    pub rewards: BTreeMap<RewardAccount, Coin>,
    /// Which pool each registered credential delegates to, if any.
    pub delegations: BTreeMap<StakeCredential, PoolKeyHash>,
    /// The registered stake pools.
    pub stake_pools: BTreeMap<PoolKeyHash, PoolParams>,
    /// The deposit held for each registered pool.
    pub pool_deposits: BTreeMap<PoolKeyHash, Coin>,
    /// Pools scheduled to retire, and the epoch each retires in.
    pub retiring: BTreeMap<PoolKeyHash, Epoch>,
    /// The genesis keys and their current delegate keys.
    pub genesis_delegs: BTreeMap<GenesisKeyHash, WitnessKeyHash>,
}

impl DelegationState {
    /// Whether a stake credential is registered on the given network.
    pub fn is_registered(&self, network: Network, credential: &StakeCredential) -> bool {
        self.rewards.contains_key(&RewardAccount {
            network,
            credential: *credential,
        })
    }
}

impl CanonicalSerialize for DelegationState {
    fn canonical_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.rewards.canonical_serialize(&mut writer)?;
        self.delegations.canonical_serialize(&mut writer)?;
        self.stake_pools.canonical_serialize(&mut writer)?;
        self.pool_deposits.canonical_serialize(&mut writer)?;
        self.retiring.canonical_serialize(&mut writer)?;
        self.genesis_delegs.canonical_serialize(&mut writer)
    }
}

impl CanonicalDeserialize for DelegationState {
    fn canonical_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(DelegationState {
            rewards: BTreeMap::canonical_deserialize(&mut reader)?,
            delegations: BTreeMap::canonical_deserialize(&mut reader)?,
            stake_pools: BTreeMap::canonical_deserialize(&mut reader)?,
            pool_deposits: BTreeMap::canonical_deserialize(&mut reader)?,
            retiring: BTreeMap::canonical_deserialize(&mut reader)?,
            genesis_delegs: BTreeMap::canonical_deserialize(&mut reader)?,
        })
    }
}

/// The combined state the ledger rule threads.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LedgerState {
    /// The value-flow side.
    pub utxo_state: UtxoState,
    /// The delegation side.
    pub delegation_state: DelegationState,
}

/// The chain accounts outside the UTxO.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AccountState {
    /// The treasury.
    pub treasury: Coin,
    /// The unissued reserves.
    pub reserves: Coin,
}
