//! Failures that can occur when applying ledger rules.
//!
//! Each error variant corresponds to a validation rule, so enumerating all
//! possible failures enumerates the rules we implement, and ensures that we
//! don't reject transactions for a non-enumerated reason. Outer rules wrap
//! the failures of the rules they delegate to, and every rule reports the
//! independent failures it found as a list.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use okapi_chain::{
    address::{Address, RewardAccount, StakeCredential},
    amount::Coin,
    certificate::UnitInterval,
    keys::{GenesisKeyHash, PoolKeyHash, WitnessKeyHash},
    parameters::{Epoch, Slot},
    script::ScriptHash,
    transaction::{MetadataHash, TxIn, TxOut, VKeyWitness},
    value::Value,
};

/// A failure of the UTxO value-flow rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UtxoError {
    /// The transaction consumes nothing.
    #[error("transaction has an empty input set")]
    InputSetEmpty,

    /// The transaction's time to live has passed.
    #[error("transaction expired at slot {ttl}, current slot is {slot}")]
    Expired {
        /// The last slot the transaction was valid in.
        ttl: Slot,
        /// The slot the transaction was applied in.
        slot: Slot,
    },

    /// The transaction spends outputs that are not in the UTxO.
    #[error("transaction spends {} unknown or already spent outputs", .missing.len())]
    BadInputs {
        /// The inputs with no corresponding unspent output.
        missing: BTreeSet<TxIn>,
    },

    /// The declared fee is below the minimum for the transaction's size.
    #[error("fee {actual} is below the required minimum fee {required}")]
    FeeTooSmall {
        /// The minimum fee for this transaction.
        required: Coin,
        /// The declared fee.
        actual: Coin,
    },

    /// The transaction creates or destroys value.
    #[error("consumed value {consumed:?} differs from produced value {produced:?}")]
    ValueNotConserved {
        /// Everything the transaction consumes: spent outputs, withdrawals,
        /// refunds, and the forge field.
        consumed: Value,
        /// Everything the transaction produces: new outputs, the fee, and
        /// deposits.
        produced: Value,
    },

    /// Outputs below the minimum value, or with non-positive components.
    #[error("transaction has {} outputs below the minimum or not positive", .outputs.len())]
    OutputTooSmall {
        /// The offending outputs.
        outputs: Vec<TxOut>,
    },

    /// Outputs to legacy addresses with oversized attributes.
    #[error("transaction has {} outputs with oversized bootstrap attributes", .outputs.len())]
    OutputBootAddrAttrsTooBig {
        /// The offending outputs.
        outputs: Vec<TxOut>,
    },

    /// The transaction's encoding exceeds the protocol limit.
    #[error("transaction size {actual} exceeds the maximum {max}")]
    MaxTxSizeExceeded {
        /// The size of this transaction's encoding.
        actual: u64,
        /// The protocol's size limit.
        max: u64,
    },

    /// The transaction forges the base asset.
    #[error("transaction forges the base asset")]
    ForgesBaseAsset,

    /// Outputs addressed to the wrong network.
    #[error("transaction pays {} outputs on the wrong network", .addresses.len())]
    WrongNetwork {
        /// The offending addresses.
        addresses: Vec<Address>,
    },

    /// Withdrawals from reward accounts on the wrong network.
    #[error("transaction withdraws from {} accounts on the wrong network", .accounts.len())]
    WrongNetworkWithdrawal {
        /// The offending accounts.
        accounts: Vec<RewardAccount>,
    },

    /// Value arithmetic left the representable range.
    ///
    /// An honest transaction over a bounded ledger can never trip this;
    /// it guards the conservation equation against adversarial quantities.
    #[error("value arithmetic left the representable range")]
    ValueOutOfBounds,

    /// The parameter update was malformed.
    #[error("invalid protocol parameter update")]
    Update(#[from] UpdateError),
}

/// A failure of the protocol-parameter update rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdateError {
    /// An update proposal was voted for by a key that is not a genesis key.
    #[error("update proposed by {} non-genesis keys", .keys.len())]
    NonGenesisUpdate {
        /// The unrecognized voting keys.
        keys: BTreeSet<GenesisKeyHash>,
    },
}

/// A failure of the witnessing rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UtxowError {
    /// Witnesses whose signature does not verify against the body hash.
    #[error("transaction carries {} invalid witnesses", .witnesses.len())]
    InvalidWitnesses {
        /// The witnesses that failed verification.
        witnesses: Vec<VKeyWitness>,
    },

    /// Required key witnesses that were not provided.
    #[error("transaction is missing {} required key witnesses", .missing.len())]
    MissingVKeyWitnesses {
        /// The required hashes with no matching witness.
        missing: BTreeSet<WitnessKeyHash>,
    },

    /// The body declares a metadata hash but no metadata is present.
    #[error("transaction declares metadata hash {declared:?} but carries no metadata")]
    MissingMetadata {
        /// The declared hash.
        declared: MetadataHash,
    },

    /// Metadata is present but the body declares no hash.
    #[error("transaction carries metadata hashing to {actual:?} but declares no hash")]
    MissingMetadataHash {
        /// The hash of the undeclared metadata.
        actual: MetadataHash,
    },

    /// The declared metadata hash does not match the metadata.
    #[error("declared metadata hash {declared:?} does not match actual {actual:?}")]
    ConflictingMetadataHash {
        /// The declared hash.
        declared: MetadataHash,
        /// The hash of the metadata actually carried.
        actual: MetadataHash,
    },

    /// Required script witnesses that were not provided.
    #[error("transaction is missing {} required script witnesses", .missing.len())]
    MissingScriptWitnesses {
        /// The required script hashes with no matching script.
        missing: BTreeSet<ScriptHash>,
    },

    /// Script witnesses that nothing in the transaction requires.
    #[error("transaction carries {} unneeded script witnesses", .extra.len())]
    ExtraneousScriptWitnesses {
        /// The provided but unneeded script hashes.
        extra: BTreeSet<ScriptHash>,
    },

    /// Scripts that evaluated to failure.
    #[error("{} script witnesses failed to validate", .failed.len())]
    ScriptWitnessNotValidating {
        /// The hashes of the failing scripts.
        failed: BTreeSet<ScriptHash>,
    },

    /// The wrapped value-flow rule failed.
    #[error("invalid transaction: {0}")]
    Utxo(#[from] UtxoError),
}

/// A failure of the stake-delegation rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DelegError {
    /// Registering a credential that is already registered.
    #[error("stake credential {0:?} is already registered")]
    StakeKeyAlreadyRegistered(StakeCredential),

    /// Using a credential that is not registered.
    #[error("stake credential {0:?} is not registered")]
    StakeKeyNotRegistered(StakeCredential),

    /// Delegating to a pool that is not registered.
    #[error("cannot delegate {delegator:?} to unregistered pool {pool}")]
    StakeDelegationImpossible {
        /// The delegating credential.
        delegator: StakeCredential,
        /// The missing pool.
        pool: PoolKeyHash,
    },

    /// Deregistering a credential whose reward account still holds funds.
    #[error("reward account {account} still holds {balance}")]
    RewardAccountNotEmpty {
        /// The account that must be emptied first.
        account: RewardAccount,
        /// Its remaining balance.
        balance: Coin,
    },
}

/// A failure of the stake-pool rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The declared cost is below the protocol floor.
    #[error("pool cost {cost} is below the minimum {minimum}")]
    StakePoolCostTooLow {
        /// The declared cost.
        cost: Coin,
        /// The protocol's floor.
        minimum: Coin,
    },

    /// The declared margin is not a fraction in `[0, 1]`.
    #[error("pool margin {0:?} is not in the unit interval")]
    InvalidMargin(UnitInterval),

    /// Retiring a pool that is not registered.
    #[error("stake pool {0} is not registered")]
    StakePoolNotRegistered(PoolKeyHash),

    /// A retirement scheduled outside the allowed window.
    #[error("retirement epoch {given} is outside ({earliest}, {latest}]")]
    WrongRetirementEpoch {
        /// The earliest allowed epoch.
        earliest: Epoch,
        /// The latest allowed epoch.
        latest: Epoch,
        /// The epoch the certificate asked for.
        given: Epoch,
    },
}

/// A failure of the certificate dispatcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DelplError {
    /// A delegation certificate failed.
    #[error("invalid delegation certificate: {0}")]
    Deleg(#[from] DelegError),

    /// A pool certificate failed.
    #[error("invalid pool certificate: {0}")]
    Pool(#[from] PoolError),
}

/// A failure of the certificate-sequence rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DelegsError {
    /// The withdrawal map does not match the reward balances exactly.
    #[error("{} withdrawals do not match reward account balances", .mismatch.len())]
    WithdrawalsNotInRewards {
        /// The withdrawals with no matching balance.
        mismatch: BTreeMap<RewardAccount, Coin>,
    },

    /// A certificate failed.
    #[error("invalid certificate: {0}")]
    Delpl(#[from] DelplError),
}

/// A failure of the composite ledger rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The witnessing side failed.
    #[error("{0}")]
    Utxow(#[from] UtxowError),

    /// The delegation side failed.
    #[error("{0}")]
    Delegs(#[from] DelegsError),
}
