//! The composite ledger rule.

use okapi_chain::{
    parameters::{Network, ProtocolParams, Slot},
    transaction::Transaction,
};

use crate::{
    error::LedgerError,
    state::{AccountState, LedgerState},
};

use super::{
    delegs::{apply_delegs, DelegsEnv},
    utxo::UtxoEnv,
    utxow::apply_utxow,
};

/// The environment a ledger transition runs in.
#[derive(Clone, Debug)]
pub struct LedgerEnv {
    /// The slot the transaction is being applied in.
    pub slot: Slot,
    /// The index of the transaction within its block.
    pub tx_index: u32,
    /// The network the ledger belongs to.
    pub network: Network,
    /// The protocol parameters in force.
    pub pparams: ProtocolParams,
    /// The treasury and reserves.
    pub account: AccountState,
}

/// Apply a transaction to the full ledger state.
///
/// The witnessing side and the delegation side read disjoint parts of the
/// state, so both are checked against the pre-state and their failures are
/// reported together; the successor state combines both updates.
#[tracing::instrument(level = "debug", skip_all, fields(tx = %tx.id(), index = env.tx_index))]
pub fn apply_ledger(
    env: &LedgerEnv,
    state: &LedgerState,
    tx: &Transaction,
) -> Result<LedgerState, Vec<LedgerError>> {
    let utxo_env = UtxoEnv {
        slot: env.slot,
        network: env.network,
        pparams: env.pparams.clone(),
        stake_pools: state.delegation_state.stake_pools.keys().copied().collect(),
        genesis_delegs: state.delegation_state.genesis_delegs.clone(),
    };
    let delegs_env = DelegsEnv {
        slot: env.slot,
        network: env.network,
        pparams: env.pparams.clone(),
    };

    let utxo_result = apply_utxow(&utxo_env, &state.utxo_state, tx);
    let delegs_result = apply_delegs(&delegs_env, &state.delegation_state, tx);

    match (utxo_result, delegs_result) {
        (Ok(utxo_state), Ok(delegation_state)) => Ok(LedgerState {
            utxo_state,
            delegation_state,
        }),
        (utxo_result, delegs_result) => {
            let mut failures = Vec::new();
            if let Err(utxow_failures) = utxo_result {
                failures.extend(utxow_failures.into_iter().map(LedgerError::Utxow));
            }
            if let Err(delegs_failures) = delegs_result {
                failures.extend(delegs_failures.into_iter().map(LedgerError::Delegs));
            }
            Err(failures)
        }
    }
}
