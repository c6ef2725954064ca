//! The certificate-sequence and stake-delegation rules.

use std::collections::BTreeMap;

use okapi_chain::{
    address::RewardAccount,
    amount::Coin,
    certificate::Certificate,
    parameters::{Network, ProtocolParams, Slot},
    transaction::Transaction,
};

use crate::{
    error::{DelegError, DelegsError, DelplError},
    state::DelegationState,
};

use super::pool::{apply_pool, PoolEnv};

/// The environment the delegation rules run in.
#[derive(Clone, Debug)]
pub struct DelegsEnv {
    /// The slot the transaction is being applied in.
    pub slot: Slot,
    /// The network the ledger belongs to.
    pub network: Network,
    /// The protocol parameters in force.
    pub pparams: ProtocolParams,
}

/// Apply a transaction's withdrawals and certificates to the delegation
/// state.
///
/// Withdrawals are validated and paid out first, then the certificates are
/// applied in their declared order, so a transaction can drain a reward
/// account and deregister its credential in one go.
#[tracing::instrument(level = "debug", skip_all, fields(tx = %tx.id()))]
pub fn apply_delegs(
    env: &DelegsEnv,
    state: &DelegationState,
    tx: &Transaction,
) -> Result<DelegationState, Vec<DelegsError>> {
    let body = tx.body();
    let mut failures = Vec::new();

    // every withdrawal must drain its account exactly
    let mismatch: BTreeMap<RewardAccount, Coin> = body
        .withdrawals()
        .iter()
        .filter(|(account, amount)| state.rewards.get(*account) != Some(*amount))
        .map(|(account, amount)| (*account, *amount))
        .collect();
    if !mismatch.is_empty() {
        failures.push(DelegsError::WithdrawalsNotInRewards { mismatch });
    }

    let mut next = state.clone();
    if failures.is_empty() {
        for account in body.withdrawals().keys() {
            next.rewards.insert(*account, Coin::zero());
        }
    }

    for certificate in body.certificates() {
        match apply_delpl(env, &next, certificate) {
            Ok(applied) => next = applied,
            Err(failure) => failures.push(DelegsError::Delpl(failure)),
        }
    }

    if !failures.is_empty() {
        tracing::debug!(failures = failures.len(), "rejected transaction");
        return Err(failures);
    }

    Ok(next)
}

/// Dispatch one certificate to the rule that owns it.
pub(super) fn apply_delpl(
    env: &DelegsEnv,
    state: &DelegationState,
    certificate: &Certificate,
) -> Result<DelegationState, DelplError> {
    match certificate {
        Certificate::StakeRegistration(_)
        | Certificate::StakeDeregistration(_)
        | Certificate::StakeDelegation { .. } => {
            apply_deleg(env, state, certificate).map_err(DelplError::Deleg)
        }
        Certificate::PoolRegistration(_) | Certificate::PoolRetirement { .. } => {
            let pool_env = PoolEnv {
                slot: env.slot,
                pparams: env.pparams.clone(),
            };
            apply_pool(&pool_env, state, certificate).map_err(DelplError::Pool)
        }
    }
}

/// Apply one stake-credential certificate.
fn apply_deleg(
    env: &DelegsEnv,
    state: &DelegationState,
    certificate: &Certificate,
) -> Result<DelegationState, DelegError> {
    let mut next = state.clone();

    match certificate {
        Certificate::StakeRegistration(credential) => {
            if state.is_registered(env.network, credential) {
                return Err(DelegError::StakeKeyAlreadyRegistered(*credential));
            }
            next.rewards.insert(
                RewardAccount {
                    network: env.network,
                    credential: *credential,
                },
                Coin::zero(),
            );
        }

        Certificate::StakeDeregistration(credential) => {
            let account = RewardAccount {
                network: env.network,
                credential: *credential,
            };
            let balance = match state.rewards.get(&account) {
                None => return Err(DelegError::StakeKeyNotRegistered(*credential)),
                Some(balance) => *balance,
            };
            if !balance.is_zero() {
                return Err(DelegError::RewardAccountNotEmpty { account, balance });
            }
            next.rewards.remove(&account);
            next.delegations.remove(credential);
        }

        Certificate::StakeDelegation { delegator, pool } => {
            if !state.is_registered(env.network, delegator) {
                return Err(DelegError::StakeKeyNotRegistered(*delegator));
            }
            if !state.stake_pools.contains_key(pool) {
                return Err(DelegError::StakeDelegationImpossible {
                    delegator: *delegator,
                    pool: *pool,
                });
            }
            next.delegations.insert(*delegator, *pool);
        }

        Certificate::PoolRegistration(_) | Certificate::PoolRetirement { .. } => {
            unreachable!("pool certificates are dispatched to the pool rule")
        }
    }

    Ok(next)
}
