//! The stake-pool rule.

use okapi_chain::{
    certificate::Certificate,
    parameters::{Epoch, ProtocolParams, Slot},
};

use crate::{error::PoolError, state::DelegationState};

/// The environment the pool rule runs in.
#[derive(Clone, Debug)]
pub struct PoolEnv {
    /// The slot the transaction is being applied in.
    pub slot: Slot,
    /// The protocol parameters in force.
    pub pparams: ProtocolParams,
}

/// Apply one pool certificate.
pub fn apply_pool(
    env: &PoolEnv,
    state: &DelegationState,
    certificate: &Certificate,
) -> Result<DelegationState, PoolError> {
    let mut next = state.clone();

    match certificate {
        Certificate::PoolRegistration(params) => {
            if params.cost < env.pparams.min_pool_cost {
                return Err(PoolError::StakePoolCostTooLow {
                    cost: params.cost,
                    minimum: env.pparams.min_pool_cost,
                });
            }
            if !params.margin.is_proper() {
                return Err(PoolError::InvalidMargin(params.margin));
            }

            let operator = params.operator;
            if !state.stake_pools.contains_key(&operator) {
                next.pool_deposits
                    .insert(operator, env.pparams.pool_deposit);
            }
            // re-registering updates the parameters and cancels any pending
            // retirement
            next.stake_pools.insert(operator, params.clone());
            next.retiring.remove(&operator);
        }

        Certificate::PoolRetirement { pool, epoch } => {
            if !state.stake_pools.contains_key(pool) {
                return Err(PoolError::StakePoolNotRegistered(*pool));
            }
            let current = env.slot.epoch();
            let earliest = Epoch(current.0 + 1);
            let latest = Epoch(current.0 + env.pparams.e_max);
            if *epoch < earliest || *epoch > latest {
                return Err(PoolError::WrongRetirementEpoch {
                    earliest,
                    latest,
                    given: *epoch,
                });
            }
            next.retiring.insert(*pool, *epoch);
        }

        _ => unreachable!("only pool certificates are dispatched to the pool rule"),
    }

    Ok(next)
}
