//! The UTxO value-flow rule.

use std::collections::{BTreeMap, BTreeSet};

use okapi_chain::{
    address::{Address, BootstrapAddress, RewardAccount},
    amount::{self, Coin},
    certificate::Certificate,
    keys::{GenesisKeyHash, PoolKeyHash, WitnessKeyHash},
    parameters::{Network, ProtocolParams, Slot},
    transaction::{Body, Transaction, TxIn, TxOut},
    value::Value,
};

use crate::{
    error::{UpdateError, UtxoError},
    state::UtxoState,
    utxo::Utxo,
};

/// The environment the UTxO rule runs in.
#[derive(Clone, Debug)]
pub struct UtxoEnv {
    /// The slot the transaction is being applied in.
    pub slot: Slot,
    /// The network the ledger belongs to.
    pub network: Network,
    /// The protocol parameters in force.
    pub pparams: ProtocolParams,
    /// The pools currently registered, for deposit accounting.
    pub stake_pools: BTreeSet<PoolKeyHash>,
    /// The genesis keys entitled to propose parameter updates.
    pub genesis_delegs: BTreeMap<GenesisKeyHash, WitnessKeyHash>,
}

/// Apply the UTxO rule: check a transaction's value flow against the state
/// and return the successor state.
///
/// All independent checks run and report together; the transaction is
/// rejected if any fails.
#[tracing::instrument(level = "debug", skip_all, fields(tx = %tx.id()))]
pub fn apply_utxo(
    env: &UtxoEnv,
    state: &UtxoState,
    tx: &Transaction,
) -> Result<UtxoState, Vec<UtxoError>> {
    let body = tx.body();
    let mut failures = Vec::new();

    if body.inputs().is_empty() {
        failures.push(UtxoError::InputSetEmpty);
    }

    if env.slot > body.ttl() {
        failures.push(UtxoError::Expired {
            ttl: body.ttl(),
            slot: env.slot,
        });
    }

    let missing: BTreeSet<TxIn> = body
        .inputs()
        .iter()
        .filter(|input| !state.utxo.contains_key(input))
        .copied()
        .collect();
    if !missing.is_empty() {
        failures.push(UtxoError::BadInputs { missing });
    }

    let size = tx.size();
    let required = env.pparams.min_fee(size);
    if body.fee() < required {
        failures.push(UtxoError::FeeTooSmall {
            required,
            actual: body.fee(),
        });
    }

    if body.forge().coin() != 0 {
        failures.push(UtxoError::ForgesBaseAsset);
    }

    match (consumed(env, state, body), produced(env, body)) {
        (Ok(consumed), Ok(produced)) => {
            if consumed != produced {
                failures.push(UtxoError::ValueNotConserved { consumed, produced });
            }
        }
        _ => failures.push(UtxoError::ValueOutOfBounds),
    }

    let too_small: Vec<TxOut> = body
        .outputs()
        .iter()
        .filter(|output| {
            !output.value.is_positive()
                || output.value.coin() < env.pparams.min_utxo_value.units()
        })
        .cloned()
        .collect();
    if !too_small.is_empty() {
        failures.push(UtxoError::OutputTooSmall { outputs: too_small });
    }

    let oversized: Vec<TxOut> = body
        .outputs()
        .iter()
        .filter(|output| match &output.address {
            Address::Bootstrap(bootstrap) => {
                bootstrap.attributes.len() > BootstrapAddress::MAX_ATTRIBUTES_LEN
            }
            Address::Shelley { .. } => false,
        })
        .cloned()
        .collect();
    if !oversized.is_empty() {
        failures.push(UtxoError::OutputBootAddrAttrsTooBig { outputs: oversized });
    }

    if size > env.pparams.max_tx_size {
        failures.push(UtxoError::MaxTxSizeExceeded {
            actual: size,
            max: env.pparams.max_tx_size,
        });
    }

    let wrong_network: Vec<Address> = body
        .outputs()
        .iter()
        .filter(|output| {
            output
                .address
                .network()
                .map_or(false, |network| network != env.network)
        })
        .map(|output| output.address.clone())
        .collect();
    if !wrong_network.is_empty() {
        failures.push(UtxoError::WrongNetwork {
            addresses: wrong_network,
        });
    }

    let wrong_accounts: Vec<RewardAccount> = body
        .withdrawals()
        .keys()
        .filter(|account| account.network != env.network)
        .copied()
        .collect();
    if !wrong_accounts.is_empty() {
        failures.push(UtxoError::WrongNetworkWithdrawal {
            accounts: wrong_accounts,
        });
    }

    let mut proposals = state.proposals.clone();
    if let Some(update) = body.update() {
        let unknown: BTreeSet<GenesisKeyHash> = update
            .proposals
            .keys()
            .filter(|key| !env.genesis_delegs.contains_key(*key))
            .copied()
            .collect();
        if unknown.is_empty() {
            for (key, proposal) in &update.proposals {
                proposals.insert(*key, proposal.clone());
            }
        } else {
            failures.push(UtxoError::Update(UpdateError::NonGenesisUpdate {
                keys: unknown,
            }));
        }
    }

    if !failures.is_empty() {
        tracing::debug!(failures = failures.len(), "rejected transaction");
        return Err(failures);
    }

    let outputs = Utxo::outputs_of(body).expect("outputs were checked strictly positive");
    let utxo = state.utxo.exclude_by_keys(body.inputs()).union_disjoint(&outputs);

    let deposited = total_deposits(&env.pparams, &env.stake_pools, body.certificates())
        .and_then(|deposits| {
            key_refunds(&env.pparams, body.certificates())
                .and_then(|refunds| state.deposited + deposits - refunds)
        });
    let (deposited, fees) = match (deposited, state.fees + body.fee()) {
        (Ok(deposited), Ok(fees)) => (deposited, fees),
        _ => return Err(vec![UtxoError::ValueOutOfBounds]),
    };

    tracing::trace!("accepted transaction");
    Ok(UtxoState {
        utxo,
        deposited,
        fees,
        proposals,
    })
}

/// Everything a transaction consumes: the spent outputs, the withdrawals,
/// the deposit refunds its certificates trigger, and the forge field.
fn consumed(env: &UtxoEnv, state: &UtxoState, body: &Body) -> Result<Value, UtxoError> {
    let spent = state
        .utxo
        .restrict_by_keys(body.inputs())
        .balance()
        .map_err(|_| UtxoError::ValueOutOfBounds)?;
    let withdrawals = body
        .withdrawals()
        .values()
        .copied()
        .fold(Ok(Coin::zero()), |total, withdrawal| total + withdrawal)
        .map_err(|_| UtxoError::ValueOutOfBounds)?;
    let refunds =
        key_refunds(&env.pparams, body.certificates()).map_err(|_| UtxoError::ValueOutOfBounds)?;

    ((spent + Value::from(withdrawals)) + Value::from(refunds) + body.forge().clone())
        .map_err(|_| UtxoError::ValueOutOfBounds)
}

/// Everything a transaction produces: the new outputs, the fee, and the
/// deposits its certificates reserve.
fn produced(env: &UtxoEnv, body: &Body) -> Result<Value, UtxoError> {
    let mut outputs = Value::zero();
    for output in body.outputs() {
        outputs = (outputs + output.value.clone()).map_err(|_| UtxoError::ValueOutOfBounds)?;
    }
    let deposits = total_deposits(&env.pparams, &env.stake_pools, body.certificates())
        .map_err(|_| UtxoError::ValueOutOfBounds)?;

    ((outputs + Value::from(body.fee())) + Value::from(deposits))
        .map_err(|_| UtxoError::ValueOutOfBounds)
}

/// The deposits a certificate sequence reserves: the key deposit per stake
/// registration, and the pool deposit per pool that is not already
/// registered. Re-registering a pool updates its parameters without
/// recharging the deposit.
pub fn total_deposits(
    pparams: &ProtocolParams,
    stake_pools: &BTreeSet<PoolKeyHash>,
    certificates: &[Certificate],
) -> amount::Result<Coin> {
    let mut total = Ok(Coin::zero());

    for certificate in certificates {
        if let Certificate::StakeRegistration(_) = certificate {
            total += pparams.key_deposit;
        }
    }

    let new_pools: BTreeSet<PoolKeyHash> = certificates
        .iter()
        .filter_map(|certificate| match certificate {
            Certificate::PoolRegistration(params)
                if !stake_pools.contains(&params.operator) =>
            {
                Some(params.operator)
            }
            _ => None,
        })
        .collect();
    for _ in &new_pools {
        total += pparams.pool_deposit;
    }

    total
}

/// The deposits a certificate sequence refunds: the key deposit per stake
/// deregistration. Pool deposits are refunded at the epoch boundary, not
/// here.
pub fn key_refunds(
    pparams: &ProtocolParams,
    certificates: &[Certificate],
) -> amount::Result<Coin> {
    let mut total = Ok(Coin::zero());

    for certificate in certificates {
        if let Certificate::StakeDeregistration(_) = certificate {
            total += pparams.key_deposit;
        }
    }

    total
}
