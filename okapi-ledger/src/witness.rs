//! Required witness computation.
//!
//! Before checking any signature, the witnessing rule works out exactly
//! which key hashes must have signed and which script hashes must be
//! discharged, from the transaction and the outputs it spends.

use std::collections::{BTreeMap, BTreeSet};

use okapi_chain::{
    address::{PaymentCredential, StakeCredential},
    certificate::Certificate,
    keys::{GenesisKeyHash, WitnessKeyHash},
    script::ScriptHash,
    transaction::Transaction,
};

use crate::utxo::Utxo;

/// The key hashes that must witness a transaction.
///
/// These are the payment keys of every key-locked output being spent, the
/// staking keys of every key-controlled withdrawal account, the keys
/// certificates demand, and the delegates of every genesis key voting on a
/// parameter update.
///
/// Inputs missing from the UTxO contribute nothing; spending them is
/// rejected separately.
pub fn required_vkey_witnesses(
    tx: &Transaction,
    utxo: &Utxo,
    genesis_delegs: &BTreeMap<GenesisKeyHash, WitnessKeyHash>,
) -> BTreeSet<WitnessKeyHash> {
    let body = tx.body();
    let mut required = BTreeSet::new();

    for input in body.inputs() {
        if let Some(output) = utxo.get(input) {
            if let PaymentCredential::Key(hash) = output.address.payment_credential() {
                required.insert(hash.as_witness());
            }
        }
    }

    for account in body.withdrawals().keys() {
        if let StakeCredential::Key(hash) = account.credential {
            required.insert(hash.as_witness());
        }
    }

    for certificate in body.certificates() {
        match certificate {
            Certificate::StakeRegistration(_) => {}
            Certificate::StakeDeregistration(credential)
            | Certificate::StakeDelegation {
                delegator: credential,
                ..
            } => {
                if let StakeCredential::Key(hash) = credential {
                    required.insert(hash.as_witness());
                }
            }
            Certificate::PoolRegistration(params) => {
                required.insert(params.operator.as_witness());
                for owner in &params.owners {
                    required.insert(owner.as_witness());
                }
            }
            Certificate::PoolRetirement { pool, .. } => {
                required.insert(pool.as_witness());
            }
        }
    }

    if let Some(update) = body.update() {
        for genesis_key in update.proposals.keys() {
            if let Some(delegate) = genesis_delegs.get(genesis_key) {
                required.insert(*delegate);
            }
        }
    }

    required
}

/// The script hashes a transaction must provide witnesses for.
///
/// These are the payment scripts of every script-locked output being
/// spent, the staking scripts of every script-controlled withdrawal
/// account, the script credentials on deregistration and delegation
/// certificates, and the policy of every asset being forged.
pub fn scripts_needed(tx: &Transaction, utxo: &Utxo) -> BTreeSet<ScriptHash> {
    let body = tx.body();
    let mut needed = BTreeSet::new();

    for input in body.inputs() {
        if let Some(output) = utxo.get(input) {
            if let PaymentCredential::Script(hash) = output.address.payment_credential() {
                needed.insert(hash);
            }
        }
    }

    for account in body.withdrawals().keys() {
        if let StakeCredential::Script(hash) = account.credential {
            needed.insert(hash);
        }
    }

    for certificate in body.certificates() {
        if let Certificate::StakeDeregistration(StakeCredential::Script(hash))
        | Certificate::StakeDelegation {
            delegator: StakeCredential::Script(hash),
            ..
        } = certificate
        {
            needed.insert(*hash);
        }
    }

    needed.extend(body.forge().policies().copied());

    needed
}
