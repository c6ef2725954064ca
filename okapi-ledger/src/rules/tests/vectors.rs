//! Fixed scenarios for the ledger rules.

use std::collections::BTreeMap;

use color_eyre::eyre::Result;

use okapi_chain::{
    certificate::{Certificate, PoolParams, UnitInterval},
    keys::GenesisKeyHash,
    keys::WitnessKeyHash,
    parameters::{Epoch, ProtocolParamsUpdate, Update},
    script::MultiSig,
    transaction::Metadata,
};

use super::*;
use crate::{
    error::{
        DelegError, DelegsError, DelplError, LedgerError, PoolError, UpdateError, UtxoError,
        UtxowError,
    },
    rules::{apply_delegs, apply_ledger, apply_utxo, apply_utxow, DelegsEnv},
    state::{DelegationState, LedgerState},
};

#[test]
fn spending_a_missing_input_also_breaks_conservation() {
    // Alice tries to send 3000 to Bob with a fee of 1500, but spends an
    // output that does not exist.
    let (state, alice, bob) = scenario_state();
    let body = transfer_body(
        vec![genesis_txin(42)],
        vec![(address(&bob), 3_000), (address(&alice), 5_500)],
        1_500,
        10,
    );
    let tx = sign(body, &[&alice]);

    let failures = apply_utxo(&utxo_env(0), &state, &tx).unwrap_err();

    assert_eq!(
        failures,
        vec![
            UtxoError::BadInputs {
                missing: [genesis_txin(42)].into_iter().collect(),
            },
            UtxoError::ValueNotConserved {
                consumed: Value::zero(),
                produced: Value::from(coin(10_000)),
            },
        ],
    );
}

#[test]
fn fee_below_the_minimum_is_rejected() {
    let (state, alice, bob) = scenario_state();
    let body = transfer_body(
        vec![genesis_txin(0)],
        vec![(address(&bob), 3_000), (address(&alice), 6_999)],
        1,
        10,
    );
    let tx = sign(body, &[&alice]);

    let required = pparams().min_fee(tx.size());
    let failures = apply_utxo(&utxo_env(0), &state, &tx).unwrap_err();

    assert_eq!(
        failures,
        vec![UtxoError::FeeTooSmall {
            required,
            actual: coin(1),
        }],
    );
    assert!(required > coin(1));
}

#[test]
fn expired_transactions_are_rejected() {
    let (state, alice, bob) = scenario_state();
    let body = transfer_body(
        vec![genesis_txin(0)],
        vec![(address(&bob), 3_000), (address(&alice), 6_400)],
        600,
        0,
    );
    let tx = sign(body, &[&alice]);

    let failures = apply_utxo(&utxo_env(1), &state, &tx).unwrap_err();

    assert_eq!(
        failures,
        vec![UtxoError::Expired {
            ttl: Slot(0),
            slot: Slot(1),
        }],
    );
}

#[test]
fn outputs_below_the_minimum_are_rejected() {
    let (state, alice, bob) = scenario_state();
    let body = transfer_body(
        vec![genesis_txin(0)],
        vec![(address(&bob), 1), (address(&alice), 9_002)],
        997,
        10,
    );
    let tx = sign(body, &[&alice]);

    let failures = apply_utxo(&utxo_env(0), &state, &tx).unwrap_err();

    assert_eq!(
        failures,
        vec![UtxoError::OutputTooSmall {
            outputs: vec![TxOut {
                address: address(&bob),
                value: Value::from(coin(1)),
            }],
        }],
    );
}

#[test]
fn withdrawal_without_the_staking_key_is_rejected() {
    // Bob has 10 of rewards; Alice tries to pocket them without Bob's
    // staking key signature.
    let (utxo_state, alice, _bob) = scenario_state();
    let bob_stake = signing_key(3);
    let mut delegation_state = DelegationState::default();
    delegation_state
        .rewards
        .insert(reward_account(&bob_stake), coin(10));
    let state = LedgerState {
        utxo_state,
        delegation_state,
    };

    let body = Body::new(
        [genesis_txin(0)].into_iter().collect(),
        vec![TxOut {
            address: address(&alice),
            value: Value::from(coin(9_410)),
        }],
        Vec::new(),
        Value::zero(),
        [(reward_account(&bob_stake), coin(10))].into_iter().collect(),
        coin(600),
        Slot(10),
        None,
        None,
    );
    let tx = sign(body, &[&alice]);

    let failures = apply_ledger(&ledger_env(0), &state, &tx).unwrap_err();

    assert_eq!(
        failures,
        vec![LedgerError::Utxow(UtxowError::MissingVKeyWitnesses {
            missing: [staking_hash(&bob_stake).as_witness()].into_iter().collect(),
        })],
    );
}

#[test]
fn a_valid_transfer_moves_the_outputs() -> Result<()> {
    let (state, alice, bob) = scenario_state();
    let body = transfer_body(
        vec![genesis_txin(0)],
        vec![(address(&alice), 6_404), (address(&bob), 3_000)],
        596,
        10,
    );
    let tx = sign(body, &[&alice]);
    let id = tx.id();

    let next = apply_utxow(&utxo_env(0), &state, &tx).expect("transfer is valid");

    // the spent output is gone, the untouched one remains
    assert!(!next.utxo.contains_key(&genesis_txin(0)));
    assert!(next.utxo.contains_key(&genesis_txin(1)));

    // the new outputs are keyed by the transaction id and output index
    let first = next.utxo.get(&TxIn { id, index: 0 }).expect("output 0");
    assert_eq!(first.address, address(&alice));
    assert_eq!(first.value.coin(), coin(6_404));
    let second = next.utxo.get(&TxIn { id, index: 1 }).expect("output 1");
    assert_eq!(second.address, address(&bob));
    assert_eq!(second.value.coin(), coin(3_000));

    assert_eq!(next.fees, coin(596));
    assert_eq!(next.deposited, Coin::zero());

    Ok(())
}

#[test]
fn spending_the_same_output_twice_is_rejected() {
    let (state, alice, bob) = scenario_state();
    let body = transfer_body(
        vec![genesis_txin(0)],
        vec![(address(&alice), 6_404), (address(&bob), 3_000)],
        596,
        10,
    );
    let tx = sign(body, &[&alice]);

    let next = apply_utxow(&utxo_env(0), &state, &tx).expect("first spend is valid");
    let failures = apply_utxow(&utxo_env(0), &next, &tx).unwrap_err();

    assert!(matches!(
        failures.as_slice(),
        [UtxowError::Utxo(UtxoError::BadInputs { .. }), ..],
    ));
}

#[test]
fn an_invalid_signature_is_rejected() {
    let (state, alice, bob) = scenario_state();
    let body = transfer_body(
        vec![genesis_txin(0)],
        vec![(address(&bob), 3_000), (address(&alice), 6_400)],
        600,
        10,
    );
    // Alice signs the wrong body
    let decoy = transfer_body(
        vec![genesis_txin(0)],
        vec![(address(&bob), 3_000), (address(&alice), 6_400)],
        600,
        11,
    );
    let mut witnesses = WitnessSet::default();
    let bad_witness = VKeyWitness::sign(&alice, &decoy.id());
    witnesses.vkey_witnesses.insert(bad_witness);
    let tx = Transaction::new(body, witnesses, None);

    let failures = apply_utxow(&utxo_env(0), &state, &tx).unwrap_err();

    assert_eq!(
        failures,
        vec![UtxowError::InvalidWitnesses {
            witnesses: vec![bad_witness],
        }],
    );
}

#[test]
fn metadata_must_match_the_declared_hash() {
    let (state, alice, bob) = scenario_state();
    let metadata = Metadata(b"for the archive".to_vec());

    // declared but absent
    let body = Body::new(
        [genesis_txin(0)].into_iter().collect(),
        vec![TxOut {
            address: address(&bob),
            value: Value::from(coin(9_400)),
        }],
        Vec::new(),
        Value::zero(),
        BTreeMap::new(),
        coin(600),
        Slot(10),
        None,
        Some(metadata.hash()),
    );
    let tx = sign(body.clone(), &[&alice]);
    let failures = apply_utxow(&utxo_env(0), &state, &tx).unwrap_err();
    assert_eq!(
        failures,
        vec![UtxowError::MissingMetadata {
            declared: metadata.hash(),
        }],
    );

    // present but undeclared
    let undeclared = transfer_body(
        vec![genesis_txin(0)],
        vec![(address(&bob), 9_400)],
        600,
        10,
    );
    let id = undeclared.id();
    let mut witnesses = WitnessSet::default();
    witnesses.vkey_witnesses.insert(VKeyWitness::sign(&alice, &id));
    let tx = Transaction::new(undeclared, witnesses.clone(), Some(metadata.clone()));
    let failures = apply_utxow(&utxo_env(0), &state, &tx).unwrap_err();
    assert_eq!(
        failures,
        vec![UtxowError::MissingMetadataHash {
            actual: metadata.hash(),
        }],
    );

    // declared but conflicting
    let other = Metadata(b"something else".to_vec());
    let id = body.id();
    let mut witnesses = WitnessSet::default();
    witnesses.vkey_witnesses.insert(VKeyWitness::sign(&alice, &id));
    let tx = Transaction::new(body, witnesses, Some(other.clone()));
    let failures = apply_utxow(&utxo_env(0), &state, &tx).unwrap_err();
    assert_eq!(
        failures,
        vec![UtxowError::ConflictingMetadataHash {
            declared: metadata.hash(),
            actual: other.hash(),
        }],
    );
}

#[test]
fn spending_a_script_output_requires_the_script() -> Result<()> {
    let (_, alice, _bob) = scenario_state();
    let script = MultiSig::Signature(payment_hash(&alice).as_witness());
    let locked = script_address(script.hash());

    let state = UtxoState {
        utxo: utxo_of(&[(genesis_txin(7), &locked, 1_000)]),
        ..Default::default()
    };

    let body = transfer_body(vec![genesis_txin(7)], vec![(address(&alice), 700)], 300, 10);
    let id = body.id();

    // without the script, the spend is rejected
    let tx = sign(body.clone(), &[&alice]);
    let failures = apply_utxow(&utxo_env(0), &state, &tx).unwrap_err();
    assert_eq!(
        failures,
        vec![UtxowError::MissingScriptWitnesses {
            missing: [script.hash()].into_iter().collect(),
        }],
    );

    // with it, the spend goes through
    let mut witnesses = WitnessSet::default();
    witnesses.vkey_witnesses.insert(VKeyWitness::sign(&alice, &id));
    witnesses.insert_script(script);
    let tx = Transaction::new(body, witnesses, None);
    let next = apply_utxow(&utxo_env(0), &state, &tx).expect("script discharges the lock");
    assert!(next.utxo.contains_key(&TxIn { id, index: 0 }));

    Ok(())
}

#[test]
fn unneeded_script_witnesses_are_rejected() {
    let (state, alice, bob) = scenario_state();
    let body = transfer_body(
        vec![genesis_txin(0)],
        vec![(address(&bob), 9_400)],
        600,
        10,
    );
    let id = body.id();
    let script = MultiSig::Signature(payment_hash(&alice).as_witness());

    let mut witnesses = WitnessSet::default();
    witnesses.vkey_witnesses.insert(VKeyWitness::sign(&alice, &id));
    witnesses.insert_script(script.clone());
    let tx = Transaction::new(body, witnesses, None);

    let failures = apply_utxow(&utxo_env(0), &state, &tx).unwrap_err();

    assert_eq!(
        failures,
        vec![UtxowError::ExtraneousScriptWitnesses {
            extra: [script.hash()].into_iter().collect(),
        }],
    );
}

#[test]
fn forging_requires_a_validating_policy_script() -> Result<()> {
    let (state, alice, _bob) = scenario_state();
    let policy = MultiSig::Signature(payment_hash(&alice).as_witness());
    let gold = okapi_chain::value::AssetName::new(b"gold".to_vec()).expect("short name");
    let forged = Value::from_asset(policy.hash(), gold.clone(), 5);

    let body = Body::new(
        [genesis_txin(0)].into_iter().collect(),
        vec![TxOut {
            address: address(&alice),
            value: (Value::from(coin(9_400)) + forged.clone()).expect("no overflow"),
        }],
        Vec::new(),
        forged.clone(),
        BTreeMap::new(),
        coin(600),
        Slot(10),
        None,
        None,
    );
    let id = body.id();

    let mut witnesses = WitnessSet::default();
    witnesses.vkey_witnesses.insert(VKeyWitness::sign(&alice, &id));
    witnesses.insert_script(policy.clone());
    let tx = Transaction::new(body, witnesses, None);

    let next = apply_utxow(&utxo_env(0), &state, &tx).expect("forge is authorized");
    let minted = next.utxo.get(&TxIn { id, index: 0 }).expect("new output");
    assert_eq!(minted.value.value().quantity(&policy.hash(), &gold), 5);

    Ok(())
}

#[test]
fn a_policy_script_that_does_not_validate_is_rejected() {
    let (state, alice, bob) = scenario_state();
    // the policy demands Bob's key, but only Alice signs
    let policy = MultiSig::Signature(payment_hash(&bob).as_witness());
    let gold = okapi_chain::value::AssetName::new(b"gold".to_vec()).expect("short name");
    let forged = Value::from_asset(policy.hash(), gold, 5);

    let body = Body::new(
        [genesis_txin(0)].into_iter().collect(),
        vec![TxOut {
            address: address(&alice),
            value: (Value::from(coin(9_400)) + forged.clone()).expect("no overflow"),
        }],
        Vec::new(),
        forged,
        BTreeMap::new(),
        coin(600),
        Slot(10),
        None,
        None,
    );
    let id = body.id();

    let mut witnesses = WitnessSet::default();
    witnesses.vkey_witnesses.insert(VKeyWitness::sign(&alice, &id));
    witnesses.insert_script(policy.clone());
    let tx = Transaction::new(body, witnesses, None);

    let failures = apply_utxow(&utxo_env(0), &state, &tx).unwrap_err();

    assert_eq!(
        failures,
        vec![UtxowError::ScriptWitnessNotValidating {
            failed: [policy.hash()].into_iter().collect(),
        }],
    );
}

#[test]
fn forging_the_base_asset_is_rejected() {
    let (state, alice, _bob) = scenario_state();
    let body = Body::new(
        [genesis_txin(0)].into_iter().collect(),
        vec![TxOut {
            address: address(&alice),
            value: Value::from(coin(9_500)),
        }],
        Vec::new(),
        Value::from(coin(100)),
        BTreeMap::new(),
        coin(600),
        Slot(10),
        None,
        None,
    );
    let tx = sign(body, &[&alice]);

    let failures = apply_utxo(&utxo_env(0), &state, &tx).unwrap_err();

    assert!(failures.contains(&UtxoError::ForgesBaseAsset));
}

#[test]
fn registering_a_stake_key_reserves_the_deposit() -> Result<()> {
    let (utxo_state, alice, _bob) = scenario_state();
    let bob_stake = signing_key(3);
    let state = LedgerState {
        utxo_state,
        delegation_state: DelegationState::default(),
    };

    let body = Body::new(
        [genesis_txin(0)].into_iter().collect(),
        vec![TxOut {
            address: address(&alice),
            value: Value::from(coin(9_300)),
        }],
        vec![Certificate::StakeRegistration(stake_credential(&bob_stake))],
        Value::zero(),
        BTreeMap::new(),
        coin(600),
        Slot(10),
        None,
        None,
    );
    // registration needs no witness from the registered key
    let tx = sign(body, &[&alice]);

    let next = apply_ledger(&ledger_env(0), &state, &tx).expect("registration is valid");

    assert_eq!(next.utxo_state.deposited, coin(100));
    assert_eq!(
        next.delegation_state.rewards.get(&reward_account(&bob_stake)),
        Some(&Coin::zero()),
    );

    Ok(())
}

#[test]
fn registering_twice_is_rejected() {
    let (utxo_state, alice, _bob) = scenario_state();
    let bob_stake = signing_key(3);
    let mut delegation_state = DelegationState::default();
    delegation_state
        .rewards
        .insert(reward_account(&bob_stake), Coin::zero());
    let state = LedgerState {
        utxo_state,
        delegation_state,
    };

    let body = Body::new(
        [genesis_txin(0)].into_iter().collect(),
        vec![TxOut {
            address: address(&alice),
            value: Value::from(coin(9_300)),
        }],
        vec![Certificate::StakeRegistration(stake_credential(&bob_stake))],
        Value::zero(),
        BTreeMap::new(),
        coin(600),
        Slot(10),
        None,
        None,
    );
    let tx = sign(body, &[&alice]);

    let failures = apply_ledger(&ledger_env(0), &state, &tx).unwrap_err();

    assert_eq!(
        failures,
        vec![LedgerError::Delegs(DelegsError::Delpl(DelplError::Deleg(
            DelegError::StakeKeyAlreadyRegistered(stake_credential(&bob_stake)),
        )))],
    );
}

#[test]
fn deregistration_refunds_the_deposit() -> Result<()> {
    let (mut utxo_state, alice, _bob) = scenario_state();
    utxo_state.deposited = coin(100);
    let bob_stake = signing_key(3);
    let mut delegation_state = DelegationState::default();
    delegation_state
        .rewards
        .insert(reward_account(&bob_stake), Coin::zero());
    let state = LedgerState {
        utxo_state,
        delegation_state,
    };

    // the refund flows into the outputs: 10000 + 100 - 600 fee
    let body = Body::new(
        [genesis_txin(0)].into_iter().collect(),
        vec![TxOut {
            address: address(&alice),
            value: Value::from(coin(9_500)),
        }],
        vec![Certificate::StakeDeregistration(stake_credential(&bob_stake))],
        Value::zero(),
        BTreeMap::new(),
        coin(600),
        Slot(10),
        None,
        None,
    );
    let tx = sign(body, &[&alice, &bob_stake]);

    let next = apply_ledger(&ledger_env(0), &state, &tx).expect("deregistration is valid");

    assert_eq!(next.utxo_state.deposited, Coin::zero());
    assert!(next
        .delegation_state
        .rewards
        .get(&reward_account(&bob_stake))
        .is_none());

    Ok(())
}

#[test]
fn deregistration_requires_an_empty_reward_account() {
    let (mut utxo_state, alice, _bob) = scenario_state();
    utxo_state.deposited = coin(100);
    let bob_stake = signing_key(3);
    let mut delegation_state = DelegationState::default();
    delegation_state
        .rewards
        .insert(reward_account(&bob_stake), coin(7));
    let state = LedgerState {
        utxo_state,
        delegation_state,
    };

    let body = Body::new(
        [genesis_txin(0)].into_iter().collect(),
        vec![TxOut {
            address: address(&alice),
            value: Value::from(coin(9_500)),
        }],
        vec![Certificate::StakeDeregistration(stake_credential(&bob_stake))],
        Value::zero(),
        BTreeMap::new(),
        coin(600),
        Slot(10),
        None,
        None,
    );
    let tx = sign(body, &[&alice, &bob_stake]);

    let failures = apply_ledger(&ledger_env(0), &state, &tx).unwrap_err();

    assert_eq!(
        failures,
        vec![LedgerError::Delegs(DelegsError::Delpl(DelplError::Deleg(
            DelegError::RewardAccountNotEmpty {
                account: reward_account(&bob_stake),
                balance: coin(7),
            },
        )))],
    );
}

#[test]
fn withdrawals_must_drain_accounts_exactly() {
    let (_, _alice, _bob) = scenario_state();
    let bob_stake = signing_key(3);
    let mut state = DelegationState::default();
    state.rewards.insert(reward_account(&bob_stake), coin(10));

    let body = Body::new(
        [genesis_txin(0)].into_iter().collect(),
        vec![],
        vec![],
        Value::zero(),
        [(reward_account(&bob_stake), coin(5))].into_iter().collect(),
        coin(600),
        Slot(10),
        None,
        None,
    );
    let tx = sign(body, &[&bob_stake]);

    let env = DelegsEnv {
        slot: Slot(0),
        network: Network::Mainnet,
        pparams: pparams(),
    };
    let failures = apply_delegs(&env, &state, &tx).unwrap_err();

    assert_eq!(
        failures,
        vec![DelegsError::WithdrawalsNotInRewards {
            mismatch: [(reward_account(&bob_stake), coin(5))].into_iter().collect(),
        }],
    );
}

#[test]
fn withdrawing_then_deregistering_in_one_transaction_works() -> Result<()> {
    let bob_stake = signing_key(3);
    let mut state = DelegationState::default();
    state.rewards.insert(reward_account(&bob_stake), coin(10));

    let body = Body::new(
        [genesis_txin(0)].into_iter().collect(),
        vec![],
        vec![Certificate::StakeDeregistration(stake_credential(&bob_stake))],
        Value::zero(),
        [(reward_account(&bob_stake), coin(10))].into_iter().collect(),
        coin(600),
        Slot(10),
        None,
        None,
    );
    let tx = sign(body, &[&bob_stake]);

    let env = DelegsEnv {
        slot: Slot(0),
        network: Network::Mainnet,
        pparams: pparams(),
    };
    let next = apply_delegs(&env, &state, &tx).expect("withdraw-then-deregister is valid");

    assert!(next.rewards.get(&reward_account(&bob_stake)).is_none());

    Ok(())
}

fn pool_params(cold: &ed25519::SigningKey, owner: &ed25519::SigningKey) -> PoolParams {
    PoolParams {
        operator: okapi_chain::keys::PoolKeyHash::of(&vkey_bytes(cold)),
        pledge: coin(1_000),
        cost: coin(100),
        margin: UnitInterval {
            numerator: 1,
            denominator: 2,
        },
        reward_account: reward_account(owner),
        owners: [staking_hash(owner)].into_iter().collect(),
    }
}

#[test]
fn registering_a_pool_charges_the_deposit_once() -> Result<()> {
    let (utxo_state, alice, _bob) = scenario_state();
    let cold = signing_key(5);
    let owner = signing_key(6);
    let state = LedgerState {
        utxo_state,
        delegation_state: DelegationState::default(),
    };

    let params = pool_params(&cold, &owner);
    let body = Body::new(
        [genesis_txin(0)].into_iter().collect(),
        vec![TxOut {
            address: address(&alice),
            value: Value::from(coin(9_150)),
        }],
        vec![Certificate::PoolRegistration(params.clone())],
        Value::zero(),
        BTreeMap::new(),
        coin(600),
        Slot(10),
        None,
        None,
    );
    // pool registration needs the cold key and every owner key
    let tx = sign(body, &[&alice, &cold, &owner]);

    let next = apply_ledger(&ledger_env(0), &state, &tx).expect("registration is valid");

    assert_eq!(next.utxo_state.deposited, coin(250));
    assert_eq!(
        next.delegation_state.stake_pools.get(&params.operator),
        Some(&params),
    );
    assert_eq!(
        next.delegation_state.pool_deposits.get(&params.operator),
        Some(&coin(250)),
    );

    // re-registration updates parameters without recharging the deposit
    let updated = PoolParams {
        cost: coin(150),
        ..params.clone()
    };
    let body = Body::new(
        [TxIn {
            id: tx.id(),
            index: 0,
        }]
        .into_iter()
        .collect(),
        vec![TxOut {
            address: address(&alice),
            value: Value::from(coin(8_550)),
        }],
        vec![Certificate::PoolRegistration(updated.clone())],
        Value::zero(),
        BTreeMap::new(),
        coin(600),
        Slot(10),
        None,
        None,
    );
    let tx = sign(body, &[&alice, &cold, &owner]);

    let next = apply_ledger(&ledger_env(0), &next, &tx).expect("re-registration is valid");

    assert_eq!(next.utxo_state.deposited, coin(250));
    assert_eq!(
        next.delegation_state.stake_pools.get(&params.operator),
        Some(&updated),
    );

    Ok(())
}

#[test]
fn pool_cost_below_the_floor_is_rejected() {
    let (utxo_state, alice, _bob) = scenario_state();
    let cold = signing_key(5);
    let owner = signing_key(6);
    let state = LedgerState {
        utxo_state,
        delegation_state: DelegationState::default(),
    };

    let params = PoolParams {
        cost: coin(99),
        ..pool_params(&cold, &owner)
    };
    let body = Body::new(
        [genesis_txin(0)].into_iter().collect(),
        vec![TxOut {
            address: address(&alice),
            value: Value::from(coin(9_150)),
        }],
        vec![Certificate::PoolRegistration(params)],
        Value::zero(),
        BTreeMap::new(),
        coin(600),
        Slot(10),
        None,
        None,
    );
    let tx = sign(body, &[&alice, &cold, &owner]);

    let failures = apply_ledger(&ledger_env(0), &state, &tx).unwrap_err();

    assert_eq!(
        failures,
        vec![LedgerError::Delegs(DelegsError::Delpl(DelplError::Pool(
            PoolError::StakePoolCostTooLow {
                cost: coin(99),
                minimum: coin(100),
            },
        )))],
    );
}

#[test]
fn pool_margin_must_be_a_unit_fraction() {
    let cold = signing_key(5);
    let owner = signing_key(6);
    let margin = UnitInterval {
        numerator: 3,
        denominator: 2,
    };
    let params = PoolParams {
        margin,
        ..pool_params(&cold, &owner)
    };

    let env = crate::rules::PoolEnv {
        slot: Slot(0),
        pparams: pparams(),
    };
    let result = crate::rules::apply_pool(
        &env,
        &DelegationState::default(),
        &Certificate::PoolRegistration(params),
    );

    assert_eq!(result.unwrap_err(), PoolError::InvalidMargin(margin));
}

#[test]
fn retirement_must_land_in_the_allowed_window() {
    let cold = signing_key(5);
    let owner = signing_key(6);
    let params = pool_params(&cold, &owner);
    let mut state = DelegationState::default();
    state.stake_pools.insert(params.operator, params.clone());

    let env = crate::rules::PoolEnv {
        slot: Slot(0),
        pparams: pparams(),
    };

    // the current epoch itself is too early
    let result = crate::rules::apply_pool(
        &env,
        &state,
        &Certificate::PoolRetirement {
            pool: params.operator,
            epoch: Epoch(0),
        },
    );
    assert_eq!(
        result.unwrap_err(),
        PoolError::WrongRetirementEpoch {
            earliest: Epoch(1),
            latest: Epoch(18),
            given: Epoch(0),
        },
    );

    // beyond the horizon is too late
    let result = crate::rules::apply_pool(
        &env,
        &state,
        &Certificate::PoolRetirement {
            pool: params.operator,
            epoch: Epoch(19),
        },
    );
    assert!(result.is_err());

    // inside the window it is recorded
    let next = crate::rules::apply_pool(
        &env,
        &state,
        &Certificate::PoolRetirement {
            pool: params.operator,
            epoch: Epoch(5),
        },
    )
    .expect("retirement inside the window is valid");
    assert_eq!(next.retiring.get(&params.operator), Some(&Epoch(5)));
}

#[test]
fn retiring_an_unknown_pool_is_rejected() {
    let cold = signing_key(5);
    let pool = okapi_chain::keys::PoolKeyHash::of(&vkey_bytes(&cold));

    let env = crate::rules::PoolEnv {
        slot: Slot(0),
        pparams: pparams(),
    };
    let result = crate::rules::apply_pool(
        &env,
        &DelegationState::default(),
        &Certificate::PoolRetirement {
            pool,
            epoch: Epoch(1),
        },
    );

    assert_eq!(result.unwrap_err(), PoolError::StakePoolNotRegistered(pool));
}

#[test]
fn delegation_requires_both_registrations() {
    let bob_stake = signing_key(3);
    let cold = signing_key(5);
    let owner = signing_key(6);
    let params = pool_params(&cold, &owner);

    let env = DelegsEnv {
        slot: Slot(0),
        network: Network::Mainnet,
        pparams: pparams(),
    };

    // unregistered delegator
    let mut state = DelegationState::default();
    state.stake_pools.insert(params.operator, params.clone());
    let body = Body::new(
        [genesis_txin(0)].into_iter().collect(),
        vec![],
        vec![Certificate::StakeDelegation {
            delegator: stake_credential(&bob_stake),
            pool: params.operator,
        }],
        Value::zero(),
        BTreeMap::new(),
        coin(600),
        Slot(10),
        None,
        None,
    );
    let tx = sign(body, &[&bob_stake]);
    let failures = apply_delegs(&env, &state, &tx).unwrap_err();
    assert_eq!(
        failures,
        vec![DelegsError::Delpl(DelplError::Deleg(
            DelegError::StakeKeyNotRegistered(stake_credential(&bob_stake)),
        ))],
    );

    // unregistered pool
    let mut state = DelegationState::default();
    state
        .rewards
        .insert(reward_account(&bob_stake), Coin::zero());
    let failures = apply_delegs(&env, &state, &tx).unwrap_err();
    assert_eq!(
        failures,
        vec![DelegsError::Delpl(DelplError::Deleg(
            DelegError::StakeDelegationImpossible {
                delegator: stake_credential(&bob_stake),
                pool: params.operator,
            },
        ))],
    );

    // both registered
    let mut state = DelegationState::default();
    state
        .rewards
        .insert(reward_account(&bob_stake), Coin::zero());
    state.stake_pools.insert(params.operator, params.clone());
    let next = apply_delegs(&env, &state, &tx).expect("delegation is valid");
    assert_eq!(
        next.delegations.get(&stake_credential(&bob_stake)),
        Some(&params.operator),
    );
}

#[test]
fn parameter_updates_need_a_genesis_vote_and_its_delegate() -> Result<()> {
    let (mut utxo_state, alice, _bob) = scenario_state();
    utxo_state.proposals = BTreeMap::new();
    let delegate = signing_key(9);
    let genesis_key = GenesisKeyHash([3; 28]);
    let mut delegation_state = DelegationState::default();
    delegation_state
        .genesis_delegs
        .insert(genesis_key, WitnessKeyHash::of(&vkey_bytes(&delegate)));
    let state = LedgerState {
        utxo_state,
        delegation_state,
    };

    let proposal = ProtocolParamsUpdate {
        min_fee_b: Some(2),
        ..Default::default()
    };
    let update = Update {
        proposals: [(genesis_key, proposal.clone())].into_iter().collect(),
        epoch: Epoch(1),
    };
    let body = Body::new(
        [genesis_txin(0)].into_iter().collect(),
        vec![TxOut {
            address: address(&alice),
            value: Value::from(coin(9_400)),
        }],
        vec![],
        Value::zero(),
        BTreeMap::new(),
        coin(600),
        Slot(10),
        Some(update.clone()),
        None,
    );

    // without the delegate's signature the update is unauthorized
    let tx = sign(body.clone(), &[&alice]);
    let failures = apply_ledger(&ledger_env(0), &state, &tx).unwrap_err();
    assert_eq!(
        failures,
        vec![LedgerError::Utxow(UtxowError::MissingVKeyWitnesses {
            missing: [WitnessKeyHash::of(&vkey_bytes(&delegate))]
                .into_iter()
                .collect(),
        })],
    );

    // with it, the proposal lands in the pending set
    let tx = sign(body, &[&alice, &delegate]);
    let next = apply_ledger(&ledger_env(0), &state, &tx).expect("update is valid");
    assert_eq!(
        next.utxo_state.proposals.get(&genesis_key),
        Some(&proposal),
    );

    Ok(())
}

#[test]
fn updates_from_non_genesis_keys_are_rejected() {
    let (state, alice, _bob) = scenario_state();
    let rogue = GenesisKeyHash([8; 28]);

    let update = Update {
        proposals: [(rogue, ProtocolParamsUpdate::default())].into_iter().collect(),
        epoch: Epoch(1),
    };
    let body = Body::new(
        [genesis_txin(0)].into_iter().collect(),
        vec![TxOut {
            address: address(&alice),
            value: Value::from(coin(9_400)),
        }],
        vec![],
        Value::zero(),
        BTreeMap::new(),
        coin(600),
        Slot(10),
        Some(update),
        None,
    );
    let tx = sign(body, &[&alice]);

    let failures = apply_utxo(&utxo_env(0), &state, &tx).unwrap_err();

    assert_eq!(
        failures,
        vec![UtxoError::Update(UpdateError::NonGenesisUpdate {
            keys: [rogue].into_iter().collect(),
        })],
    );
}

#[test]
fn outputs_on_the_wrong_network_are_rejected() {
    let (state, alice, bob) = scenario_state();
    let foreign = Address::Shelley {
        network: Network::Testnet,
        payment: PaymentCredential::Key(payment_hash(&bob)),
        stake: StakeReference::Null,
    };

    let body = transfer_body(
        vec![genesis_txin(0)],
        vec![(foreign.clone(), 9_400)],
        600,
        10,
    );
    let tx = sign(body, &[&alice]);

    let failures = apply_utxo(&utxo_env(0), &state, &tx).unwrap_err();

    assert_eq!(
        failures,
        vec![UtxoError::WrongNetwork {
            addresses: vec![foreign],
        }],
    );
}

#[test]
fn an_empty_input_set_is_rejected() {
    let (state, _alice, bob) = scenario_state();
    let body = transfer_body(vec![], vec![(address(&bob), 1_000)], 600, 10);
    let tx = sign(body, &[]);

    let failures = apply_utxo(&utxo_env(0), &state, &tx).unwrap_err();

    assert!(matches!(failures[0], UtxoError::InputSetEmpty));
}

#[test]
fn oversized_transactions_are_rejected() {
    let (state, alice, bob) = scenario_state();
    let mut env = utxo_env(0);
    env.pparams.max_tx_size = 32;

    let body = transfer_body(
        vec![genesis_txin(0)],
        vec![(address(&bob), 9_000)],
        1_000,
        10,
    );
    let tx = sign(body, &[&alice]);

    let failures = apply_utxo(&env, &state, &tx).unwrap_err();

    assert!(failures
        .iter()
        .any(|failure| matches!(failure, UtxoError::MaxTxSizeExceeded { max: 32, .. })));
}
