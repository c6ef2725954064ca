//! Property-based tests for the universal transition invariants.

use proptest::prelude::*;

use okapi_chain::transaction::VKeyWitness;

use super::*;
use crate::{error::UtxowError, rules::apply_utxow};

/// A strategy for valid transfers out of the standard scenario state:
/// Alice splits her 10000 between Bob, her own change, and the fee.
fn valid_transfer() -> impl Strategy<Value = (i64, i64)> {
    // send amount and fee; the fee clears the minimum even with an extra
    // witness attached, and the change stays above the output minimum
    (100i64..=5_000, 350i64..=500)
}

proptest! {
    #[test]
    fn accepted_transfers_conserve_value((send, fee) in valid_transfer()) {
        let (state, alice, bob) = scenario_state();
        let change = 10_000 - send - fee;
        let body = transfer_body(
            vec![genesis_txin(0)],
            vec![(address(&bob), send), (address(&alice), change)],
            fee,
            10,
        );
        let tx = sign(body, &[&alice]);

        let next = apply_utxow(&utxo_env(0), &state, &tx).expect("transfer is valid");

        // conservation: utxo balance plus fees plus deposits is unchanged
        let before = (state.utxo.balance().unwrap()
            + Value::from(state.fees)
            + Value::from(state.deposited))
        .unwrap();
        let after = (next.utxo.balance().unwrap()
            + Value::from(next.fees)
            + Value::from(next.deposited))
        .unwrap();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn accepted_transfers_preserve_outputs_and_eliminate_inputs(
        (send, fee) in valid_transfer(),
    ) {
        let (state, alice, bob) = scenario_state();
        let change = 10_000 - send - fee;
        let body = transfer_body(
            vec![genesis_txin(0)],
            vec![(address(&bob), send), (address(&alice), change)],
            fee,
            10,
        );
        let tx = sign(body, &[&alice]);
        let id = tx.id();

        let next = apply_utxow(&utxo_env(0), &state, &tx).expect("transfer is valid");

        // every output of the transaction is in the new UTxO
        for index in 0..tx.body().outputs().len() as u32 {
            let tx_in = TxIn { id, index };
            prop_assert!(next.utxo.contains_key(&tx_in));
        }

        // no input of the transaction survives
        for input in tx.body().inputs() {
            prop_assert!(!next.utxo.contains_key(input));
        }

        // no pre-existing entry shares the new transaction's id
        for (input, _) in state.utxo.iter() {
            prop_assert!(input.id != id);
        }

        // every stored value stays strictly positive
        for (_, output) in next.utxo.iter() {
            prop_assert!(output.value.value().is_positive());
        }
    }

    #[test]
    fn rejection_leaves_the_state_usable((send, _fee) in valid_transfer()) {
        let (state, alice, bob) = scenario_state();
        // fee of 1 is always below the minimum
        let change = 10_000 - send - 1;
        let body = transfer_body(
            vec![genesis_txin(0)],
            vec![(address(&bob), send), (address(&alice), change)],
            1,
            10,
        );
        let tx = sign(body, &[&alice]);

        let before = state.clone();
        let result = apply_utxow(&utxo_env(0), &state, &tx);

        prop_assert!(result.is_err());
        // the pre-state is untouched, and still accepts a valid spend
        prop_assert_eq!(&state, &before);
        let fee = 400;
        let retry = transfer_body(
            vec![genesis_txin(0)],
            vec![(address(&bob), send), (address(&alice), 10_000 - send - fee)],
            fee,
            10,
        );
        let retry = sign(retry, &[&alice]);
        prop_assert!(apply_utxow(&utxo_env(0), &state, &retry).is_ok());
    }

    #[test]
    fn witnesses_are_necessary_and_redundant_ones_are_harmless(
        (send, fee) in valid_transfer(),
    ) {
        let (state, alice, bob) = scenario_state();
        let change = 10_000 - send - fee;
        let body = transfer_body(
            vec![genesis_txin(0)],
            vec![(address(&bob), send), (address(&alice), change)],
            fee,
            10,
        );
        let id = body.id();

        // unsigned: rejected for the missing witness
        let unsigned = Transaction::new(body.clone(), WitnessSet::default(), None);
        let failures = apply_utxow(&utxo_env(0), &state, &unsigned).unwrap_err();
        let is_missing_vkey_witnesses = matches!(
            failures.as_slice(),
            [UtxowError::MissingVKeyWitnesses { .. }],
        );
        prop_assert!(is_missing_vkey_witnesses);

        // signed, with a redundant valid witness from Bob: accepted
        let mut witnesses = WitnessSet::default();
        witnesses.vkey_witnesses.insert(VKeyWitness::sign(&alice, &id));
        witnesses.vkey_witnesses.insert(VKeyWitness::sign(&bob, &id));
        let signed = Transaction::new(body, witnesses, None);
        prop_assert!(apply_utxow(&utxo_env(0), &state, &signed).is_ok());
    }

    #[test]
    fn accepted_transfers_cannot_be_replayed((send, fee) in valid_transfer()) {
        let (state, alice, bob) = scenario_state();
        let change = 10_000 - send - fee;
        let body = transfer_body(
            vec![genesis_txin(0)],
            vec![(address(&bob), send), (address(&alice), change)],
            fee,
            10,
        );
        let tx = sign(body, &[&alice]);

        let next = apply_utxow(&utxo_env(0), &state, &tx).expect("transfer is valid");
        let replay = apply_utxow(&utxo_env(0), &next, &tx);

        prop_assert!(replay.is_err());
    }
}
