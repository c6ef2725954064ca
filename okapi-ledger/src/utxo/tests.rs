//! Tests for the UTxO relation algebra.

use std::collections::BTreeSet;

use color_eyre::eyre::Result;

use okapi_chain::{
    address::{Address, PaymentCredential, StakeReference},
    amount::Coin,
    keys::PaymentKeyHash,
    parameters::Network,
    serialization::{CanonicalDeserializeInto, CanonicalSerialize},
    transaction::{Hash, TxIn},
    value::CompactValue,
};

use super::*;

fn txin(byte: u8, index: u32) -> TxIn {
    TxIn {
        id: Hash([byte; 32]),
        index,
    }
}

fn output(byte: u8, coin: i64) -> UtxoOut {
    UtxoOut {
        address: Address::Shelley {
            network: Network::Mainnet,
            payment: PaymentCredential::Key(PaymentKeyHash([byte; 28])),
            stake: StakeReference::Null,
        },
        value: CompactValue::Coin(Coin::try_from(coin).expect("test coins are valid")),
    }
}

fn sample() -> Utxo {
    [
        (txin(1, 0), output(1, 100)),
        (txin(1, 1), output(2, 200)),
        (txin(2, 0), output(3, 300)),
    ]
    .into_iter()
    .collect()
}

#[test]
fn restrict_keeps_only_named_keys() {
    let utxo = sample();
    let keys: BTreeSet<TxIn> = [txin(1, 0), txin(2, 0), txin(9, 9)].into_iter().collect();

    let restricted = utxo.restrict_by_keys(&keys);

    assert_eq!(restricted.len(), 2);
    assert!(restricted.contains_key(&txin(1, 0)));
    assert!(restricted.contains_key(&txin(2, 0)));
    assert!(!restricted.contains_key(&txin(1, 1)));
}

#[test]
fn exclude_drops_named_keys() {
    let utxo = sample();
    let keys: BTreeSet<TxIn> = [txin(1, 0)].into_iter().collect();

    let excluded = utxo.exclude_by_keys(&keys);

    assert_eq!(excluded.len(), 2);
    assert!(!excluded.contains_key(&txin(1, 0)));

    // the original is untouched
    assert_eq!(utxo.len(), 3);
}

#[test]
fn restrict_by_range_matches_outputs() {
    let utxo = sample();

    let restricted = utxo.restrict_by_range(&[output(2, 200)]);

    assert_eq!(restricted.len(), 1);
    assert!(restricted.contains_key(&txin(1, 1)));
}

#[test]
fn union_is_left_biased() {
    let left = Utxo::singleton(txin(1, 0), output(1, 100));
    let right: Utxo = [
        (txin(1, 0), output(9, 999)),
        (txin(2, 0), output(2, 200)),
    ]
    .into_iter()
    .collect();

    let union = left.union(&right);
    assert_eq!(union.len(), 2);
    assert_eq!(union.get(&txin(1, 0)), Some(&output(1, 100)));

    let overridden = left.override_with(&right);
    assert_eq!(overridden.get(&txin(1, 0)), Some(&output(9, 999)));
}

#[test]
fn insert_if_absent_keeps_existing_entries() {
    let utxo = Utxo::singleton(txin(1, 0), output(1, 100));

    let unchanged = utxo.insert_if_absent(txin(1, 0), output(9, 999));
    assert_eq!(unchanged.get(&txin(1, 0)), Some(&output(1, 100)));

    let extended = utxo.insert_if_absent(txin(2, 0), output(2, 200));
    assert_eq!(extended.len(), 2);
}

#[test]
fn remove_produces_a_new_map() {
    let utxo = sample();

    let removed = utxo.remove(&txin(1, 0));

    assert_eq!(removed.len(), 2);
    assert_eq!(utxo.len(), 3);
}

#[test]
fn domain_and_range_agree_with_entries() {
    let utxo = sample();

    let domain = utxo.domain();
    assert_eq!(
        domain,
        [txin(1, 0), txin(1, 1), txin(2, 0)].into_iter().collect(),
    );
    assert_eq!(utxo.range().count(), 3);
}

#[test]
fn balance_sums_stored_values() -> Result<()> {
    let balance = sample().balance()?;

    assert_eq!(balance.coin(), 600);

    Ok(())
}

#[test]
#[should_panic(expected = "colliding transaction id")]
fn disjoint_union_panics_on_collision() {
    let left = Utxo::singleton(txin(1, 0), output(1, 100));
    let right = Utxo::singleton(txin(1, 0), output(2, 200));

    let _ = left.union_disjoint(&right);
}

#[test]
fn serialization_round_trips() -> Result<()> {
    let utxo = sample();

    let bytes = utxo.canonical_serialize_to_vec()?;
    let decoded: Utxo = bytes.as_slice().canonical_deserialize_into()?;

    assert_eq!(decoded, utxo);

    Ok(())
}
