//! The witnessing rule.
//!
//! Wraps the UTxO rule with signature, witness-sufficiency, metadata, and
//! script checks. Witness checks run against the pre-state's UTxO, since
//! that is where the spent outputs' credentials live.

use std::collections::BTreeSet;

use okapi_chain::{script::ScriptHash, transaction::Transaction};

use crate::{
    error::UtxowError,
    state::UtxoState,
    witness::{required_vkey_witnesses, scripts_needed},
};

use super::utxo::{apply_utxo, UtxoEnv};

/// Apply the witnessing rule, then the UTxO rule.
#[tracing::instrument(level = "debug", skip_all, fields(tx = %tx.id()))]
pub fn apply_utxow(
    env: &UtxoEnv,
    state: &UtxoState,
    tx: &Transaction,
) -> Result<UtxoState, Vec<UtxowError>> {
    let body_hash = tx.id();
    let witnesses = tx.witnesses();
    let mut failures = Vec::new();

    let invalid: Vec<_> = witnesses
        .vkey_witnesses
        .iter()
        .filter(|witness| witness.verify(&body_hash).is_err())
        .copied()
        .collect();
    let any_bad_bootstrap = witnesses
        .bootstrap_witnesses
        .iter()
        .any(|witness| witness.verify(&body_hash).is_err());
    if !invalid.is_empty() || any_bad_bootstrap {
        failures.push(UtxowError::InvalidWitnesses { witnesses: invalid });
    }

    let provided = witnesses.key_hashes();
    let required = required_vkey_witnesses(tx, &state.utxo, &env.genesis_delegs);
    let missing: BTreeSet<_> = required.difference(&provided).copied().collect();
    if !missing.is_empty() {
        failures.push(UtxowError::MissingVKeyWitnesses { missing });
    }

    match (tx.body().metadata_hash(), tx.metadata()) {
        (None, None) => {}
        (Some(declared), None) => {
            failures.push(UtxowError::MissingMetadata {
                declared: *declared,
            });
        }
        (None, Some(metadata)) => {
            failures.push(UtxowError::MissingMetadataHash {
                actual: metadata.hash(),
            });
        }
        (Some(declared), Some(metadata)) => {
            let actual = metadata.hash();
            if actual != *declared {
                failures.push(UtxowError::ConflictingMetadataHash {
                    declared: *declared,
                    actual,
                });
            }
        }
    }

    let needed = scripts_needed(tx, &state.utxo);
    let provided_scripts: BTreeSet<ScriptHash> =
        witnesses.scripts.values().map(|script| script.hash()).collect();
    let missing_scripts: BTreeSet<_> = needed.difference(&provided_scripts).copied().collect();
    let extra_scripts: BTreeSet<_> = provided_scripts.difference(&needed).copied().collect();
    if !missing_scripts.is_empty() {
        failures.push(UtxowError::MissingScriptWitnesses {
            missing: missing_scripts,
        });
    }
    if !extra_scripts.is_empty() {
        failures.push(UtxowError::ExtraneousScriptWitnesses {
            extra: extra_scripts,
        });
    }
    if needed == provided_scripts {
        // evaluation only makes sense once the provided set is exactly the
        // needed set
        let failed: BTreeSet<ScriptHash> = witnesses
            .scripts
            .values()
            .filter(|script| !script.evaluate(&provided))
            .map(|script| script.hash())
            .collect();
        if !failed.is_empty() {
            failures.push(UtxowError::ScriptWitnessNotValidating { failed });
        }
    }

    if !failures.is_empty() {
        tracing::debug!(failures = failures.len(), "rejected transaction");
        return Err(failures);
    }

    apply_utxo(env, state, tx)
        .map_err(|failures| failures.into_iter().map(UtxowError::Utxo).collect())
}
