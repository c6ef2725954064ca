//! The Okapi ledger: state and transition rules.
//!
//! This crate decides whether a transaction may be applied to a ledger
//! state, and how the state transitions as a result. Validation is a pure
//! function: each rule takes an environment, an immutable state, and a
//! transaction, and returns either a fresh successor state or a list of
//! structured failures, leaving the input state untouched.
//!
//! The rules compose the way the states do: [`rules::apply_utxo`] governs
//! value flow through the UTxO, [`rules::apply_utxow`] wraps it with
//! witness checking, the delegation rules govern certificates and reward
//! accounts, and [`rules::apply_ledger`] runs the whole pipeline.

#![warn(missing_docs)]

pub mod error;
pub mod rules;
pub mod state;
pub mod utxo;
pub mod witness;

pub use error::{
    DelegError, DelegsError, DelplError, LedgerError, PoolError, UpdateError, UtxoError,
    UtxowError,
};
pub use rules::{apply_ledger, apply_utxo, apply_utxow};
pub use state::{AccountState, DelegationState, LedgerState, ProposedUpdates, UtxoState};
pub use utxo::{Utxo, UtxoOut};
