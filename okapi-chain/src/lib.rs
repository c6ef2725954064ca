//! Core Okapi ledger data structures.
//!
//! This crate provides definitions of the consensus-critical data structures
//! of the Okapi ledger: amounts and multi-asset values, addresses and
//! credentials, certificates, protocol parameters, transactions, and their
//! canonical serialization.
//!
//! The companion `okapi-ledger` crate implements the ledger state and the
//! transition rules over these structures.

#![warn(missing_docs)]

pub mod address;
pub mod amount;
pub mod certificate;
pub mod keys;
pub mod parameters;
pub mod primitives;
pub mod script;
pub mod serialization;
pub mod transaction;
pub mod value;
