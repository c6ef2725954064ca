//! The ledger transition rules.
//!
//! Every rule has the same shape: it takes an environment, a state, and a
//! transaction, and returns a fresh successor state or the list of
//! independent failures it found. A rejected transaction never changes the
//! state it was checked against.

mod delegs;
mod ledger;
mod pool;
mod utxo;
mod utxow;

pub use delegs::{apply_delegs, DelegsEnv};
pub use ledger::{apply_ledger, LedgerEnv};
pub use pool::{apply_pool, PoolEnv};
pub use utxo::{apply_utxo, key_refunds, total_deposits, UtxoEnv};
pub use utxow::apply_utxow;
