//! Consensus-critical serialization.
//!
//! This module contains four traits: `CanonicalSerialize` and
//! `CanonicalDeserialize`, analogs of the Serde `Serialize` and `Deserialize`
//! traits but intended for the consensus-critical Okapi wire format, and
//! `WriteLedgerExt` and `ReadLedgerExt`, extension traits for `io::Write` and
//! `io::Read` with utility functions for the canonical integer and byte-array
//! encodings.
//!
//! The format is canonical: every value has exactly one encoding. Integers
//! use the shortest compact form, maps and sets are written with strictly
//! ascending keys, and optional fields use a single presence byte. The
//! deserializers reject any non-canonical input, so `encode(decode(b)) = b`
//! holds for every well-formed `b`.

mod canonical_deserialize;
mod canonical_serialize;
mod error;
mod read_ext;
mod write_ext;

pub use canonical_deserialize::{CanonicalDeserialize, CanonicalDeserializeInto};
pub use canonical_serialize::CanonicalSerialize;
pub use error::SerializationError;
pub use read_ext::ReadLedgerExt;
pub use write_ext::WriteLedgerExt;

#[cfg(test)]
mod tests;
