use std::{io, num::TryFromIntError};

use thiserror::Error;

/// A serialization error.
#[derive(Error, Debug)]
pub enum SerializationError {
    /// An io error that prevented deserialization
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// The data to be deserialized was malformed.
    #[error("parse error: {0}")]
    Parse(&'static str),
    /// A length is too large to convert to a usize on this platform
    #[error("length too large: {0}")]
    TryFromIntError(#[from] TryFromIntError),
    /// An error caused when validating an `Amount`
    #[error("input couldn't be parsed as an `Amount`: {source}")]
    Amount {
        /// The source error indicating how the amount failed to validate
        #[from]
        source: crate::amount::Error,
    },
}
