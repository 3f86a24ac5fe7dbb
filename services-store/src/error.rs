//! Storage errors (error class 4).

use thiserror::Error;

/// A failure reading or writing a service store. In `JustCheck`
/// mode this rejects the transaction outright; in connect mode it is
/// consensus-hard (propagated, not soft-skipped), because a persistent
/// storage failure would desync state.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("wire codec error decoding a stored record: {0}")]
    Codec(#[from] services_chain::SerializationError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A cooperative scan was cancelled mid-iteration; callers get
    /// whatever results were yielded before this.
    #[error("scan cancelled before completion")]
    Cancelled,
}

