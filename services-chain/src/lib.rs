//! Core record, script, and wire-codec types for the Syscoin-style services
//! consensus layer (C1 codec, C2 script shape, data model).
//!
//! This crate holds no I/O and makes no consensus decisions: pure types and
//! (de)serialization, with no validation logic. Validation (C3–C7) lives in
//! `services-consensus`; persistence (C5, C8, C9) lives in `services-store`.

#[macro_use]
extern crate serde;

pub mod amount;
pub mod cached;
pub mod commitment;
pub mod compactint;
pub mod constants;
pub mod feedback;
pub mod guid;
pub mod height;
pub mod parameters;
pub mod records;
pub mod script;
pub mod serialization;
pub mod transaction;
pub mod transparent;
pub mod utxo;

pub use amount::Amount;
pub use compactint::CompactInt;
pub use guid::Guid;
pub use height::Height;
pub use serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError};
