//! Consensus validation for the services layer.
//!
//! One module per concern, a shared [`state::ValidatorState`]/
//! [`state::Mode`] pair threaded through every check, and a single
//! [`dispatch::validate`] entry point that ties C3 (decode) through C7
//! (side effects) together for one transaction.
//!
//! `services-chain` holds the types; `services-store` holds persistence;
//! this crate holds the only place that actually makes a consensus
//! decision.

pub mod alias;
pub mod cert;
pub mod data_output;
pub mod decode;
pub mod dispatch;
pub mod documents;
pub mod effects;
pub mod error;
pub mod escrow;
pub mod message;
pub mod offer;
pub mod prevout;
pub mod state;

pub use dispatch::validate;
pub use error::{Outcome, ServiceError};
pub use state::{Mode, ValidatorState};

