//! Validator state and invocation mode.
//!
//! The five service stores and the main chain view are modeled as
//! explicit handles threaded through the validator rather than process-wide
//! singletons; construct once at startup.

use services_chain::{height::Height, utxo::UtxoView};
use services_store::Stores;

/// Which of the two contexts the validator was invoked from: it runs
/// twice per service transaction, once per mode.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Mempool acceptance: the in-memory UTXO view, no store mutation.
    JustCheck,
    /// Block connection: store mutation and side effects are applied.
    Connect { height: Height },
}

impl Mode {
    pub fn is_connect(self) -> bool {
        matches!(self, Mode::Connect {.. })
    }

    /// The height to use for "now" in future-height and expiration checks
    /// ("nHeight ≤ block height"). `JustCheck` has no connecting
    /// height yet; callers supply the chain tip via [`super::utxo::ChainTip`]
    /// in that mode instead.
    pub fn connecting_height(self) -> Option<Height> {
        match self {
            Mode::Connect { height } => Some(height),
            Mode::JustCheck => None,
        }
    }
}

/// Everything the validator needs to check and, in connect mode, apply a
/// service transaction: the persistent stores plus a read-only view of the
/// spent outputs.
pub struct ValidatorState<'a, U: UtxoView> {
    pub stores: &'a Stores,
    pub utxo: &'a U,
}

impl<'a, U: UtxoView> ValidatorState<'a, U> {
    pub fn new(stores: &'a Stores, utxo: &'a U) -> Self {
        ValidatorState { stores, utxo }
    }
}

