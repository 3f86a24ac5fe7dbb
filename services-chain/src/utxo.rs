//! The external contracts the validator consumes from the surrounding
//! chain. The block/transaction database, the real UTXO
//! set, and the P2P/RPC layers are out of scope — this crate only
//! depends on their interface.

use crate::{height::Height, transparent::OutPoint, transparent::Output};

/// A read-only view of the unspent transaction output set, as the
/// validator needs it to resolve the previous output a service input
/// spends. The real `CCoinsViewCache` is the production implementor.
pub trait UtxoView {
    fn output(&self, outpoint: &OutPoint) -> Option<Output>;
}

/// Stands in for `chainActive.Tip`: the height the validator should treat
/// as "now" for expiration and future-height checks.
pub trait ChainTip {
    fn height(&self) -> Height;
}

/// Escrow COMPLETE's only chain dependency: decode a raw transaction hex
/// blob back into its outputs so the validator can check it pays the
/// expected parties. This is on-the-wire plausibility only — the core
/// never fetches or validates foreign-chain inclusion of the transaction
/// it parses.
pub trait BlockSource {
    type Error;

    fn raw_transaction_paid(&self, hex: &str) -> Result<Vec<Output>, Self::Error>;
}

