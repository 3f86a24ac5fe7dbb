//! The five service record types plus their shared shape.

pub mod alias;
pub mod cert;
pub mod escrow;
pub mod message;
pub mod offer;

pub use alias::Alias;
pub use cert::Certificate;
pub use escrow::{Escrow, EscrowOp};
pub use message::Message;
pub use offer::{Offer, OfferAccept, Whitelist, WhitelistEntry};

use crate::{height::Height, transaction::Txid};

/// Every service record carries the height it last changed at and the
/// transaction that produced that version. Stores keep version lists in
/// insertion order; "current" is the last element.
pub trait Versioned {
    fn height(&self) -> Height;
    fn txid(&self) -> Txid;

    /// The key `VersionList::put` replaces on: re-applying a record with a
    /// matching `(height, txid)` replaces the existing entry in place
    /// instead of appending ("Duplicated records and idempotent
        /// writes").
    fn version_key(&self) -> (Height, Txid) {
        (self.height(), self.txid())
    }
}

