//! Expiration & pruning: one chain-wide depth constant per service type,
//! multiplied by `nRenewal` for aliases. A record is expired once
//! `tip.nHeight > lastEntry.nHeight + depth*renewal`.

use crate::{error::StoreError, store::Stores};
use services_chain::{height::Height, records::Escrow, Guid};

/// Whether a record's current version is old enough to be hidden from
/// queries ("expired records are hidden from queries").
pub fn is_expired(tip: Height, last_entry_height: Height, depth: Height, renewal: u8) -> bool {
    let renewal = u64::from(renewal.max(1));
    let expiry = u64::from(last_entry_height.value()) + u64::from(depth.value()) * renewal;
    u64::from(tip.value()) > expiry
}

/// "Escrows that reached COMPLETE expire normally; escrows still
/// active (ACTIVATE/RELEASE/REFUND) never expire."
pub fn escrow_is_expired(tip: Height, escrow: &Escrow, depth: Height) -> bool {
    if !escrow.is_expirable() {
        return false;
    }
    is_expired(tip, escrow.height, depth, 1)
}

impl Stores {
    /// Is this alias's current version expired at `tip`?
    /// Special aliases (`sysrates.peg`, `sysban`, `syscategory`) never
    /// expire.
    pub fn alias_expired(&self, guid: &Guid, tip: Height) -> Result<bool, StoreError> {
        let depth = self.network.expiration_depth();
        Ok(match self.aliases.current(guid)? {
                Some(alias) if alias.is_special() => false,
                Some(alias) => is_expired(tip, alias.height, depth, alias.renewal),
                None => false,
        })
    }

    /// Offers, certs, and messages follow the simple depth rule (no
    /// renewal multiplier).
    pub fn offer_expired(&self, guid: &Guid, tip: Height) -> Result<bool, StoreError> {
        let depth = self.network.expiration_depth();
        Ok(match self.offers.current(guid)? {
                Some(offer) => is_expired(tip, offer.height, depth, 1),
                None => false,
        })
    }

    pub fn cert_expired(&self, guid: &Guid, tip: Height) -> Result<bool, StoreError> {
        let depth = self.network.expiration_depth();
        Ok(match self.certs.current(guid)? {
                Some(cert) => is_expired(tip, cert.height, depth, 1),
                None => false,
        })
    }

    pub fn message_expired(&self, guid: &Guid, tip: Height) -> Result<bool, StoreError> {
        let depth = self.network.expiration_depth();
        Ok(match self.messages.current(guid)? {
                Some(message) => is_expired(tip, message.height, depth, 1),
                None => false,
        })
    }

    pub fn escrow_expired(&self, guid: &Guid, tip: Height) -> Result<bool, StoreError> {
        let depth = self.network.expiration_depth();
        Ok(match self.escrows.current(guid)? {
                Some(escrow) => escrow_is_expired(tip, &escrow, depth),
                None => false,
        })
    }
}
