//! The escrow record.

use crate::{
    feedback::Feedback,
    guid::Guid,
    height::Height,
    serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError},
    transaction::Txid,
};
use service_serde_derive::{BtcDeserialize, BtcSerialize};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// The escrow's current transition, one of ACTIVATE, RELEASE, REFUND, or
/// COMPLETE. Modeled as a `u8` newtype like
/// [`crate::feedback::FeedbackUser`] rather than a Rust enum, because the
/// derived wire codec only knows how to (de)serialize tuple/named structs
/// field-by-field, not tagged enum discriminants.
#[derive(
        Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct EscrowOp(pub u8);

impl EscrowOp {
    pub const ACTIVATE: EscrowOp = EscrowOp(1);
    pub const RELEASE: EscrowOp = EscrowOp(2);
    pub const REFUND: EscrowOp = EscrowOp(3);
    pub const COMPLETE: EscrowOp = EscrowOp(4);
}

/// A 2-of-3 multisig-backed custodial record between buyer/seller/arbiter
/// referencing an offer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Escrow {
    pub guid: Guid,
    pub buyer_alias: Guid,
    pub seller_alias: Guid,
    pub arbiter_alias: Guid,
    pub offer_guid: Guid,
    pub qty: u64,
    /// Buyer→seller payment-cipher message.
    pub payment_message: Vec<u8>,
    /// The 2-of-3 multisig redeem script (buyer/seller/arbiter pubkeys).
    pub redeem_script: Vec<u8>,
    /// Foreign-chain funding transaction hex, non-empty only when paid in
    /// BTC.
    pub foreign_funding_tx: String,
    /// The raw, partially-signed release/refund transaction a wallet will
    /// later broadcast; not validated against the foreign chain itself.
    pub raw_tx: Vec<u8>,
    pub op: EscrowOp,
    /// Pins the offer's price and discount at activation: the currency peg
    /// used to resolve them is versioned, so later peg updates must not
    /// retroactively change an already-activated escrow's terms.
    pub accept_height: Height,
    pub feedback: Vec<Feedback>,
    pub height: Height,
    pub txid: Txid,
}

impl crate::records::Versioned for Escrow {
    fn height(&self) -> Height {
        self.height
    }
    fn txid(&self) -> Txid {
        self.txid
    }
}

impl Escrow {
    /// "Escrows that reached COMPLETE expire normally; escrows
    /// still active (ACTIVATE/RELEASE/REFUND) never expire."
    pub fn is_expirable(&self) -> bool {
        self.op == EscrowOp::COMPLETE
    }

    pub fn is_btc_funded(&self) -> bool {
        !self.foreign_funding_tx.is_empty()
    }
}

