//! The offer record and its accept sub-record.

use crate::{
    amount::Amount,
    constants::MAX_OFFER_CHILDREN,
    feedback::Feedback,
    guid::Guid,
    height::Height,
    serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError},
    transaction::Txid,
};
use service_serde_derive::{BtcDeserialize, BtcSerialize};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// One entry in an offer's whitelist: an alias granted `discount_pct` off
/// the posted price.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct WhitelistEntry {
    pub alias: Guid,
    /// Whitelist discount > 99 is invalid; 127 is reserved to mean
    /// "clear all entries".
    pub discount_pct: i8,
}

/// An offer's full whitelist: the discount table plus the exclusive-resale
/// flag.
#[derive(
        Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Whitelist {
    pub entries: Vec<WhitelistEntry>,
    pub exclusive: bool,
}

impl Whitelist {
    pub fn find(&self, alias: &Guid) -> Option<&WhitelistEntry> {
        self.entries.iter().find(|e| &e.alias == alias)
    }

    /// Replace-by-key, not blind push.
    pub fn put(&mut self, entry: WhitelistEntry) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.alias == entry.alias) {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
    }

    pub fn remove(&mut self, alias: &Guid) {
        self.entries.retain(|e| &e.alias != alias);
    }

    /// A discount of 127 clears the whole whitelist.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// The named-object side of a purchase.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Offer {
    pub guid: Guid,
    /// The alias that controls this offer and receives sale proceeds.
    pub alias: Guid,
    pub title: Vec<u8>,
    pub category: Vec<u8>,
    pub description: Vec<u8>,
    pub currency_code: Vec<u8>,
    /// The alias whose public value carries the exchange-rate table used
    /// to convert `price` to/from the chain's smallest unit.
    pub alias_peg: Guid,
    /// Price in currency units (not the chain's smallest unit).
    pub price: Amount,
    /// -1 = unlimited.
    pub quantity: i64,
    /// Per-sale commission, in [-90, 100].
    pub commission: i8,
    /// Empty when this is not a reseller front pointing at a parent offer.
    pub linked_offer: Guid,
    /// Empty unless this offer requires digital delivery of a certificate.
    pub cert: Guid,
    /// Payment option bitmask in {1, 2, 3} (SYS, BTC, or both).
    pub payment_options: u8,
    pub private: bool,
    pub safety_level: u8,
    pub safe_search: bool,
    pub whitelist: Whitelist,
    /// Reseller fronts (child offers) pointing at this offer.
    pub children: Vec<Guid>,
    /// Monotonic accepted-quantity counter; immutable on update.
    pub sold: u64,
    /// Free-form geo string: not inherited by linked offers,
    /// not propagated on parent update.
    pub geo_location: Vec<u8>,
    pub height: Height,
    pub txid: Txid,
}

impl crate::records::Versioned for Offer {
    fn height(&self) -> Height {
        self.height
    }
    fn txid(&self) -> Txid {
        self.txid
    }
}

impl Offer {
    pub fn is_linked(&self) -> bool {
        !self.linked_offer.is_empty()
    }

    pub fn has_cert(&self) -> bool {
        !self.cert.is_empty()
    }

    /// Wanted-category offers cannot be purchased; "wanted" is modeled
    /// as a reserved category string rather than a separate flag.
    pub fn is_wanted(&self) -> bool {
        self.category.eq_ignore_ascii_case(b"wanted")
        || self.category.starts_with(b"wanted>")
    }

    pub fn children_at_capacity(&self) -> bool {
        self.children.len() >= MAX_OFFER_CHILDREN
    }

    pub fn commission_in_bounds(&self) -> bool {
        self.commission >= -90 && self.commission <= 100
    }
}

/// A purchase record under an offer. Stored separately from `Offer`
/// because many accepts exist per offer; the accept's own `guid` is the
/// key used for feedback lookups.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct OfferAccept {
    pub accept_guid: Guid,
    pub offer_guid: Guid,
    /// Pinned at acceptance: the currency peg is resolved as of this
    /// height, not the chain tip.
    pub accept_height: Height,
    pub qty: u64,
    /// Price actually paid, in the chain's smallest unit, after whitelist
    /// discount and currency conversion.
    pub price: Amount,
    /// Non-empty only for BTC-payment offers.
    pub btc_txid: Vec<u8>,
    pub buyer_alias: Guid,
    /// Buyer→seller payment-cipher message.
    pub message: Vec<u8>,
    pub feedback: Vec<Feedback>,
    pub height: Height,
    pub txid: Txid,
}

impl crate::records::Versioned for OfferAccept {
    fn height(&self) -> Height {
        self.height
    }
    fn txid(&self) -> Txid {
        self.txid
    }
}

impl OfferAccept {
    pub fn is_btc_payment(&self) -> bool {
        !self.btc_txid.is_empty()
    }

    /// "≤ 10 feedback items per role per accept".
    pub fn feedback_count_for(&self, role: crate::feedback::FeedbackUser) -> usize {
        self.feedback.iter().filter(|f| f.from == role).count()
    }

    /// "If the sender has already rated, the new rating is
    /// forced to 0 (only the first rating counts toward alias reputation)".
    pub fn has_rated(&self, role: crate::feedback::FeedbackUser) -> bool {
        self.feedback.iter().any(|f| f.from == role && f.rating > 0)
    }
}

