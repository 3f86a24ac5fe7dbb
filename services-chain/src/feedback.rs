//! The shared feedback/rating type used by both `OfferAccept` and `Escrow`.

use crate::{
    height::Height,
    serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError},
    transaction::Txid,
};
use service_serde_derive::{BtcDeserialize, BtcSerialize};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// Which role in a transaction a feedback item was authored by or directed
/// at ( Constants: `FEEDBACKBUYER/SELLER/ARBITER`).
#[derive(
        Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct FeedbackUser(pub u8);

impl FeedbackUser {
    pub const BUYER: FeedbackUser = FeedbackUser(1);
    pub const SELLER: FeedbackUser = FeedbackUser(2);
    pub const ARBITER: FeedbackUser = FeedbackUser(3);
}

/// A single rating-plus-text item, emitted post-transaction by one party
/// about another. Ratings aggregate into the target
/// alias's per-role `(sum, count)` pair; text never does.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Feedback {
    pub from: FeedbackUser,
    pub to: FeedbackUser,
    pub rating: u8,
    pub text: Vec<u8>,
    pub height: Height,
    pub txid: Txid,
}

impl Feedback {
    /// "rating ≤ 5".
    pub fn rating_in_bounds(&self) -> bool {
        self.rating <= 5
    }

    /// "feedback from/to cannot be the same party".
    pub fn not_self_rated(&self) -> bool {
        self.from != self.to
    }
}

