//! The alias record.

use crate::{
    constants::{self, MAX_ENCRYPTED_VALUE_LENGTH, MAX_VALUE_LENGTH},
    guid::Guid,
    height::Height,
    parameters::Network,
    serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError},
    transaction::Txid,
    transparent::{Address, ToAddressWithNetwork},
};
use service_serde_derive::{BtcDeserialize, BtcSerialize};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// An accumulated `(sum, count)` reputation pair for one of an alias's
/// three roles.
#[derive(
        Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct RatingPair {
    pub sum: u64,
    pub count: u64,
}

impl RatingPair {
    /// Adds `rating` to the role-specific (sum, count) pair. The
    /// first-rating guard is enforced by the caller, not here.
    pub fn add(&mut self, rating: u8) {
        self.sum += u64::from(rating);
        self.count += 1;
    }
}

/// An on-chain registered owner identity: a name bound to a public key.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Alias {
    /// Lowercased at entry: alias names are case-insensitive.
    pub name: String,
    pub guid: Guid,
    /// The owning public key, serialized (compressed or uncompressed, as
    /// supplied). The address derived from this key is this alias's
    /// ownership key.
    pub pubkey: Vec<u8>,
    pub public_value: Vec<u8>,
    /// Ciphertext to the current owner.
    pub private_value: Vec<u8>,
    /// Ciphertext, only non-empty while a transfer is in flight.
    pub private_key: Vec<u8>,
    /// ∈ [1, 5].
    pub renewal: u8,
    pub safety_level: u8,
    pub safe_search: bool,
    pub rating_buyer: RatingPair,
    pub rating_seller: RatingPair,
    pub rating_arbiter: RatingPair,
    pub height: Height,
    pub txid: Txid,
}

impl crate::records::Versioned for Alias {
    fn height(&self) -> Height {
        self.height
    }
    fn txid(&self) -> Txid {
        self.txid
    }
}

impl Alias {
    /// Domain-name regex: 3-63 chars, LDH, TLD 2-6 chars if present.
    pub fn name_is_valid(name: &str) -> bool {
        lazy_static::lazy_static! {
            static ref NAME_RE: regex::Regex = regex::Regex::new(
                r"^(?i)[a-z0-9]([a-z0-9-]*[a-z0-9])?(\.[a-z]{2,6})?$")
            .expect("static regex is valid");
        }
        name.len() >= 3 && name.len() <= 63 && NAME_RE.is_match(name)
    }

    pub fn renewal_is_valid(&self) -> bool {
        (constants::MIN_ALIAS_RENEWAL..=constants::MAX_ALIAS_RENEWAL).contains(&self.renewal)
    }

    pub fn public_value_within_bound(&self) -> bool {
        self.public_value.len() <= MAX_VALUE_LENGTH
    }

    pub fn private_value_within_bound(&self) -> bool {
        self.private_value.len() <= MAX_ENCRYPTED_VALUE_LENGTH
    }

    /// `sysrates.peg`, `sysban`, and `syscategory` never expire and
    /// carry relaxed size limits.
    pub fn is_special(&self) -> bool {
        matches!(
            self.name.as_str(),
            constants::special_aliases::PEG
            | constants::special_aliases::BAN
            | constants::special_aliases::CATEGORY
        )
    }

    /// The pay-to-pubkey-hash address this alias's pubkey derives to, used
    /// both for uniqueness in the secondary address index and for
    /// ownership/authorization checks (C6).
    pub fn pubkey_address(&self, network: Network) -> Option<Address> {
        let key = secp256k1::PublicKey::from_slice(&self.pubkey).ok()?;
        Some(key.to_address(network))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_bounds() {
        assert!(!Alias::name_is_valid("ab"));
        assert!(Alias::name_is_valid("abc"));
        assert!(Alias::name_is_valid("buyeralias"));
        assert!(Alias::name_is_valid("my-alias.com"));
        assert!(!Alias::name_is_valid("-leadingdash"));
        assert!(!Alias::name_is_valid(&"a".repeat(64)));
    }

    #[test]
    fn special_aliases_detected() {
        let mut a = make_alias("sysban");
        assert!(a.is_special());
        a.name = "buyeralias".into();
        assert!(!a.is_special());
    }

    fn make_alias(name: &str) -> Alias {
        Alias {
            name: name.to_string(),
            guid: Guid(b"g".to_vec()),
            pubkey: vec![],
            public_value: vec![],
            private_value: vec![],
            private_key: vec![],
            renewal: 1,
            safety_level: 0,
            safe_search: true,
            rating_buyer: RatingPair::default(),
            rating_seller: RatingPair::default(),
            rating_arbiter: RatingPair::default(),
            height: Height(0),
            txid: Txid([0u8; 32]),
        }
    }
}

