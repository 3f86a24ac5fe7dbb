//! Consensus constants.
//!
//! These are wire-critical: changing any of them is a hard fork.

/// Maximum length, in bytes, of a service record's `guid`.
pub const MAX_GUID_LENGTH: usize = 71;

/// Maximum length, in bytes, of a name/title field (alias name, offer
    /// title, certificate title).
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum length, in bytes, of a plaintext public value field.
pub const MAX_VALUE_LENGTH: usize = 1023;

/// Maximum length, in bytes, of an encrypted (ciphertext) value field.
pub const MAX_ENCRYPTED_VALUE_LENGTH: usize = 1108;

/// Safety level at or above which a record is flagged for warning in
/// queries.
pub const SAFETY_LEVEL1: u8 = 1;

/// Safety level at or above which a record is hidden from queries.
pub const SAFETY_LEVEL2: u8 = 2;

/// Renewal multiplier bounds for alias activation/update.
pub const MIN_ALIAS_RENEWAL: u8 = 1;
pub const MAX_ALIAS_RENEWAL: u8 = 5;

/// Maximum number of child (reseller) offers a parent offer's link list may
/// hold.
pub const MAX_OFFER_CHILDREN: usize = 100;

/// Maximum number of feedback items per role per accept/escrow.
pub const MAX_FEEDBACK_PER_ROLE: usize = 10;

/// Whitelist discount value reserved as a "clear all entries" sentinel
/// (127 is reserved for "clear all entries").
pub const WHITELIST_CLEAR_ALL: i8 = 127;

/// Payment option bitmask values ("payment-option bitmask").
pub mod payment_options {
    pub const SYS: u8 = 1;
    pub const BTC: u8 = 2;
    pub const SYS_AND_BTC: u8 = 3;
}

/// Names of the three special aliases that never expire and carry relaxed
/// size limits.
pub mod special_aliases {
    pub const PEG: &str = "sysrates.peg";
    pub const BAN: &str = "sysban";
    pub const CATEGORY: &str = "syscategory";
}

