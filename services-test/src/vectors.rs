//! Fixed byte-string test vectors shared across crates: sample guids,
//! alias names, and the JSON documents carried by the three special
//! aliases.

/// A syntactically valid alias name (passes the domain-name regex).
pub const ALIAS_NAME: &str = "buyeralias";

/// A second, distinct alias name used wherever a test needs two parties.
pub const OTHER_ALIAS_NAME: &str = "selleralias";

/// `sysrates.peg`'s public value: one currency, USD at rate 2690.1.
pub const PEG_DOCUMENT: &str = r#"{"rates":[{"currency":"USD","rate":2690.1,"precision":2}]}"#;

/// `sysban`'s public value: bans a single offer guid at severity 2.
pub const BAN_DOCUMENT: &str = r#"{"aliases":[],"certs":[],"offers":[{"id":"4f31","severity":2}]}"#;

/// `syscategory`'s public value: a minimal category list.
pub const CATEGORY_DOCUMENT: &str = r#"{"categories":[{"cat":"electronics"},{"cat":"services"}]}"#;

