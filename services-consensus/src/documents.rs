//! The three JSON documents special aliases carry in their public value,
//! parsed with `serde_json` instead of ad hoc string key lookups.

use serde::Deserialize;

/// `sysrates.peg`'s public value: an exchange-rate table.
#[derive(Clone, Debug, Deserialize)]
pub struct PegDocument {
    pub rates: Vec<PegRate>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PegRate {
    pub currency: String,
    pub rate: f64,
    pub precision: u8,
}

impl PegDocument {
    pub fn rate_for(&self, currency: &str) -> Option<&PegRate> {
        self.rates
        .iter()
        .find(|r| r.currency.eq_ignore_ascii_case(currency))
    }
}

impl PegRate {
    /// `amount * rate * coin`, rounded; returns 0 if `precision` exceeds 8
    /// rather than risk a runaway decimal conversion.
    pub fn convert_to_chain_unit(&self, amount: f64, coin: i64) -> i64 {
        if self.precision > 8 {
            return 0;
        }
        (amount * self.rate * coin as f64).round() as i64
    }
}

/// `sysban`'s public value: ban/severity lists for aliases, certs, and
/// offers.
#[derive(Clone, Debug, Deserialize)]
pub struct BanDocument {
    #[serde(default)]
    pub aliases: Vec<BanEntry>,
    #[serde(default)]
    pub certs: Vec<BanEntry>,
    #[serde(default)]
    pub offers: Vec<BanEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BanEntry {
    pub id: String,
    pub severity: u8,
}

/// `syscategory`'s public value: the recognized category list.
#[derive(Clone, Debug, Deserialize)]
pub struct CategoryDocument {
    pub categories: Vec<CategoryEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CategoryEntry {
    pub cat: String,
}
