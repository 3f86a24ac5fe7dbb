//! Monetary amounts.
//!
//! All monetary amounts are 64-bit signed integers in the smallest chain
//! unit. `COIN` is the number of smallest units per whole coin, supplied
//! by the caller's chain parameters (services-consensus' `FeeParameters`),
//! not hardcoded here.

use crate::serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError};
use service_serde_derive::{BtcDeserialize, BtcSerialize};
use std::ops::{Add, Sub};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// An amount of the chain's native currency, in its smallest unit.
#[derive(
        Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
        BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Amount(pub i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Saturating subtraction that never goes below zero, matching the
    /// inventory arithmetic in C7 ("quantity saturates at 0").
    pub fn saturating_sub(self, rhs: Amount) -> Amount {
        Amount((self.0 - rhs.0).max(0))
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount(value)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

