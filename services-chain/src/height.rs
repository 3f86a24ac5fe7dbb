//! Block heights.

use crate::serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError};
use service_serde_derive::{BtcDeserialize, BtcSerialize};
use std::ops::{Add, Sub};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// A height in the underlying chain, used to timestamp every service record
/// (`nHeight`) in lieu of wall-clock time.
#[derive(
        Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
        BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Height(pub u32);

impl Height {
    pub const MIN: Height = Height(0);
    pub const MAX: Height = Height(u32::MAX);

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for Height {
    fn from(value: u32) -> Self {
        Height(value)
    }
}

impl Add<u32> for Height {
    type Output = Height;

    fn add(self, rhs: u32) -> Height {
        Height(self.0.saturating_add(rhs))
    }
}

impl Sub<Height> for Height {
    type Output = i64;

    fn sub(self, rhs: Height) -> i64 {
        i64::from(self.0) - i64::from(rhs.0)
    }
}

impl std::fmt::Display for Height {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

