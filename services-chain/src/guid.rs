//! The opaque per-record identifier (`guid`) shared by all five services.

use crate::constants::MAX_GUID_LENGTH;
use crate::serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError};
use service_serde_derive::{BtcDeserialize, BtcSerialize};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// An opaque record identifier. Wire format is the same length-prefixed
/// byte string every other service field uses; the only guid-specific rule
/// is the length ceiling (`MAX_GUID_LENGTH`).
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize, BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Guid(pub Vec<u8>);

impl Guid {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks the guid against `MAX_GUID_LENGTH` (≈ 71).
    pub fn within_size_bound(&self) -> bool {
        self.0.len() <= MAX_GUID_LENGTH
    }
}

impl std::fmt::Debug for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Guid").field(&hex::encode(&self.0)).finish()
    }
}

impl std::fmt::Display for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl From<Vec<u8>> for Guid {
    fn from(bytes: Vec<u8>) -> Self {
        Guid(bytes)
    }
}

impl From<&str> for Guid {
    fn from(s: &str) -> Self {
        Guid(s.as_bytes().to_vec())
    }
}

