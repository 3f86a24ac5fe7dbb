//! The certificate record.

use crate::{
    constants::{MAX_ENCRYPTED_VALUE_LENGTH, MAX_NAME_LENGTH},
    guid::Guid,
    height::Height,
    serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError},
    transaction::Txid,
};
use service_serde_derive::{BtcDeserialize, BtcSerialize};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// A digital-good or identity certificate, transferable between aliases.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Certificate {
    pub guid: Guid,
    pub title: Vec<u8>,
    pub category: Vec<u8>,
    /// Ciphertext to the current owner, re-encrypted by the sender on
    /// transfer; the validator never decrypts it, only enforces
    /// authorization.
    pub data: Vec<u8>,
    pub private: bool,
    pub owner_alias: Guid,
    /// Only non-empty during a TRANSFER transaction: the recipient alias.
    pub pending_transfer_alias: Guid,
    pub safety_level: u8,
    pub height: Height,
    pub txid: Txid,
}

impl crate::records::Versioned for Certificate {
    fn height(&self) -> Height {
        self.height
    }
    fn txid(&self) -> Txid {
        self.txid
    }
}

impl Certificate {
    pub fn data_within_bound(&self) -> bool {
        self.data.len() <= MAX_ENCRYPTED_VALUE_LENGTH
    }

    pub fn title_non_empty(&self) -> bool {
        !self.title.is_empty()
    }

    pub fn title_within_bound(&self) -> bool {
        self.title.len() <= MAX_NAME_LENGTH
    }

    pub fn is_transfer(&self) -> bool {
        !self.pending_transfer_alias.is_empty()
    }
}

