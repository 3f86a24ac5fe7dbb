//! The message record. Immutable after creation.

use crate::{
    guid::Guid,
    height::Height,
    serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError},
    transaction::Txid,
};
use service_serde_derive::{BtcDeserialize, BtcSerialize};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// A one-shot, end-to-end-encrypted note between two aliases.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Message {
    pub guid: Guid,
    pub from_alias: Guid,
    pub to_alias: Guid,
    pub subject: Vec<u8>,
    /// Ciphertext to the recipient's public key.
    pub cipher_to_recipient: Vec<u8>,
    /// Ciphertext to the sender's own public key (so the sender can read
        /// it back later).
    pub cipher_to_sender: Vec<u8>,
    pub height: Height,
    pub txid: Txid,
}

impl crate::records::Versioned for Message {
    fn height(&self) -> Height {
        self.height
    }
    fn txid(&self) -> Txid {
        self.txid
    }
}

