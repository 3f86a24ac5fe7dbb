//! The minimal UTXO transaction model the services validator consumes.
//!
//! The real chain's transaction format carries far more (shielded pools,
    //! witness data, etc.) — none of it is relevant here. This module models
//! only what C3/C4/C6 read: a version tag, the input/output lists, and a
//! lock time, matching the wire shape describes.

mod hash;

pub use hash::Txid;

use crate::{
    serialization::{sha256d, BitcoinSerialize},
    transparent,
};
use service_serde_derive::{BtcDeserialize, BtcSerialize};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// The distinguished transaction version that marks a services transaction
/// (`SYSCOIN_TX_VERSION`). Any other version is not a services
/// transaction at all.
pub const SYSCOIN_TX_VERSION: i32 = 0x7401;

/// A UTXO transaction, as seen by the services validator.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<transparent::Input>,
    pub outputs: Vec<transparent::Output>,
    pub lock_time: u32,
}

impl Transaction {
    /// Whether this transaction carries the distinguished services version
    ///. A non-services transaction is simply ignored by C3, not
    /// rejected — only a `SYSCOIN_TX_VERSION` transaction with a malformed
    /// or duplicate service output is a hard fault.
    pub fn is_service_transaction(&self) -> bool {
        self.version == SYSCOIN_TX_VERSION
    }

    /// Whether this transaction has no real inputs, i.e. is a coinbase.
    /// The services validator rejects coinbase transactions outright.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn txid(&self) -> Txid {
        let bytes = self
            .bitcoin_serialize_to_vec()
            .expect("serializing to a Vec is infallible");
        Txid(sha256d::digest(&bytes))
    }
}

