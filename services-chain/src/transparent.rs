//! Transparent (UTXO) building blocks inherited from the underlying chain.
//!
//! The services core does not mint, order, or validate these on its own —
//! it only reads them back out of a [`crate::utxo::UtxoView`] to resolve the
//! previous output a service transaction spends.
#![allow(clippy::unit_arg)]

pub mod address;
mod script;

pub use address::{Address, ToAddressWithNetwork};
pub use script::Script;

use crate::{
    amount::Amount,
    serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError},
    transaction,
};
use service_serde_derive::{BtcDeserialize, BtcSerialize};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// A particular transaction output reference.
#[derive(
        Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Hash, BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct OutPoint {
    /// The transaction that contains the output being spent.
    pub hash: transaction::Txid,
    /// Which output of that transaction is referenced; the first is 0.
    pub index: u32,
}

impl OutPoint {
    #[inline]
    pub const fn len() -> usize {
        36
    }
}

/// An input to a transaction: a reference to a previous output plus the
/// script that authorizes spending it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, BtcSerialize, BtcDeserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Input {
    /// The previous output being spent.
    pub outpoint: OutPoint,
    /// The script that authorizes spending `outpoint`.
    pub unlock_script: Script,
    /// The sequence number for the output.
    pub sequence: u32,
}

impl Input {
    pub fn len(&self) -> usize {
        OutPoint::len() + self.unlock_script.serialized_size() + 4
    }
}

/// An output from a transaction: an amount plus the script that locks it.
#[derive(
        Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Hash, BtcDeserialize, BtcSerialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Output {
    /// The amount locked by this output, in the chain's smallest unit.
    pub value: Amount,
    /// The script defining the conditions under which this output can be
    /// spent. For service outputs this carries the C2 prefix; for payment
    /// outputs it's an ordinary pay-to-pubkey-hash script.
    pub lock_script: Script,
}

impl Output {
    pub fn len(&self) -> usize {
        8 + self.lock_script.serialized_size()
    }
}

