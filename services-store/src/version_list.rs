//! Append-with-replace-by-key version lists.

use services_chain::{
    records::Versioned,
    serialization::{BitcoinDeserialize, BitcoinSerialize, SerializationError},
};

/// Every stored version of one service guid, in insertion order. The current
/// version is the last element. One generic type serves all five
/// services, since each shares the identical append-with-replace shape.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VersionList<T>(Vec<T>);

impl<T: Versioned + Clone> VersionList<T> {
    pub fn new() -> Self {
        VersionList(Vec::new())
    }

    /// Replace the entry whose `(height, txid)` matches `record`'s, or
    /// append if none matches (append-with-replace-by-key). Idempotent:
    /// re-applying the same record twice leaves the list unchanged after
    /// the first call.
    pub fn put(&mut self, record: T) {
        let key = record.version_key();
        if let Some(existing) = self.0.iter_mut().find(|r| r.version_key() == key) {
            *existing = record;
        } else {
            self.0.push(record);
        }
    }

    /// The current (most recently applied) version, or `None` if the list
    /// is empty.
    pub fn current(&self) -> Option<&T> {
        self.0.last()
    }

    /// Every stored version, in insertion order.
    pub fn history(&self) -> &[T] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<T: BitcoinSerialize> BitcoinSerialize for VersionList<T> {
    fn bitcoin_serialize<W: std::io::Write>(&self, target: W) -> Result<(), std::io::Error> {
        self.0.bitcoin_serialize(target)
    }
}

impl<T: BitcoinDeserialize> BitcoinDeserialize for VersionList<T> {
    fn bitcoin_deserialize<R: std::io::Read>(target: R) -> Result<Self, SerializationError> {
        Ok(VersionList(Vec::<T>::bitcoin_deserialize(target)?))
    }
}
