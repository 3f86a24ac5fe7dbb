//! Sled (de)serialization helpers, built on this crate's own
//! [`BitcoinSerialize`]/[`BitcoinDeserialize`] wire codec (C1) rather than
//! a generic serialization format, so what's on disk is byte-identical to
//! what a wallet or another implementation would compute from the same
//! records.

use crate::error::StoreError;
use services_chain::serialization::{BitcoinDeserialize, BitcoinSerialize};

pub trait StoreGet {
    fn store_get<K, V>(&self, key: &K) -> Result<Option<V>, StoreError>
    where
    K: BitcoinSerialize,
    V: BitcoinDeserialize;
}

pub trait StorePut {
    fn store_insert<K, V>(&self, key: &K, value: &V) -> Result<(), StoreError>
    where
    K: BitcoinSerialize,
    V: BitcoinSerialize;
}

impl StoreGet for sled::Tree {
    fn store_get<K, V>(&self, key: &K) -> Result<Option<V>, StoreError>
    where
    K: BitcoinSerialize,
    V: BitcoinDeserialize,
    {
        let key_bytes = key.bitcoin_serialize_to_vec()?;
        match self.get(key_bytes)? {
            Some(bytes) => Ok(Some(V::bitcoin_deserialize(&bytes[..])?)),
            None => Ok(None),
        }
    }
}

impl StorePut for sled::Tree {
    fn store_insert<K, V>(&self, key: &K, value: &V) -> Result<(), StoreError>
    where
    K: BitcoinSerialize,
    V: BitcoinSerialize,
    {
        let key_bytes = key.bitcoin_serialize_to_vec()?;
        let value_bytes = value.bitcoin_serialize_to_vec()?;
        self.insert(key_bytes, value_bytes)?;
        Ok(())
    }
}

