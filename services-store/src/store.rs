//! The five service stores (C5) plus the alias secondary address index.
//!
//! Tree names match exactly (`namei`, `offeri`, `certi`, `escrowi`,
//! `messagei`); the accept store (`accepti`) and the `alias_by_address`
//! index are two stores not named explicitly elsewhere — see DESIGN.md for
//! why accepts get their own keyspace here.

use crate::{
    codec::{StoreGet, StorePut},
    config::Config,
    error::StoreError,
    version_list::VersionList,
};
use services_chain::{
    parameters::Network,
    records::{Alias, Certificate, Escrow, Message, Offer, OfferAccept, Versioned},
    serialization::{BitcoinDeserialize, BitcoinSerialize},
    Guid,
};
use std::marker::PhantomData;

/// A single service's append-only, guid-keyed version history, persisted
/// in its own sled tree.
pub struct ServiceStore<T> {
    tree: sled::Tree,
    _marker: PhantomData<T>,
}

impl<T> ServiceStore<T>
where
T: Versioned + Clone + BitcoinSerialize + BitcoinDeserialize,
{
    fn open(db: &sled::Db, tree_name: &'static str) -> Result<Self, StoreError> {
        Ok(ServiceStore {
                tree: db.open_tree(tree_name)?,
                _marker: PhantomData,
        })
    }

    pub fn version_list(&self, guid: &Guid) -> Result<VersionList<T>, StoreError> {
        Ok(self
            .tree
            .store_get::<Guid, VersionList<T>>(guid)?
            .unwrap_or_else(VersionList::new))
    }

    pub fn current(&self, guid: &Guid) -> Result<Option<T>, StoreError> {
        Ok(self.version_list(guid)?.current().cloned())
    }

    pub fn exists(&self, guid: &Guid) -> Result<bool, StoreError> {
        Ok(!self.version_list(guid)?.is_empty())
    }

    /// The version that was current *as of* `at_height`: the last stored
    /// entry whose own height is `<= at_height`. Used for any height-pinned
    /// lookup — a currency peg, for instance, is always resolved against a
    /// transaction's accept height rather than the current tip.
    pub fn version_at(
        &self,
        guid: &Guid,
        at_height: services_chain::height::Height) -> Result<Option<T>, StoreError> {
        let list = self.version_list(guid)?;
        Ok(list
            .history()
            .iter()
            .rev()
            .find(|record| record.height <= at_height)
            .cloned())
    }

    /// Append-with-replace (see [`VersionList::put`]) and persist. Only
    /// ever called from connect mode; the validator must never mutate
    /// persistent state while just checking a transaction.
    pub fn put(&self, guid: &Guid, record: T) -> Result<(), StoreError> {
        let mut list = self.version_list(guid)?;
        list.put(record);
        self.tree.store_insert(guid, &list)
    }

    pub fn history(&self, guid: &Guid) -> Result<Vec<T>, StoreError> {
        Ok(self.version_list(guid)?.history().to_vec())
    }

    /// Every guid's current version, for the query surface (C9). Lazy:
    /// each `.next()` call does one more sled read, so callers can pair it
    /// with [`crate::query::Scan`]'s cooperative cancellation.
    pub fn iter_current(&self) -> impl Iterator<Item = Result<(Guid, T), StoreError>> + '_ {
        self.tree.iter().filter_map(move |entry| {
                let (key, value) = match entry {
                    Ok(kv) => kv,
                    Err(e) => return Some(Err(StoreError::from(e))),
                };
                let guid = match Guid::bitcoin_deserialize(&key[..]) {
                    Ok(g) => g,
                    Err(e) => return Some(Err(StoreError::from(e))),
                };
                let list = match VersionList::<T>::bitcoin_deserialize(&value[..]) {
                    Ok(l) => l,
                    Err(e) => return Some(Err(StoreError::from(e))),
                };
                list.current().cloned().map(|record| Ok((guid, record)))
        })
    }
}

/// The secondary `address → alias name` index: enforces that the address
/// derived from an alias's public key is uniquely owned by at most one
/// alias. Kept as plain bytes rather than going through the `Guid`-keyed
/// [`ServiceStore`] machinery, since its key is a hash160, not a guid.
pub struct AliasAddressIndex {
    tree: sled::Tree,
}

impl AliasAddressIndex {
    fn open(db: &sled::Db) -> Result<Self, StoreError> {
        Ok(AliasAddressIndex {
                tree: db.open_tree(b"alias_by_address")?,
        })
    }

    pub fn owner_of(&self, address: &[u8; 20]) -> Result<Option<String>, StoreError> {
        match self.tree.get(address)? {
            Some(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            None => Ok(None),
        }
    }

    /// Updated atomically alongside the owning alias's primary entry by
    /// the caller, in the same batch as the primary write.
    pub fn set(&self, address: &[u8; 20], alias_name: &str) -> Result<(), StoreError> {
        self.tree.insert(address, alias_name.as_bytes())?;
        Ok(())
    }

    pub fn remove(&self, address: &[u8; 20]) -> Result<(), StoreError> {
        self.tree.remove(address)?;
        Ok(())
    }
}

/// Every service store bundled together, the handle `services-consensus`'s
/// validator threads through its `ValidatorState`: constructed once at
/// startup rather than resolved from global state.
pub struct Stores {
    pub network: Network,
    pub aliases: ServiceStore<Alias>,
    pub offers: ServiceStore<Offer>,
    pub accepts: ServiceStore<OfferAccept>,
    pub certs: ServiceStore<Certificate>,
    pub escrows: ServiceStore<Escrow>,
    pub messages: ServiceStore<Message>,
    pub alias_by_address: AliasAddressIndex,
    // Keeps the underlying sled database alive for as long as the trees
    // opened from it.
    _db: sled::Db,
}

impl Stores {
    pub fn open(config: &Config, network: Network) -> Result<Self, StoreError> {
        let db = config.sled_config(network).open()?;
        Ok(Stores {
                network,
                aliases: ServiceStore::open(&db, "namei")?,
                offers: ServiceStore::open(&db, "offeri")?,
                accepts: ServiceStore::open(&db, "accepti")?,
                certs: ServiceStore::open(&db, "certi")?,
                escrows: ServiceStore::open(&db, "escrowi")?,
                messages: ServiceStore::open(&db, "messagei")?,
                alias_by_address: AliasAddressIndex::open(&db)?,
                _db: db,
        })
    }
}
