//! The query surface: deterministic scans over C5 state
//! plus the chain tip, with no network I/O.

use crate::{error::StoreError, store::Stores};
use services_chain::{
    constants::{SAFETY_LEVEL1, SAFETY_LEVEL2},
    height::Height,
    records::{Alias, Certificate, Offer},
    Guid,
};
use std::sync::atomic::{AtomicBool, Ordering};

/// A lazy, cancellable scan over a service store. Checks a cooperative
/// interruption flag at each iteration. Yields items one at a time so a
/// scan can be cut off mid-iteration instead of discarding a half-built
/// result vector.
pub struct Scan<'a, I> {
    inner: I,
    should_stop: &'a AtomicBool,
    limit: usize,
    yielded: usize,
    cancelled: bool,
}

impl<'a, I, T> Scan<'a, I>
where
I: Iterator<Item = Result<T, StoreError>>,
{
    fn new(inner: I, should_stop: &'a AtomicBool, limit: usize) -> Self {
        Scan {
            inner,
            should_stop,
            limit,
            yielded: 0,
            cancelled: false,
        }
    }
}

impl<'a, I, T> Iterator for Scan<'a, I>
where
I: Iterator<Item = Result<T, StoreError>>,
{
    type Item = Result<T, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cancelled || self.yielded >= self.limit {
            return None;
        }
        if self.should_stop.load(Ordering::Relaxed) {
            self.cancelled = true;
            return Some(Err(StoreError::Cancelled));
        }
        match self.inner.next() {
            Some(item) => {
                self.yielded += 1;
                Some(item)
            }
            None => None,
        }
    }
}

/// Case-insensitivity extends to every regex scan: both sides are
/// lowercased before matching.
fn matches(pattern: &regex::Regex, haystack: &[u8]) -> bool {
    pattern.is_match(&String::from_utf8_lossy(haystack).to_lowercase())
}

/// A `safe_search` toggle filtering entries with `safety_level >=
/// SAFETY_LEVEL1` and those whose owning alias fails the same check.
fn passes_safe_search(safe_search: bool, safety_level: u8) -> bool {
    !safe_search || safety_level < SAFETY_LEVEL1
}

fn owner_passes_safe_search(stores: &Stores, safe_search: bool, owner: &Guid) -> bool {
    if !safe_search {
        return true;
    }
    match stores.aliases.current(owner) {
        Ok(Some(alias)) => alias.safety_level < SAFETY_LEVEL2,
        _ => true,
    }
}

impl Stores {
    /// Search alias names by regex over the name field.
    pub fn search_aliases<'a>(
        &'a self,
        pattern: &'a regex::Regex,
        safe_search: bool,
        tip: Height,
        limit: usize,
        should_stop: &'a AtomicBool) -> Scan<'a, impl Iterator<Item = Result<(Guid, Alias), StoreError>> + 'a> {
        let iter = self.aliases.iter_current().filter(move |entry| {
                let Ok((guid, alias)) = entry else { return true };
                matches(pattern, alias.name.as_bytes())
                && passes_safe_search(safe_search, alias.safety_level)
                && !self.alias_expired(guid, tip).unwrap_or(false)
        });
        Scan::new(iter, should_stop, limit)
    }

    /// Search offer titles by regex.
    pub fn search_offers<'a>(
        &'a self,
        pattern: &'a regex::Regex,
        safe_search: bool,
        tip: Height,
        limit: usize,
        should_stop: &'a AtomicBool) -> Scan<'a, impl Iterator<Item = Result<(Guid, Offer), StoreError>> + 'a> {
        let iter = self.offers.iter_current().filter(move |entry| {
                let Ok((guid, offer)) = entry else { return true };
                matches(pattern, &offer.title)
                && passes_safe_search(safe_search, offer.safety_level)
                && owner_passes_safe_search(self, safe_search, &offer.alias)
                && !self.offer_expired(guid, tip).unwrap_or(false)
        });
        Scan::new(iter, should_stop, limit)
    }

    /// Filter offers by category prefix.
    pub fn offers_by_category<'a>(
        &'a self,
        prefix: &'a [u8],
        safe_search: bool,
        tip: Height,
        limit: usize,
        should_stop: &'a AtomicBool) -> Scan<'a, impl Iterator<Item = Result<(Guid, Offer), StoreError>> + 'a> {
        let iter = self.offers.iter_current().filter(move |entry| {
                let Ok((guid, offer)) = entry else { return true };
                offer.category.starts_with(prefix)
                && passes_safe_search(safe_search, offer.safety_level)
                && !self.offer_expired(guid, tip).unwrap_or(false)
        });
        Scan::new(iter, should_stop, limit)
    }

    /// Filter certificates by category prefix.
    pub fn certs_by_category<'a>(
        &'a self,
        prefix: &'a [u8],
        safe_search: bool,
        tip: Height,
        limit: usize,
        should_stop: &'a AtomicBool) -> Scan<'a, impl Iterator<Item = Result<(Guid, Certificate), StoreError>> + 'a> {
        let iter = self.certs.iter_current().filter(move |entry| {
                let Ok((guid, cert)) = entry else { return true };
                cert.category.starts_with(prefix)
                && passes_safe_search(safe_search, cert.safety_level)
                && !self.cert_expired(guid, tip).unwrap_or(false)
        });
        Scan::new(iter, should_stop, limit)
    }

    /// Wallet-facing listings iterate wallet transactions, decode service
    /// ops, and join against C5; that transaction walk is an external
    /// collaborator's job. This half of the join looks up an
    /// already-known guid.
    pub fn offers_by_owner<'a>(
        &'a self,
        owner_guids: &'a [Guid],
        tip: Height,
        limit: usize,
        should_stop: &'a AtomicBool) -> Scan<'a, impl Iterator<Item = Result<(Guid, Offer), StoreError>> + 'a> {
        let iter = owner_guids.iter().filter_map(move |guid| {
                match self.offers.current(guid) {
                    Ok(Some(offer)) => {
                        if self.offer_expired(guid, tip).unwrap_or(false) {
                            None
                        } else {
                            Some(Ok((guid.clone(), offer)))
                        }
                    }
                    Ok(None) => None,
                    Err(e) => Some(Err(e)),
                }
        });
        Scan::new(iter, should_stop, limit)
    }

    /// Every stored version for a guid, in insertion order.
    pub fn alias_history(&self, guid: &Guid) -> Result<Vec<Alias>, StoreError> {
        self.aliases.history(guid)
    }

    pub fn offer_history(&self, guid: &Guid) -> Result<Vec<Offer>, StoreError> {
        self.offers.history(guid)
    }

    pub fn cert_history(&self, guid: &Guid) -> Result<Vec<Certificate>, StoreError> {
        self.certs.history(guid)
    }
}
