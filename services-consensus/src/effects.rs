//! Side-effect engine. Invoked only in connect mode,
//! idempotently: re-running the same transaction's side effects must
//! yield identical state, which falls out of [`services_store::VersionList`]'s
//! append-with-replace-by-key `put` as long as every side effect stamps
//! its mutated record with the connecting transaction's own `(height,
    //! txid)`.

use crate::documents::{BanDocument, PegDocument};
use services_chain::{
    feedback::FeedbackUser, guid::Guid, height::Height, records::Alias, transaction::Txid,
};
use services_store::{Stores, StoreError};

/// Apply `delta` (negative on accept/escrow-activate, positive on
/// escrow-refund) to an offer's quantity, saturating at 0, then propagate
/// the *new absolute quantity* to the offer's parent (if linked) and
/// every sibling in the parent's child list, synchronously within the
/// same call. Unlimited offers (`quantity == -1`) are never mutated.
pub fn apply_quantity_delta(
    stores: &Stores,
    offer_guid: &Guid,
    delta: i64,
    height: Height,
    txid: Txid) -> Result<(), StoreError> {
    let Some(mut offer) = stores.offers.current(offer_guid)? else {
        return Ok(());
    };
    if offer.quantity == -1 {
        return Ok(());
    }
    let new_quantity = (offer.quantity + delta).max(0);
    offer.quantity = new_quantity;
    offer.height = height;
    offer.txid = txid;
    let linked_parent = offer.linked_offer.clone();
    let is_linked = offer.is_linked();
    stores.offers.put(offer_guid, offer)?;

    if is_linked {
        propagate_quantity(stores, &linked_parent, new_quantity, height, txid)?;
    }
    Ok(())
}

/// "cascade... to the parent... and to every offer in the
/// parent's child list." Sets the *absolute* quantity, since linked
/// offers share the parent's remaining stock rather than tracking an
/// independent count.
fn propagate_quantity(
    stores: &Stores,
    parent_guid: &Guid,
    quantity: i64,
    height: Height,
    txid: Txid) -> Result<(), StoreError> {
    if parent_guid.is_empty() {
        return Ok(());
    }
    let Some(mut parent) = stores.offers.current(parent_guid)? else {
        return Ok(());
    };
    if parent.quantity != -1 {
        parent.quantity = quantity;
    }
    parent.height = height;
    parent.txid = txid;
    let children = parent.children.clone();
    stores.offers.put(parent_guid, parent)?;

    for child_guid in children {
        if child_guid == *parent_guid {
            continue;
        }
        if let Some(mut child) = stores.offers.current(&child_guid)? {
            if child.quantity != -1 {
                child.quantity = quantity;
            }
            child.height = height;
            child.txid = txid;
            stores.offers.put(&child_guid, child)?;
        }
    }
    Ok(())
}

/// If the first-rating guard passes, adds `rating` to the target alias's
/// role-specific (sum, count) pair. `rating == 0` is a valid,
/// no-op-on-reputation feedback item — callers pass it through
/// unconditionally so the height/txid stamp still advances even when the
/// rating itself doesn't move the aggregate.
pub fn apply_rating(
    stores: &Stores,
    alias_guid: &Guid,
    role: FeedbackUser,
    rating: u8,
    height: Height,
    txid: Txid) -> Result<(), StoreError> {
    let Some(mut alias) = stores.aliases.current(alias_guid)? else {
        return Ok(());
    };
    match role {
        FeedbackUser::BUYER => alias.rating_buyer.add(rating),
        FeedbackUser::SELLER => alias.rating_seller.add(rating),
        FeedbackUser::ARBITER => alias.rating_arbiter.add(rating),
        _ => return Ok(()),
    }
    alias.height = height;
    alias.txid = txid;
    stores.aliases.put(alias_guid, alias)?;
    Ok(())
}

/// Writes to the `sysban` alias re-parse its public value as a ban list
/// and set `safety_level` on the listed aliases, certs, and offers;
/// offer bans cascade to every child in the offer's link list.
pub fn apply_ban_propagation(
    stores: &Stores,
    ban_alias: &Alias,
    height: Height,
    txid: Txid) -> Result<(), StoreError> {
    let Ok(doc) = serde_json::from_slice::<BanDocument>(&ban_alias.public_value) else {
        return Ok(());
    };

    for entry in &doc.aliases {
        let guid = Guid(hex::decode(&entry.id).unwrap_or_else(|_| entry.id.clone().into_bytes()));
        if let Some(mut alias) = stores.aliases.current(&guid)? {
            alias.safety_level = entry.severity;
            alias.height = height;
            alias.txid = txid;
            stores.aliases.put(&guid, alias)?;
        }
    }
    for entry in &doc.certs {
        let guid = Guid(hex::decode(&entry.id).unwrap_or_else(|_| entry.id.clone().into_bytes()));
        if let Some(mut cert) = stores.certs.current(&guid)? {
            cert.safety_level = entry.severity;
            cert.height = height;
            cert.txid = txid;
            stores.certs.put(&guid, cert)?;
        }
    }
    for entry in &doc.offers {
        let guid = Guid(hex::decode(&entry.id).unwrap_or_else(|_| entry.id.clone().into_bytes()));
        ban_offer_and_children(stores, &guid, entry.severity, height, txid)?;
    }
    Ok(())
}

fn ban_offer_and_children(
    stores: &Stores,
    guid: &Guid,
    severity: u8,
    height: Height,
    txid: Txid) -> Result<(), StoreError> {
    let Some(mut offer) = stores.offers.current(guid)? else {
        return Ok(());
    };
    offer.safety_level = severity;
    offer.height = height;
    offer.txid = txid;
    let children = offer.children.clone();
    stores.offers.put(guid, offer)?;
    for child in children {
        if let Some(mut child_offer) = stores.offers.current(&child)? {
            child_offer.safety_level = severity;
            child_offer.height = height;
            child_offer.txid = txid;
            stores.offers.put(&child, child_offer)?;
        }
    }
    Ok(())
}

/// Reads the `sysrates.peg` alias's public value as of the transaction's
/// height, applies `amount*rate*COIN` with the `precision` field, and
/// returns 0 if precision > 8. Returns `None` if the peg alias or the
/// requested currency isn't resolvable at that height.
pub fn convert_currency_at_height(
    stores: &Stores,
    peg_alias: &Guid,
    currency: &[u8],
    amount_in_currency: f64,
    coin: i64,
    at_height: Height) -> Result<Option<i64>, StoreError> {
    let Some(peg) = stores.aliases.version_at(peg_alias, at_height)? else {
        return Ok(None);
    };
    let Ok(doc) = serde_json::from_slice::<PegDocument>(&peg.public_value) else {
        return Ok(None);
    };
    let currency = String::from_utf8_lossy(currency);
    Ok(doc
        .rate_for(&currency)
        .map(|rate| rate.convert_to_chain_unit(amount_in_currency, coin)))
}
