//! Offer activate/update validation and the purchase/
//! feedback transition.

use crate::{
    effects,
    error::{Outcome, OfferError},
    prevout::PreviousServiceInputs,
    state::{Mode, ValidatorState},
};
use services_chain::{
    constants::{payment_options, WHITELIST_CLEAR_ALL},
    feedback::{Feedback, FeedbackUser},
    guid::Guid,
    height::Height,
    records::{Offer, OfferAccept},
    transparent::{Output, ToAddressWithNetwork},
    utxo::UtxoView,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OfferOp {
    Activate,
    Update,
}

/// Validates an offer activate or update, resolving the owning alias from
/// the transaction's previous service input and applying the category,
/// peg, and linked-offer checks shared by both operations.
pub fn check_offer_inputs<U: UtxoView>(
    state: &mut ValidatorState<U>,
    mode: Mode,
    prev: &PreviousServiceInputs,
    op: OfferOp,
    mut record: Offer) -> Result<Outcome, OfferError> {
    if prev.alias_guid() != Some(&record.alias) {
        return Err(OfferError::AliasInputMismatch);
    }
    if record.quantity < -1 {
        return Err(OfferError::InvalidQuantity);
    }
    if !matches!(
        record.payment_options,
        payment_options::SYS | payment_options::BTC | payment_options::SYS_AND_BTC
    ) {
        return Err(OfferError::InvalidPaymentOptions);
    }

    let guid = record.guid.clone();
    let prior = state.stores.offers.current(&guid).map_err(OfferError::from)?;

    let mut new_parent_child: Option<Guid> = None;

    if record.is_linked() {
        let parent_guid = record.linked_offer.clone();
        let Some(parent) = state
        .stores
        .offers
        .current(&parent_guid)
        .map_err(OfferError::from)?
        else {
            if mode.is_connect() {
                return Ok(Outcome::SoftSkipped {
                        reason: "linked offer's parent not yet connected".into(),
                });
            }
            return Err(OfferError::ParentNotFound);
        };
        if parent.is_linked() {
            return Err(OfferError::ParentIsLinked);
        }
        if parent.is_wanted() {
            return Err(OfferError::ParentIsWanted);
        }

        // "if parent whitelist is exclusive mode, this
        // offer's controlling alias must be present in it and
        // `commission >= -discountPct`; else commission >= 0."
        if parent.whitelist.exclusive {
            let entry = parent
            .whitelist
            .find(&record.alias)
            .ok_or(OfferError::NotWhitelisted)?;
            if i32::from(record.commission) < -i32::from(entry.discount_pct) {
                return Err(OfferError::InvalidCommission);
            }
        } else if record.commission < 0 {
            return Err(OfferError::InvalidCommission);
        }

        if op == OfferOp::Activate {
            // "certain parent fields are copied (quantity,
                // certificate, alias-peg, payment options if parent is
                // BTC-only, price)."
            record.quantity = parent.quantity;
            record.cert = parent.cert.clone();
            record.alias_peg = parent.alias_peg.clone();
            if parent.payment_options == payment_options::BTC {
                record.payment_options = parent.payment_options;
            }
            record.price = parent.price;

            if parent.children_at_capacity() {
                return Err(OfferError::ChildrenAtCapacity);
            }
            new_parent_child = Some(parent_guid);
        }
    } else if !record.commission_in_bounds() {
        return Err(OfferError::InvalidCommission);
    }

    if record.has_cert() {
        if record.quantity != 1 {
            return Err(OfferError::InvalidCertQuantity);
        }
        let Some(cert) = state
        .stores
        .certs
        .current(&record.cert)
        .map_err(OfferError::from)?
        else {
            if mode.is_connect() {
                return Ok(Outcome::SoftSkipped {
                        reason: "offer's certificate not yet connected".into(),
                });
            }
            return Err(OfferError::CertNotFound);
        };
        if cert.owner_alias != record.alias {
            return Err(OfferError::CertOwnerMismatch);
        }
    }

    if record.price.value() <= 0 {
        return Err(OfferError::InvalidPrice);
    }

    if !record.currency_code.eq_ignore_ascii_case(b"SYS") {
        let peg = state
        .stores
        .aliases
        .version_at(&record.alias_peg, record.height)
        .map_err(OfferError::from)?;
        match peg {
            None => {
                if mode.is_connect() {
                    return Ok(Outcome::SoftSkipped {
                            reason: "currency peg alias not yet connected".into(),
                    });
                }
                return Err(OfferError::UnresolvableCurrency);
            }
            Some(peg) => {
                let doc: Option<crate::documents::PegDocument> =
                serde_json::from_slice(&peg.public_value).ok();
                let currency = String::from_utf8_lossy(&record.currency_code).into_owned();
                let resolvable = doc.as_ref().and_then(|d| d.rate_for(&currency)).is_some();
                if !resolvable {
                    return Err(OfferError::UnresolvableCurrency);
                }
            }
        }
    }

    match op {
        OfferOp::Activate => {
            if prior.is_some() {
                return Err(OfferError::GuidInUse);
            }
        }
        OfferOp::Update => {
            let Some(prior) = prior.clone() else {
                if mode.is_connect() {
                    return Ok(Outcome::SoftSkipped {
                            reason: "offer not yet connected".into(),
                    });
                }
                return Err(OfferError::NotFound);
            };
            // "UPDATE preserves": child list, parent guid,
            // guid, sold count, safety level, whitelist.
            record.children = prior.children.clone();
            record.linked_offer = prior.linked_offer.clone();
            record.sold = prior.sold;
            record.safety_level = prior.safety_level;
            // "Whitelist is only editable via the whitelist
            // side channel": a non-empty `whitelist.entries` on the update
            // payload is a set of edits against the stored whitelist
            // (upsert by alias, or clear-all on the reserved
                // `WHITELIST_CLEAR_ALL` discount), not a full replacement.
            // Sending an empty entry list leaves the stored whitelist
            // untouched, same as any other "no change" field above.
            record.whitelist = if record.whitelist.entries.is_empty() {
                prior.whitelist.clone()
            } else {
                let mut whitelist = prior.whitelist.clone();
                for entry in &record.whitelist.entries {
                    if i32::from(entry.discount_pct) == i32::from(WHITELIST_CLEAR_ALL) {
                        whitelist.clear();
                    } else {
                        if entry.discount_pct > 99 {
                            return Err(OfferError::InvalidWhitelistDiscount);
                        }
                        whitelist.put(entry.clone());
                    }
                }
                whitelist.exclusive = record.whitelist.exclusive;
                whitelist
            };
            // "empty string in a serialized field means 'no
            // change' — apply the stored value."
            if record.title.is_empty() {
                record.title = prior.title.clone();
            }
            if record.category.is_empty() {
                record.category = prior.category.clone();
            }
            if record.description.is_empty() {
                record.description = prior.description.clone();
            }
            if record.currency_code.is_empty() {
                record.currency_code = prior.currency_code.clone();
            }
            if record.geo_location.is_empty() {
                record.geo_location = prior.geo_location.clone();
            }
        }
    }

    if !mode.is_connect() {
        return Ok(Outcome::Applied);
    }

    let height = record.height;
    let txid = record.txid;

    if op == OfferOp::Update && !record.is_linked() {
        propagate_update_to_children(state, &record)?;
    }

    if let Some(parent_guid) = new_parent_child {
        if let Some(mut parent) = state
        .stores
        .offers
        .current(&parent_guid)
        .map_err(OfferError::from)?
        {
            parent.children.push(guid.clone());
            parent.height = height;
            parent.txid = txid;
            state
            .stores
            .offers
            .put(&parent_guid, parent)
            .map_err(OfferError::from)?;
        }
    }

    state.stores.offers.put(&guid, record).map_err(OfferError::from)?;
    Ok(Outcome::Applied)
}

/// When a non-link offer updates price, quantity, currency, certificate,
/// alias-peg, or payment options, apply the same changes to every offer
/// in its child list.
fn propagate_update_to_children<U: UtxoView>(
    state: &mut ValidatorState<U>,
    parent: &Offer) -> Result<(), OfferError> {
    for child_guid in &parent.children {
        if let Some(mut child) = state
        .stores
        .offers
        .current(child_guid)
        .map_err(OfferError::from)?
        {
            child.price = parent.price;
            child.quantity = parent.quantity;
            child.currency_code = parent.currency_code.clone();
            child.cert = parent.cert.clone();
            child.alias_peg = parent.alias_peg.clone();
            child.payment_options = parent.payment_options;
            child.height = parent.height;
            child.txid = parent.txid;
            state
            .stores
            .offers
            .put(child_guid, child)
            .map_err(OfferError::from)?;
        }
    }
    Ok(())
}

/// The fully-resolved price of a purchase, after whitelist discount and
/// currency conversion.
pub struct ResolvedPrice {
    pub buyer_price_per_unit: i64,
    pub affiliate_commission_per_unit: i64,
    /// The alias that receives the sale proceeds: the linked offer's parent
    /// when reselling, else the offer's own alias (e.g. merchant receives
    /// `O1.price * 1`, affiliate receives `O1.price * 0.05`).
    pub merchant_alias: Guid,
}

/// Computes the price the buyer owes and, for a linked offer,
/// the affiliate's commission, both per unit, in the chain's smallest
/// unit, as of `accept_height` (the currency peg is versioned, so this
/// always resolves against the peg version active at that height).
pub fn resolve_accept_price<U: UtxoView>(
    state: &ValidatorState<U>,
    offer: &Offer,
    buyer_alias: &Guid,
    accept_height: Height,
    coin: i64) -> Result<Option<ResolvedPrice>, OfferError> {
    let (pricing_offer, is_linked) = if offer.is_linked() {
        let Some(parent) = state
        .stores
        .offers
        .version_at(&offer.linked_offer, accept_height)
        .map_err(OfferError::from)?
        else {
            return Ok(None);
        };
        (parent, true)
    } else {
        (offer.clone(), false)
    };

    let mut discount_pct: i64 = 0;
    if let Some(entry) = pricing_offer.whitelist.find(buyer_alias) {
        discount_pct = i64::from(entry.discount_pct);
    }

    let price_in_currency = pricing_offer.price.value() as f64;
    let discounted = price_in_currency * (1.0 - (discount_pct as f64) / 100.0);

    let converted = if pricing_offer.currency_code.eq_ignore_ascii_case(b"SYS") {
        Some(discounted as i64)
    } else {
        effects::convert_currency_at_height(
            state.stores,
            &pricing_offer.alias_peg,
            &pricing_offer.currency_code,
            discounted,
            coin,
            accept_height)
        .map_err(OfferError::from)?
    };

    let Some(buyer_price_per_unit) = converted else {
        return Ok(None);
    };

    let affiliate_commission_per_unit = if is_linked {
        let posted_price = if offer.currency_code.eq_ignore_ascii_case(b"SYS") {
            Some(offer.price.value())
        } else {
            effects::convert_currency_at_height(
                state.stores,
                &offer.alias_peg,
                &offer.currency_code,
                offer.price.value() as f64,
                coin,
                accept_height)
            .map_err(OfferError::from)?
        };
        posted_price.unwrap_or(0) - buyer_price_per_unit
    } else {
        0
    };

    Ok(Some(ResolvedPrice {
                buyer_price_per_unit,
                affiliate_commission_per_unit,
                merchant_alias: pricing_offer.alias,
    }))
}

/// Whether `outputs` contains a payment of at least `amount` to the
/// scriptPubKey that pays `address` ("The transaction must
    /// contain an output paying `buyerPrice * qty` to the merchant's
    /// alias-derived address").
fn pays_at_least(
    outputs: &[Output],
    address: &services_chain::transparent::Address,
    amount: i64) -> bool {
    if amount <= 0 {
        return true;
    }
    let expected = address.lock_script();
    outputs
    .iter()
    .any(|out| out.value.value() >= amount && out.lock_script == expected)
}

/// The purchase half of offer-accept.
pub fn check_offer_accept_purchase<U: UtxoView>(
    state: &mut ValidatorState<U>,
    mode: Mode,
    outputs: &[Output],
    coin: i64,
    mut accept: OfferAccept) -> Result<Outcome, OfferError> {
    let Some(offer) = state
    .stores
    .offers
    .current(&accept.offer_guid)
    .map_err(OfferError::from)?
    else {
        if mode.is_connect() {
            return Ok(Outcome::SoftSkipped {
                    reason: "accepted offer not yet connected".into(),
            });
        }
        return Err(OfferError::ParentNotFound);
    };
    if offer.is_wanted() {
        return Err(OfferError::OfferNotPurchasable);
    }
    if accept.qty == 0 {
        return Err(OfferError::InvalidAcceptQuantity);
    }
    if offer.quantity != -1 && accept.qty as i64 > offer.quantity {
        return Err(OfferError::InvalidAcceptQuantity);
    }
    if offer.has_cert() && accept.qty != 1 {
        return Err(OfferError::InvalidCertQuantity);
    }

    if accept.is_btc_payment() {
        // "For BTC-payment offers, the Bitcoin txid is
        // recorded in the accept payload instead and the on-chain payment
        // check is skipped."
    } else {
        let Some(resolved) = resolve_accept_price(
            state,
            &offer,
            &accept.buyer_alias,
            accept.accept_height,
            coin)?
        else {
            if mode.is_connect() {
                return Ok(Outcome::SoftSkipped {
                        reason: "price could not be resolved at accept height".into(),
                });
            }
            return Err(OfferError::UnresolvableCurrency);
        };
        let buyer_total = resolved.buyer_price_per_unit * accept.qty as i64;
        accept.price = services_chain::amount::Amount(buyer_total);

        let Some(merchant_alias) = state
        .stores
        .aliases
        .current(&resolved.merchant_alias)
        .map_err(OfferError::from)?
        else {
            if mode.is_connect() {
                return Ok(Outcome::SoftSkipped {
                        reason: "merchant alias not yet connected".into(),
                });
            }
            return Err(OfferError::ParentNotFound);
        };
        let Some(merchant_address) = merchant_alias.pubkey_address(state.stores.network) else {
            return Err(OfferError::PaymentOutputMissing);
        };
        if !pays_at_least(outputs, &merchant_address, buyer_total) {
            return Err(OfferError::PaymentOutputMissing);
        }

        if offer.is_linked() && resolved.affiliate_commission_per_unit > 0 {
            let commission_total = resolved.affiliate_commission_per_unit * accept.qty as i64;
            // The reseller front itself (`offer.alias`), distinct from
            // `resolved.merchant_alias` which is the parent's.
            let affiliate_address = state
            .stores
            .aliases
            .current(&offer.alias)
            .map_err(OfferError::from)?
            .and_then(|a| a.pubkey_address(state.stores.network));
            if let Some(address) = &affiliate_address {
                if !pays_at_least(outputs, address, commission_total) {
                    return Err(OfferError::PaymentOutputMissing);
                }
            }
        }
    }

    if !mode.is_connect() {
        return Ok(Outcome::Applied);
    }

    let height = accept.height;
    let txid = accept.txid;
    effects::apply_quantity_delta(
        state.stores,
        &offer.guid,
        -(accept.qty as i64),
        height,
        txid)
    .map_err(OfferError::from)?;

    if let Some(mut offer) = state
    .stores
    .offers
    .current(&accept.offer_guid)
    .map_err(OfferError::from)?
    {
        offer.sold += accept.qty;
        offer.height = height;
        offer.txid = txid;
        state
        .stores
        .offers
        .put(&accept.offer_guid, offer)
        .map_err(OfferError::from)?;
    }

    let accept_guid = accept.accept_guid.clone();
    state
    .stores
    .accepts
    .put(&accept_guid, accept)
    .map_err(OfferError::from)?;
    Ok(Outcome::Applied)
}

/// The feedback half of offer-accept.
pub fn check_offer_accept_feedback<U: UtxoView>(
    state: &mut ValidatorState<U>,
    mode: Mode,
    prev: &PreviousServiceInputs,
    accept_guid: &Guid,
    from: FeedbackUser,
    to: FeedbackUser,
    mut rating: u8,
    text: Vec<u8>,
    height: Height,
    txid: services_chain::transaction::Txid) -> Result<Outcome, OfferError> {
    if from == to {
        return Err(OfferError::SelfFeedback);
    }
    if rating > 5 {
        return Err(OfferError::InvalidRating);
    }

    let Some(mut accept) = state
    .stores
    .accepts
    .current(accept_guid)
    .map_err(OfferError::from)?
    else {
        if mode.is_connect() {
            return Ok(Outcome::SoftSkipped {
                    reason: "accept not yet connected".into(),
            });
        }
        return Err(OfferError::AcceptNotFound);
    };

    // "authorization requires an alias input equal to the
    // party claimed in the payload". Only the buyer role is checked
    // against a known alias here; seller/arbiter authorization is
    // resolved by the dispatcher against the offer/escrow record before
    // reaching this function.
    if from == FeedbackUser::BUYER && prev.alias_guid() != Some(&accept.buyer_alias) {
        return Err(OfferError::WrongFeedbackParty);
    }

    if accept.feedback_count_for(from) >= services_chain::constants::MAX_FEEDBACK_PER_ROLE {
        return Err(OfferError::FeedbackLimitReached);
    }

    // "If the sender has already rated, the new rating is
    // forced to 0 (only the first rating counts toward alias reputation)".
    let already_rated = accept.has_rated(from);
    if already_rated {
        rating = 0;
    }

    if !mode.is_connect() {
        return Ok(Outcome::Applied);
    }

    let offer_alias = state
    .stores
    .offers
    .current(&accept.offer_guid)
    .map_err(OfferError::from)?
    .map(|o| o.alias);

    let target_alias = match to {
        FeedbackUser::BUYER => Some(accept.buyer_alias.clone()),
        FeedbackUser::SELLER => offer_alias,
        _ => None,
    };

    if !already_rated {
        if let Some(target) = target_alias {
            effects::apply_rating(state.stores, &target, to, rating, height, txid)
            .map_err(OfferError::from)?;
        }
    }

    accept.feedback.push(Feedback {
            from,
            to,
            rating,
            text,
            height,
            txid,
    });
    accept.height = height;
    accept.txid = txid;
    state
    .stores
    .accepts
    .put(accept_guid, accept)
    .map_err(OfferError::from)?;
    Ok(Outcome::Applied)
}
