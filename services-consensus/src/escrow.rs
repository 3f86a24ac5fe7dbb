//! Escrow activate/release/refund/complete validation.
//!
//! The arg vector is `[escrowGuid, status("0"|"1"), commitment]`: status
//! distinguishes a transition (0) from a claim against it (1). Only
//! `check_escrow_complete` needs it; activate/release/refund each have a
//! single status value and take it as a hard-coded assumption of their
//! caller (the dispatcher).

use crate::{
    effects,
    error::{EscrowError, Outcome},
    offer,
    prevout::PreviousServiceInputs,
    state::{Mode, ValidatorState},
};
use services_chain::{
    feedback::{Feedback, FeedbackUser},
    guid::Guid,
    height::Height,
    records::{Escrow, EscrowOp},
    transaction::Txid,
    utxo::{BlockSource, UtxoView},
};

/// Activate: parties exist, offer exists and is purchasable,
/// quantity is deducted (cascading to parent/siblings via [`effects`]), and
/// the offer's price is pinned at `record.accept_height`.
pub fn check_escrow_activate<U: UtxoView>(
    state: &mut ValidatorState<U>,
    mode: Mode,
    record: Escrow) -> Result<Outcome, EscrowError> {
    for alias in [&record.buyer_alias, &record.seller_alias, &record.arbiter_alias] {
        let exists = state.stores.aliases.exists(alias).map_err(EscrowError::from)?;
        if !exists {
            if mode.is_connect() {
                return Ok(Outcome::SoftSkipped {
                        reason: "escrow party alias not yet connected".into(),
                });
            }
            return Err(EscrowError::PartyNotFound);
        }
    }

    let Some(offer) = state
    .stores
    .offers
    .current(&record.offer_guid)
    .map_err(EscrowError::from)?
    else {
        if mode.is_connect() {
            return Ok(Outcome::SoftSkipped {
                    reason: "escrowed offer not yet connected".into(),
            });
        }
        return Err(EscrowError::OfferNotFound);
    };
    if offer.is_wanted() {
        return Err(EscrowError::OfferNotPurchasable);
    }

    if !mode.is_connect() {
        return Ok(Outcome::Applied);
    }

    let height = record.height;
    let txid = record.txid;
    effects::apply_quantity_delta(
        state.stores,
        &record.offer_guid,
        -(record.qty as i64),
        height,
        txid)
    .map_err(EscrowError::from)?;

    let guid = record.guid.clone();
    state.stores.escrows.put(&guid, record).map_err(EscrowError::from)?;
    Ok(Outcome::Applied)
}

/// Authorization check shared by release/refund: the previous alias input
/// must name one of `candidates` ("Authorization is by alias
    /// input matching the `vchLinkAlias` in the payload").
fn authorized_by_any(prev: &PreviousServiceInputs, candidates: &[&Guid]) -> bool {
    match prev.alias_guid() {
        Some(guid) => candidates.iter().any(|candidate| *candidate == guid),
        None => false,
    }
}

/// "RELEASE (status 0)": authorized by buyer or arbiter on an
/// active escrow; re-releasing (escrow already released) requires arbiter.
pub fn check_escrow_release<U: UtxoView>(
    state: &mut ValidatorState<U>,
    mode: Mode,
    prev: &PreviousServiceInputs,
    guid: &Guid,
    raw_tx: Vec<u8>,
    height: Height,
    txid: Txid) -> Result<Outcome, EscrowError> {
    let Some(mut escrow) = state.stores.escrows.current(guid).map_err(EscrowError::from)? else {
        if mode.is_connect() {
            return Ok(Outcome::SoftSkipped {
                    reason: "escrow not yet connected".into(),
            });
        }
        return Err(EscrowError::NotFound);
    };

    match escrow.op {
        EscrowOp::ACTIVATE => {
            if !authorized_by_any(prev, &[&escrow.buyer_alias, &escrow.arbiter_alias]) {
                return Err(EscrowError::WrongParty);
            }
        }
        EscrowOp::RELEASE => {
            if !authorized_by_any(prev, &[&escrow.arbiter_alias]) {
                return Err(EscrowError::RereleaseNeedsArbiter);
            }
        }
        _ => return Err(EscrowError::NotActive),
    }

    if !mode.is_connect() {
        return Ok(Outcome::Applied);
    }

    escrow.op = EscrowOp::RELEASE;
    escrow.raw_tx = raw_tx;
    escrow.height = height;
    escrow.txid = txid;
    state.stores.escrows.put(guid, escrow).map_err(EscrowError::from)?;
    Ok(Outcome::Applied)
}

/// "REFUND (status 0)": authorized by seller or arbiter;
/// re-refunding requires arbiter; on the first refund, restore the
/// deducted quantity to the offer (and parent/siblings).
pub fn check_escrow_refund<U: UtxoView>(
    state: &mut ValidatorState<U>,
    mode: Mode,
    prev: &PreviousServiceInputs,
    guid: &Guid,
    raw_tx: Vec<u8>,
    height: Height,
    txid: Txid) -> Result<Outcome, EscrowError> {
    let Some(mut escrow) = state.stores.escrows.current(guid).map_err(EscrowError::from)? else {
        if mode.is_connect() {
            return Ok(Outcome::SoftSkipped {
                    reason: "escrow not yet connected".into(),
            });
        }
        return Err(EscrowError::NotFound);
    };

    let first_refund = match escrow.op {
        EscrowOp::ACTIVATE => {
            if !authorized_by_any(prev, &[&escrow.seller_alias, &escrow.arbiter_alias]) {
                return Err(EscrowError::WrongParty);
            }
            true
        }
        EscrowOp::REFUND => {
            if !authorized_by_any(prev, &[&escrow.arbiter_alias]) {
                return Err(EscrowError::RerefundNeedsArbiter);
            }
            false
        }
        _ => return Err(EscrowError::NotRefundable),
    };

    if !mode.is_connect() {
        return Ok(Outcome::Applied);
    }

    if first_refund {
        effects::apply_quantity_delta(
            state.stores,
            &escrow.offer_guid,
            escrow.qty as i64,
            height,
            txid)
        .map_err(EscrowError::from)?;
    }

    escrow.op = EscrowOp::REFUND;
    escrow.raw_tx = raw_tx;
    escrow.height = height;
    escrow.txid = txid;
    state.stores.escrows.put(guid, escrow).map_err(EscrowError::from)?;
    Ok(Outcome::Applied)
}

/// The fee an arbiter earns on a release: `max(0.5% * value, minRelayFee)`.
pub fn arbiter_fee(value: i64, min_relay_fee: i64) -> i64 {
    (((value as f64) * 0.005) as i64).max(min_relay_fee)
}

fn pays_at_least(
    outputs: &[services_chain::transparent::Output],
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

/// "COMPLETE (status 0, prior op RELEASE)" and "COMPLETE after
/// REFUND (status 1, prior op REFUND)": claims a release or refund by
/// checking the raw settlement transaction (resolved through `source`)
/// pays the expected parties, then stamps the escrow COMPLETE.
pub fn check_escrow_settlement<U: UtxoView, B: BlockSource>(
    state: &mut ValidatorState<U>,
    mode: Mode,
    prev: &PreviousServiceInputs,
    source: &B,
    guid: &Guid,
    raw_tx_hex: &str,
    min_relay_fee: i64,
    coin: i64,
    height: Height,
    txid: Txid) -> Result<Outcome, EscrowError> {
    let Some(mut escrow) = state.stores.escrows.current(guid).map_err(EscrowError::from)? else {
        if mode.is_connect() {
            return Ok(Outcome::SoftSkipped {
                    reason: "escrow not yet connected".into(),
            });
        }
        return Err(EscrowError::NotFound);
    };

    let claiming_release = match escrow.op {
        EscrowOp::RELEASE => {
            if !authorized_by_any(prev, &[&escrow.seller_alias]) {
                return Err(EscrowError::WrongParty);
            }
            true
        }
        EscrowOp::REFUND => {
            if !authorized_by_any(prev, &[&escrow.buyer_alias]) {
                return Err(EscrowError::WrongParty);
            }
            false
        }
        _ => return Err(EscrowError::NotReleasedOrRefunded),
    };

    let Some(offer) = state
    .stores
    .offers
    .current(&escrow.offer_guid)
    .map_err(EscrowError::from)?
    else {
        if mode.is_connect() {
            return Ok(Outcome::SoftSkipped {
                    reason: "escrowed offer not yet connected".into(),
            });
        }
        return Err(EscrowError::OfferNotFound);
    };

    let Some(resolved) = offer::resolve_accept_price(
        state,
        &offer,
        &escrow.buyer_alias,
        escrow.accept_height,
        coin)
    .map_err(|_| EscrowError::OfferNotFound)?
    else {
        if mode.is_connect() {
            return Ok(Outcome::SoftSkipped {
                    reason: "escrow price could not be resolved at accept height".into(),
            });
        }
        return Err(EscrowError::OfferNotFound);
    };

    let sale_total = resolved.buyer_price_per_unit * escrow.qty as i64;
    let fee = arbiter_fee(sale_total, min_relay_fee);

    let outputs = source
    .raw_transaction_paid(raw_tx_hex)
    .map_err(|_| EscrowError::SettlementAmountMismatch)?;

    if claiming_release {
        let Some(merchant) = state
        .stores
        .aliases
        .current(&resolved.merchant_alias)
        .map_err(EscrowError::from)?
        .and_then(|a| a.pubkey_address(state.stores.network))
        else {
            return Err(EscrowError::SettlementAmountMismatch);
        };
        let Some(arbiter) = state
        .stores
        .aliases
        .current(&escrow.arbiter_alias)
        .map_err(EscrowError::from)?
        .and_then(|a| a.pubkey_address(state.stores.network))
        else {
            return Err(EscrowError::SettlementAmountMismatch);
        };
        if !pays_at_least(&outputs, &merchant, sale_total) || !pays_at_least(&outputs, &arbiter, fee) {
            return Err(EscrowError::SettlementAmountMismatch);
        }
        if resolved.affiliate_commission_per_unit > 0 {
            let commission_total = resolved.affiliate_commission_per_unit * escrow.qty as i64;
            if let Some(affiliate) = state
            .stores
            .aliases
            .current(&offer.alias)
            .map_err(EscrowError::from)?
            .and_then(|a| a.pubkey_address(state.stores.network))
            {
                if !pays_at_least(&outputs, &affiliate, commission_total) {
                    return Err(EscrowError::SettlementAmountMismatch);
                }
            }
        }
    } else {
        // A seller-initiated refund skips the arbiter payout: the buyer
        // gets back the full sale amount plus the fee the arbiter would
        // otherwise have earned.
        let Some(buyer) = state
        .stores
        .aliases
        .current(&escrow.buyer_alias)
        .map_err(EscrowError::from)?
        .and_then(|a| a.pubkey_address(state.stores.network))
        else {
            return Err(EscrowError::SettlementAmountMismatch);
        };
        if !pays_at_least(&outputs, &buyer, sale_total + fee) {
            return Err(EscrowError::SettlementAmountMismatch);
        }
    }

    if !mode.is_connect() {
        return Ok(Outcome::Applied);
    }

    escrow.op = EscrowOp::COMPLETE;
    escrow.raw_tx = hex::decode(raw_tx_hex).unwrap_or_else(|_| raw_tx_hex.as_bytes().to_vec());
    escrow.height = height;
    escrow.txid = txid;
    state.stores.escrows.put(guid, escrow).map_err(EscrowError::from)?;
    Ok(Outcome::Applied)
}

/// COMPLETE with feedback (status 1, prior op COMPLETE): rules mirror
/// offer-accept feedback (no self-rating, rating <= 5, <= 10 items
/// per role, first rating counts).
pub fn check_escrow_feedback<U: UtxoView>(
    state: &mut ValidatorState<U>,
    mode: Mode,
    prev: &PreviousServiceInputs,
    guid: &Guid,
    from: FeedbackUser,
    to: FeedbackUser,
    mut rating: u8,
    text: Vec<u8>,
    height: Height,
    txid: Txid) -> Result<Outcome, EscrowError> {
    if from == to {
        return Err(EscrowError::SelfFeedback);
    }
    if rating > 5 {
        return Err(EscrowError::InvalidRating);
    }

    let Some(mut escrow) = state.stores.escrows.current(guid).map_err(EscrowError::from)? else {
        if mode.is_connect() {
            return Ok(Outcome::SoftSkipped {
                    reason: "escrow not yet connected".into(),
            });
        }
        return Err(EscrowError::NotFound);
    };
    if escrow.op != EscrowOp::COMPLETE {
        return Err(EscrowError::NotReleasedOrRefunded);
    }

    let authorizing = match from {
        FeedbackUser::BUYER => &escrow.buyer_alias,
        FeedbackUser::SELLER => &escrow.seller_alias,
        FeedbackUser::ARBITER => &escrow.arbiter_alias,
        _ => return Err(EscrowError::WrongParty),
    };
    if !authorized_by_any(prev, &[authorizing]) {
        return Err(EscrowError::WrongParty);
    }

    if escrow.feedback.iter().filter(|f| f.from == from).count()
    >= services_chain::constants::MAX_FEEDBACK_PER_ROLE
    {
        return Err(EscrowError::FeedbackLimitReached);
    }

    let already_rated = escrow.feedback.iter().any(|f| f.from == from && f.rating > 0);
    if already_rated {
        rating = 0;
    }

    if !mode.is_connect() {
        return Ok(Outcome::Applied);
    }

    let target_alias = match to {
        FeedbackUser::BUYER => Some(escrow.buyer_alias.clone()),
        FeedbackUser::SELLER => Some(escrow.seller_alias.clone()),
        FeedbackUser::ARBITER => Some(escrow.arbiter_alias.clone()),
        _ => None,
    };
    if !already_rated {
        if let Some(target) = target_alias {
            effects::apply_rating(state.stores, &target, to, rating, height, txid)
            .map_err(EscrowError::from)?;
        }
    }

    escrow.feedback.push(Feedback {
            from,
            to,
            rating,
            text,
            height,
            txid,
    });
    escrow.height = height;
    escrow.txid = txid;
    state.stores.escrows.put(guid, escrow).map_err(EscrowError::from)?;
    Ok(Outcome::Applied)
}
