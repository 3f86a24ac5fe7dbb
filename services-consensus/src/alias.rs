//! Alias activate/update validation.

use crate::{
    effects,
    error::{AliasError, Outcome},
    prevout::PreviousServiceInputs,
    state::{Mode, ValidatorState},
};
use services_chain::{
    constants::special_aliases, height::Height, records::Alias, utxo::UtxoView, Guid,
};
use tracing::debug;

/// Whether this alias operation is creating the name for the first time
/// ("ACTIVATE") or updating an existing one ("UPDATE").
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AliasOp {
    Activate,
    Update,
}

/// Invoked once per alias-activate/update transaction.
///
/// `record` is the alias state the transaction's `OP_RETURN` payload
/// claims (already commitment-checked by C4); this function checks it
/// against its invariants and, on UPDATE, against the stored prior
/// version, then — in connect mode — commits it.
pub fn check_alias_inputs<U: UtxoView>(
    state: &mut ValidatorState<U>,
    mode: Mode,
    now: Height,
    op: AliasOp,
    mut record: Alias) -> Result<Outcome, AliasError> {
    if record.height > now {
        return Err(AliasError::HeightInFuture);
    }
    if !Alias::name_is_valid(&record.name) && !record.is_special() {
        return Err(AliasError::InvalidName);
    }
    if !record.renewal_is_valid() {
        return Err(AliasError::InvalidRenewal);
    }
    if !record.is_special() && !record.public_value_within_bound() {
        return Err(AliasError::PublicValueTooLong);
    }
    if !record.private_value_within_bound() {
        return Err(AliasError::PrivateValueTooLong);
    }

    let guid = record.guid.clone();
    let prior = state.stores.aliases.current(&guid).map_err(AliasError::from)?;

    match op {
        AliasOp::Activate => {
            if !record.private_key.is_empty() {
                return Err(AliasError::PrivateKeyNotEmpty);
            }
            if prior.is_some() {
                let expired = state
                .stores
                .alias_expired(&guid, now)
                .map_err(AliasError::from)?;
                if !expired {
                    return Err(AliasError::NotExpired);
                }
            }
        }
        AliasOp::Update => {
            let Some(prior) = prior.clone() else {
                return Err(AliasError::NotFound);
            };
            if prior.guid != record.guid || prior.name != record.name {
                return Err(AliasError::InputMismatch);
            }

            // guid, safety level, and rating fields are immutable
            // post-creation; overwrite the claimed values with the stored
            // ones before committing.
            record.safety_level = prior.safety_level;
            record.rating_buyer = prior.rating_buyer;
            record.rating_seller = prior.rating_seller;
            record.rating_arbiter = prior.rating_arbiter;

            if record.pubkey != prior.pubkey {
                // Transfer: if the new public key's derived address
                // already indexes to *another* alias, revert the public
                // key to the database value (soft-reject the transfer).
                let collides_with_another = match record.pubkey_address(state.stores.network) {
                    Some(address) => {
                        let owner = state
                        .stores
                        .alias_by_address
                        .owner_of(&address.hash160())
                        .map_err(AliasError::from)?;
                        matches!(owner, Some(existing) if existing != record.name)
                    }
                    None => false,
                };
                if collides_with_another {
                    debug!(alias = %record.name, "transfer pubkey collides with another alias, reverting");
                    record.pubkey = prior.pubkey.clone();
                    record.private_key = prior.private_key.clone();
                } else if record.private_key.is_empty() || record.private_key == prior.private_key
                {
                    return Err(AliasError::TransferMissingKey);
                }
            }
        }
    }

    if !mode.is_connect() {
        return Ok(Outcome::Applied);
    }

    if let Some(address) = record.pubkey_address(state.stores.network) {
        if let Some(prior) = &prior {
            if let Some(prior_address) = prior.pubkey_address(state.stores.network) {
                if prior_address.hash160() != address.hash160() {
                    state
                    .stores
                    .alias_by_address
                    .remove(&prior_address.hash160())
                    .map_err(AliasError::from)?;
                }
            }
        }
        state
        .stores
        .alias_by_address
        .set(&address.hash160(), &record.name)
        .map_err(AliasError::from)?;
    }

    let is_ban_write = record.name == special_aliases::BAN;
    let height = record.height;
    let txid = record.txid;
    state
    .stores
    .aliases
    .put(&guid, record)
    .map_err(AliasError::from)?;

    // Writes to sysban trigger ban propagation.
    if is_ban_write {
        if let Some(ban_alias) = state
        .stores
        .aliases
        .current(&guid)
        .map_err(AliasError::from)?
        {
            effects::apply_ban_propagation(state.stores, &ban_alias, height, txid)
            .map_err(AliasError::from)?;
        }
    }

    Ok(Outcome::Applied)
}

/// Message activation does not check the prior alias input against
/// `from_alias` — this helper is the shared authorization logic every
/// *other* service uses; kept here so `message.rs` can point at it and
/// visibly not call it, locking in that historical behavior.
pub fn authorizing_alias_matches(prev: &PreviousServiceInputs, expected: &Guid) -> bool {
    prev.alias_guid() == Some(expected)
}
