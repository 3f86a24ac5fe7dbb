//! Message activation. Single op, immutable after
//! creation.
//!
//! Historically, message activation has never verified that the previous
//! alias input equals the `from` alias in the payload — this function
//! deliberately does not call
//! [`crate::alias::authorizing_alias_matches`] against `record.from_alias`,
//! preserving that behavior rather than silently tightening it; see the
//! regression test below.

use crate::{
    error::{MessageError, Outcome},
    prevout::PreviousServiceInputs,
    state::{Mode, ValidatorState},
};
use services_chain::{records::Message, utxo::UtxoView};

pub fn check_message_inputs<U: UtxoView>(
    state: &mut ValidatorState<U>,
    mode: Mode,
    _prev: &PreviousServiceInputs,
    record: Message) -> Result<Outcome, MessageError> {
    let to_exists = state
    .stores
    .aliases
    .exists(&record.to_alias)
    .map_err(MessageError::from)?;
    if !to_exists {
        if mode.is_connect() {
            return Ok(Outcome::SoftSkipped {
                    reason: "to alias not yet connected".into(),
            });
        }
        return Err(MessageError::ToAliasNotFound);
    }

    if !mode.is_connect() {
        return Ok(Outcome::Applied);
    }

    let guid = record.guid.clone();
    state.stores.messages.put(&guid, record).map_err(MessageError::from)?;
    Ok(Outcome::Applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use services_chain::{
        guid::Guid, height::Height, parameters::Network, transaction::Txid,
    };
    use services_store::{Config, Stores};

    struct NoUtxo;
    impl UtxoView for NoUtxo {
        fn output(&self, _outpoint: &services_chain::transparent::OutPoint) -> Option<services_chain::transparent::Output> {
            None
        }
    }

    fn sample_message(from: &str, to: &str) -> Message {
        Message {
            guid: Guid(b"m1".to_vec()),
            from_alias: Guid(from.as_bytes().to_vec()),
            to_alias: Guid(to.as_bytes().to_vec()),
            subject: b"hi".to_vec(),
            cipher_to_recipient: vec![1, 2, 3],
            cipher_to_sender: vec![4, 5, 6],
            height: Height(10),
            txid: Txid([1u8; 32]),
        }
    }

    #[test]
    fn from_alias_input_not_checked() {
        // Locks in the documented gap: a message whose `from_alias` does
        // not match any authorizing alias input still passes, as long as
        // the `to_alias` exists.
        let stores = Stores::open(&Config::ephemeral(), Network::Regtest).unwrap();
        let to_guid = Guid(b"selleralias".to_vec());
        stores
        .aliases
        .put(
            &to_guid,
            services_chain::records::Alias {
                name: "selleralias".into(),
                guid: to_guid.clone(),
                pubkey: vec![],
                public_value: vec![],
                private_value: vec![],
                private_key: vec![],
                renewal: 1,
                safety_level: 0,
                safe_search: true,
                rating_buyer: Default::default(),
                rating_seller: Default::default(),
                rating_arbiter: Default::default(),
                height: Height(1),
                txid: Txid([1u8; 32]),
        })
        .unwrap();
        let utxo = NoUtxo;
        let mut state = crate::state::ValidatorState::new(&stores, &utxo);
        let prev = PreviousServiceInputs::default(); // no alias input authorized at all
        let msg = sample_message("nobody", "selleralias");
        let outcome = check_message_inputs(
            &mut state,
            Mode::Connect { height: Height(10) },
            &prev,
            msg)
        .unwrap();
        assert_eq!(outcome, Outcome::Applied);
    }

    #[test]
    fn missing_to_alias_rejects_in_justcheck() {
        let stores = Stores::open(&Config::ephemeral(), Network::Regtest).unwrap();
        let utxo = NoUtxo;
        let mut state = crate::state::ValidatorState::new(&stores, &utxo);
        let prev = PreviousServiceInputs::default();
        let msg = sample_message("buyeralias", "nosuchalias");
        let err = check_message_inputs(&mut state, Mode::JustCheck, &prev, msg).unwrap_err();
        assert!(matches!(err, MessageError::ToAliasNotFound));
    }

    #[test]
    fn missing_to_alias_soft_skips_in_connect() {
        let stores = Stores::open(&Config::ephemeral(), Network::Regtest).unwrap();
        let utxo = NoUtxo;
        let mut state = crate::state::ValidatorState::new(&stores, &utxo);
        let prev = PreviousServiceInputs::default();
        let msg = sample_message("buyeralias", "nosuchalias");
        let outcome = check_message_inputs(
            &mut state,
            Mode::Connect { height: Height(10) },
            &prev,
            msg)
        .unwrap();
        assert!(matches!(outcome, Outcome::SoftSkipped {.. }));
    }
}

