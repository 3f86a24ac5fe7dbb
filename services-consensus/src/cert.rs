//! Certificate activate/update/transfer validation.

use crate::{
    error::{CertError, Outcome},
    prevout::PreviousServiceInputs,
    state::{Mode, ValidatorState},
};
use services_chain::{records::Certificate, utxo::UtxoView};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CertOp {
    Activate,
    Update,
    Transfer,
}

pub fn check_cert_inputs<U: UtxoView>(
    state: &mut ValidatorState<U>,
    mode: Mode,
    prev: &PreviousServiceInputs,
    op: CertOp,
    mut record: Certificate) -> Result<Outcome, CertError> {
    if !record.title_within_bound() {
        return Err(CertError::TitleTooLong);
    }
    if !record.data_within_bound() {
        return Err(CertError::DataTooLong);
    }

    let guid = record.guid.clone();
    let prior = state.stores.certs.current(&guid).map_err(CertError::from)?;

    match op {
        CertOp::Activate => {
            if !record.title_non_empty() {
                return Err(CertError::TitleEmpty);
            }
            if prior.is_some() {
                return Err(CertError::GuidInUse);
            }
            if prev.alias_guid() != Some(&record.owner_alias) {
                return Err(CertError::OwnerInputMismatch);
            }
        }
        CertOp::Update => {
            let Some(prior) = prior.clone() else {
                if mode.is_connect() {
                    return Ok(Outcome::SoftSkipped {
                            reason: "certificate not yet connected".into(),
                    });
                }
                return Err(CertError::NotFound);
            };
            if prev.alias_guid() != Some(&prior.owner_alias) {
                return Err(CertError::OwnerInputMismatch);
            }
            record.owner_alias = prior.owner_alias;
            record.safety_level = prior.safety_level;
        }
        CertOp::Transfer => {
            let Some(prior) = prior.clone() else {
                if mode.is_connect() {
                    return Ok(Outcome::SoftSkipped {
                            reason: "certificate not yet connected".into(),
                    });
                }
                return Err(CertError::NotFound);
            };
            if prev.alias_guid() != Some(&prior.owner_alias) {
                return Err(CertError::OwnerInputMismatch);
            }
            if record.pending_transfer_alias.is_empty() {
                return Err(CertError::MissingTransferTarget);
            }
            // Commit replaces the owner alias with the transfer target; the
            // validator never decrypts `data`, it only enforces
            // authorization (the sender re-encrypted it before submitting).
            record.owner_alias = record.pending_transfer_alias.clone();
            record.pending_transfer_alias = services_chain::Guid(Vec::new());
            record.safety_level = prior.safety_level;
        }
    }

    if !mode.is_connect() {
        return Ok(Outcome::Applied);
    }

    state.stores.certs.put(&guid, record).map_err(CertError::from)?;
    Ok(Outcome::Applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prevout::PreviousAlias;
    use services_chain::{guid::Guid, height::Height, parameters::Network, transaction::Txid};
    use services_store::{Config, Stores};

    struct NoUtxo;
    impl UtxoView for NoUtxo {
        fn output(&self, _outpoint: &services_chain::transparent::OutPoint) -> Option<services_chain::transparent::Output> {
            None
        }
    }

    fn sample_cert(guid: &str, owner_alias: &str, height: Height) -> Certificate {
        Certificate {
            guid: Guid(guid.as_bytes().to_vec()),
            title: b"title".to_vec(),
            category: b"electronics".to_vec(),
            data: b"ciphertext".to_vec(),
            private: false,
            owner_alias: Guid(owner_alias.as_bytes().to_vec()),
            pending_transfer_alias: Guid(Vec::new()),
            safety_level: 0,
            height,
            txid: Txid([height.value() as u8; 32]),
        }
    }

    fn owner_input(alias: &str) -> PreviousServiceInputs {
        PreviousServiceInputs {
            alias: Some(PreviousAlias {
                    guid: Guid(alias.as_bytes().to_vec()),
                    name: alias.to_string(),
            }),
            ..Default::default()
        }
    }

    fn stores() -> Stores {
        Stores::open(&Config::ephemeral(), Network::Regtest).unwrap()
    }

    #[test]
    fn activate_requires_owner_alias_input() {
        let stores = stores();
        let utxo = NoUtxo;
        let mut state = ValidatorState::new(&stores, &utxo);
        let record = sample_cert("c1", "buyeralias", Height(10));
        let err = check_cert_inputs(
            &mut state,
            Mode::Connect { height: Height(10) },
            &owner_input("someoneelse"),
            CertOp::Activate,
            record)
        .unwrap_err();
        assert!(matches!(err, CertError::OwnerInputMismatch));
    }

    #[test]
    fn activate_rejects_reused_guid() {
        let stores = stores();
        let utxo = NoUtxo;
        let mut state = ValidatorState::new(&stores, &utxo);
        let guid = Guid(b"c1".to_vec());
        stores.certs.put(&guid, sample_cert("c1", "buyeralias", Height(5))).unwrap();

        let record = sample_cert("c1", "buyeralias", Height(10));
        let err = check_cert_inputs(
            &mut state,
            Mode::Connect { height: Height(10) },
            &owner_input("buyeralias"),
            CertOp::Activate,
            record)
        .unwrap_err();
        assert!(matches!(err, CertError::GuidInUse));
    }

    #[test]
    fn update_preserves_safety_level_and_owner() {
        let stores = stores();
        let utxo = NoUtxo;
        let mut state = ValidatorState::new(&stores, &utxo);
        let guid = Guid(b"c1".to_vec());
        let mut prior = sample_cert("c1", "buyeralias", Height(5));
        prior.safety_level = 3;
        stores.certs.put(&guid, prior).unwrap();

        let mut record = sample_cert("c1", "attackeralias", Height(10));
        record.safety_level = 0;
        let outcome = check_cert_inputs(
            &mut state,
            Mode::Connect { height: Height(10) },
            &owner_input("buyeralias"),
            CertOp::Update,
            record)
        .unwrap();
        assert_eq!(outcome, Outcome::Applied);

        let stored = stores.certs.current(&guid).unwrap().unwrap();
        assert_eq!(stored.safety_level, 3);
        assert_eq!(stored.owner_alias, Guid(b"buyeralias".to_vec()));
    }

    #[test]
    fn transfer_moves_ownership_to_pending_target() {
        let stores = stores();
        let utxo = NoUtxo;
        let mut state = ValidatorState::new(&stores, &utxo);
        let guid = Guid(b"c1".to_vec());
        stores.certs.put(&guid, sample_cert("c1", "buyeralias", Height(5))).unwrap();

        let mut record = sample_cert("c1", "buyeralias", Height(10));
        record.pending_transfer_alias = Guid(b"selleralias".to_vec());
        let outcome = check_cert_inputs(
            &mut state,
            Mode::Connect { height: Height(10) },
            &owner_input("buyeralias"),
            CertOp::Transfer,
            record)
        .unwrap();
        assert_eq!(outcome, Outcome::Applied);

        let stored = stores.certs.current(&guid).unwrap().unwrap();
        assert_eq!(stored.owner_alias, Guid(b"selleralias".to_vec()));
        assert!(stored.pending_transfer_alias.0.is_empty());
    }

    #[test]
    fn transfer_without_target_rejected() {
        let stores = stores();
        let utxo = NoUtxo;
        let mut state = ValidatorState::new(&stores, &utxo);
        let guid = Guid(b"c1".to_vec());
        stores.certs.put(&guid, sample_cert("c1", "buyeralias", Height(5))).unwrap();

        let record = sample_cert("c1", "buyeralias", Height(10));
        let err = check_cert_inputs(
            &mut state,
            Mode::Connect { height: Height(10) },
            &owner_input("buyeralias"),
            CertOp::Transfer,
            record)
        .unwrap_err();
        assert!(matches!(err, CertError::MissingTransferTarget));
    }

    #[test]
    fn update_on_unconnected_cert_soft_skips_in_connect_mode() {
        let stores = stores();
        let utxo = NoUtxo;
        let mut state = ValidatorState::new(&stores, &utxo);
        let record = sample_cert("unknown", "buyeralias", Height(10));
        let outcome = check_cert_inputs(
            &mut state,
            Mode::Connect { height: Height(10) },
            &owner_input("buyeralias"),
            CertOp::Update,
            record)
        .unwrap();
        assert!(matches!(outcome, Outcome::SoftSkipped { .. }));
    }
}

