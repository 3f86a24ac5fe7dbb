//! The single validator entry point: ties C3 (decode),
//! C4 (data-output verification), the prevout classifier, and the C6
//! per-service checks together for one transaction, so callers drive one
//! function instead of five parallel ones.
//!
//! `ServiceOp` names which per-service operation a transaction carries;
//! [`validate`] decodes the script prefix and `OP_RETURN` payload itself
//! and matches on it, rather than asking the caller to pre-classify.

use crate::{
    alias::{self, AliasOp},
    cert::{self, CertOp},
    data_output::{self, FeeParameters},
    decode,
    error::{MalformedTransactionError, Outcome, ServiceError},
    escrow, message, offer,
    offer::OfferOp,
    prevout,
    state::{Mode, ValidatorState},
};
use services_chain::{
    feedback::Feedback,
    guid::Guid,
    height::Height,
    records::{Alias, Certificate, Escrow, EscrowOp, Message, Offer, OfferAccept},
    script::ServiceOpCode,
    transaction::Transaction,
    utxo::{BlockSource, UtxoView},
};

/// The per-service operation a service transaction carries ( arity
    /// table), named the way the validator dispatches on it rather than by
/// the raw op code.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ServiceOp {
    Alias(AliasOp),
    Offer(OfferOp),
    OfferAcceptPurchase,
    OfferAcceptFeedback,
    Cert(CertOp),
    EscrowActivate,
    EscrowRelease,
    EscrowRefund,
    EscrowSettlement,
    EscrowFeedback,
    Message,
}

impl ServiceOp {
    fn for_opcode(op: ServiceOpCode, feedback_flag_is_one: bool) -> Option<ServiceOp> {
        use ServiceOpCode::*;
        Some(match op {
                AliasActivate => ServiceOp::Alias(AliasOp::Activate),
                AliasUpdate => ServiceOp::Alias(AliasOp::Update),
                OfferActivate => ServiceOp::Offer(OfferOp::Activate),
                OfferUpdate => ServiceOp::Offer(OfferOp::Update),
                OfferAccept => {
                    if feedback_flag_is_one {
                        ServiceOp::OfferAcceptFeedback
                    } else {
                        ServiceOp::OfferAcceptPurchase
                    }
                }
                CertActivate => ServiceOp::Cert(CertOp::Activate),
                CertUpdate => ServiceOp::Cert(CertOp::Update),
                CertTransfer => ServiceOp::Cert(CertOp::Transfer),
                EscrowActivate => ServiceOp::EscrowActivate,
                EscrowRelease => ServiceOp::EscrowRelease,
                EscrowRefund => ServiceOp::EscrowRefund,
                // EscrowComplete is resolved against the stored escrow's
                // current op by `validate` itself, since the same arity-3
                // arg vector serves both a settlement claim and a feedback
                // submission and only the store can tell them
                // apart: the status-flag push is just ASCII "0"/"1" wire
                // noise, not enough to disambiguate on its own.
                EscrowComplete => return None,
                MessageActivate => ServiceOp::Message,
        })
    }
}

/// Validate (and, in connect mode, apply) one transaction's service
/// operation, if it carries one.
///
/// `now` is the height the caller treats as the connecting block (an
/// alias/offer/etc's own `nHeight` can never exceed it): the block height itself in
/// [`Mode::Connect`], or the chain tip's height (via
    /// [`services_chain::utxo::ChainTip`]) in [`Mode::JustCheck`]. `fees`
/// supplies the chain's `COIN` and relay-fee parameters C4's minimum-fee
/// check depends on. `source` resolves the raw settlement transaction an
/// escrow COMPLETE claim carries (escrow's only chain
    /// dependency); it goes unused for every other op.
pub fn validate<U: UtxoView, B: BlockSource>(
    state: &mut ValidatorState<U>,
    tx: &Transaction,
    mode: Mode,
    now: Height,
    fees: &FeeParameters,
    source: &B) -> Result<Outcome, ServiceError> {
    if tx.is_coinbase() {
        return Err(MalformedTransactionError::Coinbase.into());
    }

    let Some(output) = decode::decode_and_parse(tx)? else {
        return Ok(Outcome::Applied);
    };
    if !tx.is_service_transaction() {
        return Err(MalformedTransactionError::WrongVersion.into());
    }

    let prefix = &output.prefix;
    let args = &prefix.args;
    // The commitment push is always the op's last argument.
    let script_commitment = String::from_utf8(args[args.len() - 1].clone())
    .map_err(|_| MalformedTransactionError::DataParseFailure)?;

    // ALIAS_UPDATE's arg vector is [name, guid, commitment|""]: an empty
    // commitment marks a side-channel update that carries no new
    // `OP_RETURN` payload at all — the validator
    // re-touches the stored record's height/txid without requiring a data
    // output to exist.
    if prefix.op == ServiceOpCode::AliasUpdate && script_commitment.is_empty() {
        return validate_alias_side_channel(state, tx, mode, now, args);
    }

    let data = data_output::find_data_output(tx, fees)?;
    if !data_output::commitment_matches(&data.data, &script_commitment) {
        return Err(MalformedTransactionError::CommitmentMismatch.into());
    }

    let prev = prevout::classify(tx, state.utxo);
    let txid = tx.txid();

    let feedback_flag_is_one = matches!(prefix.op, ServiceOpCode::OfferAccept) && args[2] == b"1";
    let service_op = ServiceOp::for_opcode(prefix.op, feedback_flag_is_one);

    match service_op {
        Some(ServiceOp::Alias(op)) => {
            let record: Alias = data_output::decode_payload(&data.data)?;
            Ok(alias::check_alias_inputs(state, mode, now, op, record)?)
        }
        Some(ServiceOp::Offer(op)) => {
            let record: Offer = data_output::decode_payload(&data.data)?;
            Ok(offer::check_offer_inputs(state, mode, &prev, op, record)?)
        }
        Some(ServiceOp::OfferAcceptPurchase) => {
            let accept: OfferAccept = data_output::decode_payload(&data.data)?;
            Ok(offer::check_offer_accept_purchase(
                    state,
                    mode,
                    &tx.outputs,
                    fees.coin,
                    accept)?)
        }
        Some(ServiceOp::OfferAcceptFeedback) => {
            let accept_guid = Guid(args[1].clone());
            let fb: Feedback = data_output::decode_payload(&data.data)?;
            Ok(offer::check_offer_accept_feedback(
                    state,
                    mode,
                    &prev,
                    &accept_guid,
                    fb.from,
                    fb.to,
                    fb.rating,
                    fb.text,
                    fb.height,
                    fb.txid)?)
        }
        Some(ServiceOp::Cert(op)) => {
            let record: Certificate = data_output::decode_payload(&data.data)?;
            Ok(cert::check_cert_inputs(state, mode, &prev, op, record)?)
        }
        Some(ServiceOp::EscrowActivate) => {
            let record: Escrow = data_output::decode_payload(&data.data)?;
            Ok(escrow::check_escrow_activate(state, mode, record)?)
        }
        Some(ServiceOp::EscrowRelease) => {
            let guid = Guid(args[0].clone());
            Ok(escrow::check_escrow_release(
                    state,
                    mode,
                    &prev,
                    &guid,
                    data.data,
                    now,
                    txid)?)
        }
        Some(ServiceOp::EscrowRefund) => {
            let guid = Guid(args[0].clone());
            Ok(escrow::check_escrow_refund(
                    state,
                    mode,
                    &prev,
                    &guid,
                    data.data,
                    now,
                    txid)?)
        }
        // Unreachable: `for_opcode` never returns these for a real op
        // code, they're only reached via the EscrowComplete branch below.
        Some(ServiceOp::EscrowSettlement) | Some(ServiceOp::EscrowFeedback) => unreachable!(),
        Some(ServiceOp::Message) => {
            let record: Message = data_output::decode_payload(&data.data)?;
            Ok(message::check_message_inputs(state, mode, &prev, record)?)
        }
        None => dispatch_escrow_complete(
            state, mode, &prev, source, fees, now, txid, &data.data, args),
    }
}

/// A single arg shape (`[guid, statusFlag, commitment]`)
/// serves both a settlement claim against a RELEASE/REFUND escrow and a
/// feedback submission against an already-COMPLETE one. The stored
/// escrow's current op, not the status-flag push, is what actually
/// disambiguates which payload the `OP_RETURN` data decodes as.
fn dispatch_escrow_complete<U: UtxoView, B: BlockSource>(
    state: &mut ValidatorState<U>,
    mode: Mode,
    prev: &prevout::PreviousServiceInputs,
    source: &B,
    fees: &FeeParameters,
    now: Height,
    txid: services_chain::transaction::Txid,
    data: &[u8],
    args: &[Vec<u8>]) -> Result<Outcome, ServiceError> {
    let guid = Guid(args[0].clone());

    let current = state
    .stores
    .escrows
    .current(&guid)
    .map_err(crate::error::EscrowError::from)?;

    match current.map(|e| e.op) {
        Some(op) if op == EscrowOp::RELEASE || op == EscrowOp::REFUND => {
            let raw_tx_hex = std::str::from_utf8(data)
            .map_err(|_| MalformedTransactionError::DataParseFailure)?;
            Ok(escrow::check_escrow_settlement(
                    state,
                    mode,
                    prev,
                    source,
                    &guid,
                    raw_tx_hex,
                    fees.min_relay_fee_per_kb,
                    fees.coin,
                    now,
                    txid)?)
        }
        Some(op) if op == EscrowOp::COMPLETE => {
            let fb: Feedback = data_output::decode_payload(data)?;
            Ok(escrow::check_escrow_feedback(
                    state, mode, prev, &guid, fb.from, fb.to, fb.rating, fb.text, fb.height, fb.txid)?)
        }
        _ => {
            if mode.is_connect() {
                Ok(Outcome::SoftSkipped {
                        reason: "escrow not yet connected".into(),
                })
            } else {
                Err(crate::error::EscrowError::NotFound.into())
            }
        }
    }
}

/// An `ALIAS_UPDATE` whose commitment push is empty
/// carries no payload; the validator loads the stored record by the
/// script's own `[name, guid]` pair and re-touches its height/txid,
/// exercising the usual update authorization path without changing any
/// field. A guid the store has never seen is a malformed reference, not a
/// soft-skip, because a side-channel update is only ever emitted by a
/// wallet replaying a guid it already created.
fn validate_alias_side_channel<U: UtxoView>(
    state: &mut ValidatorState<U>,
    tx: &Transaction,
    mode: Mode,
    now: Height,
    args: &[Vec<u8>]) -> Result<Outcome, ServiceError> {
    let guid = Guid(args[1].clone());
    let mut record = state
    .stores
    .aliases
    .current(&guid)
    .map_err(crate::error::AliasError::from)?
    .ok_or(crate::error::AliasError::NotFound)?;
    record.height = now;
    record.txid = tx.txid();
    Ok(alias::check_alias_inputs(
            state,
            mode,
            now,
            AliasOp::Update,
            record)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use services_chain::{
        amount::Amount,
        parameters::Network,
        script::ServicePrefix,
        transaction::{Transaction, Txid, SYSCOIN_TX_VERSION},
        transparent::{Input, OutPoint, Output, Script},
        Guid,
    };
    use services_store::{Config, Stores};

    struct NoUtxo;
    impl UtxoView for NoUtxo {
        fn output(&self, _outpoint: &OutPoint) -> Option<Output> {
            None
        }
    }

    struct NoBlockSource;
    impl BlockSource for NoBlockSource {
        type Error = std::convert::Infallible;
        fn raw_transaction_paid(&self, _hex: &str) -> Result<Vec<Output>, Self::Error> {
            Ok(vec![])
        }
    }

    fn fees() -> FeeParameters {
        FeeParameters {
            coin: 100_000_000,
            min_relay_fee_per_kb: 1_000,
        }
    }

    fn message_tx() -> Transaction {
        let msg = Message {
            guid: Guid(b"msg1".to_vec()),
            from_alias: Guid(b"buyeralias".to_vec()),
            to_alias: Guid(b"selleralias".to_vec()),
            subject: b"hi".to_vec(),
            cipher_to_recipient: vec![1, 2, 3],
            cipher_to_sender: vec![4, 5, 6],
            height: Height(10),
            txid: Txid([0u8; 32]),
        };
        use services_chain::serialization::BitcoinSerialize;
        let data = msg.bitcoin_serialize_to_vec().unwrap();
        let commitment = services_chain::commitment::compute_from_bytes(&data);

        let prefix = ServicePrefix {
            op: ServiceOpCode::MessageActivate,
            args: vec![b"msg1".to_vec(), commitment.clone().into_bytes()],
            destination: Script(vec![0x76, 0xa9, 0x14]),
        };

        let mut data_script = vec![0x6a]; // OP_RETURN
        data_script.push(data.len() as u8);
        data_script.extend_from_slice(&data);
        data_script.push(commitment.len() as u8);
        data_script.extend_from_slice(commitment.as_bytes());

        Transaction {
            version: SYSCOIN_TX_VERSION,
            inputs: vec![Input {
                    outpoint: OutPoint {
                        hash: Txid([9u8; 32]),
                        index: 0,
                    },
                    unlock_script: Script(vec![]),
                    sequence: 0,
            }],
            outputs: vec![
                Output {
                    value: Amount(0),
                    lock_script: prefix.encode(),
                },
                Output {
                    value: Amount(3_000_000),
                    lock_script: Script(data_script),
                },
            ],
            lock_time: 0,
        }
    }

    #[test]
    fn non_service_transaction_is_ignored() {
        services_test::init();
        let stores = Stores::open(&Config::ephemeral(), Network::Regtest).unwrap();
        let utxo = NoUtxo;
        let mut state = ValidatorState::new(&stores, &utxo);
        let tx = Transaction {
            version: 1,
            inputs: vec![Input {
                    outpoint: OutPoint {
                        hash: Txid([1u8; 32]),
                        index: 0,
                    },
                    unlock_script: Script(vec![]),
                    sequence: 0,
            }],
            outputs: vec![],
            lock_time: 0,
        };
        let outcome = validate(
            &mut state,
            &tx,
            Mode::Connect { height: Height(10) },
            Height(10),
            &fees(),
            &NoBlockSource)
        .unwrap();
        assert_eq!(outcome, Outcome::Applied);
    }

    #[test]
    fn coinbase_is_rejected() {
        services_test::init();
        let stores = Stores::open(&Config::ephemeral(), Network::Regtest).unwrap();
        let utxo = NoUtxo;
        let mut state = ValidatorState::new(&stores, &utxo);
        let tx = Transaction {
            version: SYSCOIN_TX_VERSION,
            inputs: vec![],
            outputs: vec![],
            lock_time: 0,
        };
        let err = validate(
            &mut state,
            &tx,
            Mode::Connect { height: Height(10) },
            Height(10),
            &fees(),
            &NoBlockSource)
        .unwrap_err();
        assert!(matches!(
                err,
                ServiceError::Malformed(MalformedTransactionError::Coinbase)
        ));
    }

    #[test]
    fn message_activate_round_trips_through_dispatch() {
        services_test::init();
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
        let mut state = ValidatorState::new(&stores, &utxo);
        let tx = message_tx();
        let outcome = validate(
            &mut state,
            &tx,
            Mode::Connect { height: Height(10) },
            Height(10),
            &fees(),
            &NoBlockSource)
        .unwrap();
        assert_eq!(outcome, Outcome::Applied);
        assert!(stores.messages.exists(&Guid(b"msg1".to_vec())).unwrap());
    }

    #[test]
    fn commitment_mismatch_is_rejected() {
        services_test::init();
        let stores = Stores::open(&Config::ephemeral(), Network::Regtest).unwrap();
        let utxo = NoUtxo;
        let mut state = ValidatorState::new(&stores, &utxo);
        let mut tx = message_tx();
        // Corrupt the script's commitment push so it disagrees with the
        // data output's.
        let prefix = ServicePrefix {
            op: ServiceOpCode::MessageActivate,
            args: vec![b"msg1".to_vec(), b"deadbeef".to_vec()],
            destination: Script(vec![0x76, 0xa9, 0x14]),
        };
        tx.outputs[0].lock_script = prefix.encode();
        let err = validate(
            &mut state,
            &tx,
            Mode::Connect { height: Height(10) },
            Height(10),
            &fees(),
            &NoBlockSource)
        .unwrap_err();
        assert!(matches!(
                err,
                ServiceError::Malformed(MalformedTransactionError::CommitmentMismatch)
        ));
    }
}

