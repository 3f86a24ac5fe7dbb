//! Classifying the previous service inputs a transaction spends. The
//! common prelude walks `vin` once, consulting the UTXO cache, and
//! classifies the previous service inputs into at most one each of:
//! previous alias op, previous offer op, previous cert op, previous
//! escrow op. These prior ops drive authorization.
//!
//! This is pure shape classification: it only re-parses the spent output's
//! script prefix (C2) for its op and guid, it never looks the guid up in
//! C5. Per-service validators join against C5 themselves once they know
//! which guid, if any, authorized the transaction.

use services_chain::{
    guid::Guid,
    script::{ServiceOpCode, ServicePrefix},
    transaction::Transaction,
    transparent::OutPoint,
    utxo::UtxoView,
};

/// The previous alias input, if any: its guid and the name pushed
/// alongside it (alias activate/update carry both).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PreviousAlias {
    pub guid: Guid,
    pub name: String,
}

/// At most one of each kind survives the walk. A transaction
/// that spends two alias-op outputs is not a consensus fault by itself —
/// only the *service output* duplication rule (C3) is — but only the
/// first one found is ever consulted.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PreviousServiceInputs {
    pub alias: Option<PreviousAlias>,
    pub offer: Option<Guid>,
    pub cert: Option<Guid>,
    pub escrow: Option<Guid>,
}

impl PreviousServiceInputs {
    pub fn alias_guid(&self) -> Option<&Guid> {
        self.alias.as_ref().map(|a| &a.guid)
    }
}

/// Walk every input of `tx`, resolve its previous output through `utxo`,
/// and classify it by service op if it carries a recognizable service
/// script prefix. Inputs that don't resolve
/// (already spent, or simply not tracked by this view) or don't parse as a
/// service prefix are ordinary payment inputs and are ignored here.
pub fn classify<U: UtxoView>(tx: &Transaction, utxo: &U) -> PreviousServiceInputs {
    let mut found = PreviousServiceInputs::default();
    for input in &tx.inputs {
        let Some(output) = utxo.output(&input.outpoint) else {
            continue;
        };
        let Ok(prefix) = ServicePrefix::decode(&output.lock_script) else {
            continue;
        };
        classify_one(&mut found, &prefix);
    }
    found
}

/// As [`classify`], but resolving a single already-known previous output
/// rather than walking a whole transaction's inputs — used by validators
/// that need to re-check one specific outpoint (e.g. an escrow's funding
    /// input) rather than the transaction's general authorization input.
pub fn classify_outpoint<U: UtxoView>(
    outpoint: &OutPoint,
    utxo: &U) -> Option<(ServiceOpCode, Vec<Vec<u8>>)> {
    let output = utxo.output(outpoint)?;
    let prefix = ServicePrefix::decode(&output.lock_script).ok()?;
    Some((prefix.op, prefix.args))
}

fn classify_one(found: &mut PreviousServiceInputs, prefix: &ServicePrefix) {
    use ServiceOpCode::*;
    match prefix.op {
        AliasActivate | AliasUpdate => {
            if found.alias.is_none() {
                if let [name, guid,..] = prefix.args.as_slice() {
                    found.alias = Some(PreviousAlias {
                            guid: Guid(guid.clone()),
                            name: String::from_utf8_lossy(name).into_owned(),
                    });
                }
            }
        }
        OfferActivate | OfferUpdate | OfferAccept => {
            if found.offer.is_none() {
                if let [guid,..] = prefix.args.as_slice() {
                    found.offer = Some(Guid(guid.clone()));
                }
            }
        }
        CertActivate | CertUpdate | CertTransfer => {
            if found.cert.is_none() {
                if let [guid,..] = prefix.args.as_slice() {
                    found.cert = Some(Guid(guid.clone()));
                }
            }
        }
        EscrowActivate | EscrowRelease | EscrowRefund | EscrowComplete => {
            if found.escrow.is_none() {
                if let [guid,..] = prefix.args.as_slice() {
                    found.escrow = Some(Guid(guid.clone()));
                }
            }
        }
        MessageActivate => {}
    }
}
