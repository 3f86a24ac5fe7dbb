//! Transaction decoder.
//!
//! Two stages kept separate: [`decode_service_script`] (shape
//! only, cheap enough for relay/mempool filters) and [`decode_and_parse`]
//! (shape plus payload-type parse, used by the validator).

use crate::error::MalformedTransactionError;
use services_chain::{
    script::{ScriptShapeError, ServiceOpCode, ServicePrefix},
    transaction::Transaction,
    transparent::Output,
};

/// The single service output found in a transaction, plus its index.
pub struct ServiceOutput {
    pub index: usize,
    pub prefix: ServicePrefix,
}

/// "the decoder scans outputs and returns the first output whose
/// scriptPubKey parses as a service op, the op code, the index, and the
/// argument vector." A transaction carrying no parseable service output is
/// simply "not a service transaction" (`Ok(None)`); only a duplicate
/// service output, or a malformed one on a `SYSCOIN_TX_VERSION`
/// transaction, is a hard fault.
pub fn decode_service_script(
    tx: &Transaction) -> Result<Option<ServiceOutput>, MalformedTransactionError> {
    let mut found: Option<ServiceOutput> = None;
    for (index, output) in tx.outputs.iter().enumerate() {
        match ServicePrefix::decode(&output.lock_script) {
            Ok(prefix) => {
                if found.is_some() {
                    return Err(MalformedTransactionError::DuplicateServiceOutput);
                }
                if prefix.args.len() != prefix.op.arity() {
                    return Err(MalformedTransactionError::WrongArity);
                }
                found = Some(ServiceOutput { index, prefix });
            }
            Err(ScriptShapeError::UnknownOp) => continue,
            Err(_) => {
                if tx.is_service_transaction() {
                    return Err(MalformedTransactionError::WrongArity);
                }
                continue;
            }
        }
    }
    Ok(found)
}

/// Every byte string argument a service op can carry, named by position.
/// The dispatcher (`dispatch.rs`) further interprets these per op; this
/// module only guarantees arity matched `op.arity()`.
pub struct ServiceArgs<'a> {
    pub op: ServiceOpCode,
    pub args: &'a [Vec<u8>],
}

/// Common prelude: shape plus enough structure for the validator to read
/// specific argument positions. Payload-type parsing of the `OP_RETURN`
/// data itself is the data-output decoder's job ([`crate::data_output`]);
/// this function only locates and shape-checks the service output.
pub fn decode_and_parse(
    tx: &Transaction) -> Result<Option<ServiceOutput>, MalformedTransactionError> {
    decode_service_script(tx)
}
