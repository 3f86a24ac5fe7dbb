//! Data-output verifier.
//!
//! Every service transaction also carries exactly one
//! `OP_RETURN <data> <commitment>` output. This module locates it, decodes
//! the data blob, re-derives its commitment, and checks it against both
//! the script's commitment and the minimum storage fee.

use crate::error::MalformedTransactionError;
use services_chain::{
    amount::Amount, commitment, serialization::BitcoinDeserialize, transaction::Transaction,
    transparent::Script,
};

/// `OP_RETURN`, the opcode that marks an unspendable data-carrier output.
pub const OP_RETURN: u8 = 0x6a;

/// Caller-supplied chain parameters the fee floor depends on: `relay_fee`
/// and `COIN` come from the caller's chain parameters, not hardcoded.
#[derive(Copy, Clone, Debug)]
pub struct FeeParameters {
    pub coin: i64,
    pub min_relay_fee_per_kb: i64,
}

impl FeeParameters {
    /// The minimum embedded fee: `max(0.02*COIN, 3*minRelayFee*(serializedSize+148))`.
    pub fn minimum_fee(&self, serialized_size: usize) -> Amount {
        let floor = self.coin / 50; // 0.02 * COIN
        let relay_based =
        3 * self.min_relay_fee_per_kb * (serialized_size as i64 + 148) / 1000;
        Amount(floor.max(relay_based))
    }
}

/// The decoded `OP_RETURN` payload: the raw data bytes plus the commitment
/// string that followed them.
pub struct DataOutput {
    pub data: Vec<u8>,
    pub commitment: String,
    pub amount: Amount,
}

/// Parse an `OP_RETURN <data> <commitment>` script. Supports direct pushes
/// (≤ 75 bytes) and `OP_PUSHDATA1`/`OP_PUSHDATA2`, since record payloads
/// (up to `MAX_ENCRYPTED_VALUE_LENGTH`) exceed a direct push's range, unlike
/// the small guid/hash pushes C2's service-script prefix carries.
pub fn parse_data_output(script: &Script) -> Result<(Vec<u8>, String), MalformedTransactionError> {
    let bytes = &script.0;
    let mut cursor = 0usize;
    if bytes.get(cursor) != Some(&OP_RETURN) {
        return Err(MalformedTransactionError::MissingDataOutput);
    }
    cursor += 1;

    let (data, next) =
    read_push(bytes, cursor).ok_or(MalformedTransactionError::MissingDataOutput)?;
    cursor = next;
    let (commitment_bytes, next) =
    read_push(bytes, cursor).ok_or(MalformedTransactionError::MissingDataOutput)?;
    cursor = next;
    if cursor != bytes.len() {
        return Err(MalformedTransactionError::MissingDataOutput);
    }

    let commitment = String::from_utf8(commitment_bytes)
    .map_err(|_| MalformedTransactionError::MissingDataOutput)?;
    Ok((data, commitment))
}

fn read_push(bytes: &[u8], at: usize) -> Option<(Vec<u8>, usize)> {
    let opcode = *bytes.get(at)?;
    let (len, start) = match opcode {
        0x01..=0x4b => (opcode as usize, at + 1),
        0x4c => {
            let len = *bytes.get(at + 1)? as usize;
            (len, at + 2)
        }
        0x4d => {
            let lo = *bytes.get(at + 1)? as usize;
            let hi = *bytes.get(at + 2)? as usize;
            (lo | (hi << 8), at + 3)
        }
        _ => return None,
    };
    let end = start + len;
    if end > bytes.len() {
        return None;
    }
    Some((bytes[start..end].to_vec(), end))
}

/// Locate the transaction's single `OP_RETURN` output, decode
/// it, and check its fee. Callers (the dispatcher) additionally compare
/// `commitment` against the service script's own commitment push and parse
/// `data` into the op's record type.
pub fn find_data_output(
    tx: &Transaction,
    fees: &FeeParameters) -> Result<DataOutput, MalformedTransactionError> {
    let mut found = None;
    for output in &tx.outputs {
        if let Ok((data, commitment)) = parse_data_output(&output.lock_script) {
            if found.is_some() {
                return Err(MalformedTransactionError::MissingDataOutput);
            }
            found = Some(DataOutput {
                    data,
                    commitment,
                    amount: output.value,
            });
        }
    }
    let output = found.ok_or(MalformedTransactionError::MissingDataOutput)?;
    let serialized_size = {
        use services_chain::serialization::BitcoinSerialize;
        tx.bitcoin_serialize_to_vec()
        .map(|bytes| bytes.len())
        .unwrap_or(output.data.len() + 148)
    };
    let required = fees.minimum_fee(serialized_size);
    if output.amount.value() < required.value() {
        return Err(MalformedTransactionError::InsufficientFee);
    }
    Ok(output)
}

/// "data decodes into the record type implied by the op";
/// decode failure is a hard fault except for alias-update with empty data
/// (used as a side-channel authorization input — ).
pub fn decode_payload<T: BitcoinDeserialize>(
    data: &[u8]) -> Result<T, MalformedTransactionError> {
    T::bitcoin_deserialize(data).map_err(|_| MalformedTransactionError::DataParseFailure)
}

/// Both the hash-in-script and the hash-computed-from-data must be kept
/// and must agree.
pub fn commitment_matches(data: &[u8], script_commitment: &str) -> bool {
    commitment::compute_from_bytes(data) == script_commitment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_data_output(data: &[u8], commitment: &str) -> Script {
        let mut bytes = vec![OP_RETURN];
        write_push(&mut bytes, data);
        write_push(&mut bytes, commitment.as_bytes());
        Script(bytes)
    }

    fn write_push(out: &mut Vec<u8>, data: &[u8]) {
        if data.len() <= 75 {
            out.push(data.len() as u8);
        } else if data.len() <= 0xff {
            out.push(0x4c);
            out.push(data.len() as u8);
        } else {
            out.push(0x4d);
            out.push((data.len() & 0xff) as u8);
            out.push((data.len() >> 8) as u8);
        }
        out.extend_from_slice(data);
    }

    #[test]
    fn roundtrips_small_and_large_payloads() {
        let small = encode_data_output(b"hi", "abcd");
        let (data, commitment) = parse_data_output(&small).unwrap();
        assert_eq!(data, b"hi");
        assert_eq!(commitment, "abcd");

        let large_payload = vec![7u8; 300];
        let large = encode_data_output(&large_payload, "ef01");
        let (data, commitment) = parse_data_output(&large).unwrap();
        assert_eq!(data, large_payload);
        assert_eq!(commitment, "ef01");
    }

    #[test]
    fn commitment_must_match_recomputed_hash() {
        let computed = commitment::compute_from_bytes(b"payload");
        assert!(commitment_matches(b"payload", &computed));
        assert!(!commitment_matches(b"payload", "deadbeef"));
    }

    #[test]
    fn fee_floor_is_the_max_of_both_terms() {
        let fees = FeeParameters {
            coin: 100_000_000,
            min_relay_fee_per_kb: 1_000,
        };
        // 0.02 * COIN = 2_000_000, comfortably above the relay-based term
        // for a small transaction.
        assert_eq!(fees.minimum_fee(200).value(), 2_000_000);
    }
}

