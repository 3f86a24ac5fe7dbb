//! The payload commitment hash.
//!
//! 1. Serialize the record into bytes `D`.
//! 2. `H` = double-SHA-256(`D`).
//! 3. Take the low 64 bits of `H`, encode as a little-endian
//! minimally-encoded signed number `N`.
//! 4. Hex-encode the byte representation of `N`.
//!
//! This is the string pushed in the service script (C2) and re-derived from
//! the `OP_RETURN` payload by the data-output verifier (C4) — both sides
//! must agree bit-for-bit.

use crate::serialization::{sha256d, BitcoinSerialize};

/// Compute the commitment string for any canonically-serializable record.
pub fn compute<T: BitcoinSerialize>(record: &T) -> Result<String, std::io::Error> {
    let bytes = record.bitcoin_serialize_to_vec()?;
    Ok(compute_from_bytes(&bytes))
}

/// Compute the commitment string directly from an already-serialized
/// payload blob, as used by the data-output verifier (C4) when re-deriving
/// the commitment from the `OP_RETURN` bytes it read off the wire.
pub fn compute_from_bytes(bytes: &[u8]) -> String {
    let digest = sha256d::digest(bytes);
    // Low 8 bytes of the digest, interpreted little-endian.
    let mut low8 = [0u8; 8];
    low8.copy_from_slice(&digest[0..8]);
    let value = i64::from_le_bytes(low8);
    hex::encode(minimally_encode_signed(value))
}

/// Minimally-encode a signed integer the way Bitcoin script numbers are
/// encoded: little-endian magnitude, sign carried in the high bit of the
/// last byte, with the shortest possible byte count and no extraneous
/// `0x00`/`0x80` padding.
fn minimally_encode_signed(value: i64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }
    let negative = value < 0;
    let mut magnitude = value.unsigned_abs();
    let mut bytes = Vec::new();
    while magnitude > 0 {
        bytes.push((magnitude & 0xff) as u8);
        magnitude >>= 8;
    }
    // If the most significant bit of the last byte is already set, an
    // extra zero (or 0x80) byte is needed to keep the sign bit free for
    // the sign flag.
    if bytes.last().map(|b| b & 0x80 != 0).unwrap_or(false) {
        bytes.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        *bytes.last_mut().expect("value != 0") |= 0x80;
    }
    bytes
}
