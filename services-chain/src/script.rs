//! Service script shape.
//!
//! A service output script is
//!
//! ```text
//! <OP_opcode> <push guid> [<push rand>]* <push commitment> (OP_DROP|OP_2DROP){n} <destination script>
//! ```
//!
//! This module only knows the *shape*: which op code owns how many pushes,
//! and how to peel the prefix off to recover the destination script. It
//! does not know anything about record payloads — that's `services-consensus::decode`.

use crate::transparent::Script;
use thiserror::Error;

/// `OP_DROP`, in the minimal op-code vocabulary this crate cares about.
pub const OP_DROP: u8 = 0x75;
/// `OP_2DROP`.
pub const OP_2DROP: u8 = 0x6d;

/// The service operation a script prefix encodes.
/// The numeric values are the `OP_N` opcodes reserved for
/// each op; they are part of the wire format.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ServiceOpCode {
    AliasActivate = 1,
    AliasUpdate = 2,
    OfferActivate = 3,
    OfferUpdate = 4,
    OfferAccept = 5,
    CertActivate = 6,
    CertUpdate = 7,
    CertTransfer = 8,
    EscrowActivate = 9,
    EscrowRelease = 10,
    EscrowRefund = 11,
    EscrowComplete = 12,
    MessageActivate = 13,
}

impl ServiceOpCode {
    /// The number of pushed arguments this op carries, before the
    /// `OP_DROP`/`OP_2DROP` trailer.
    pub fn arity(self) -> usize {
        use ServiceOpCode::*;
        match self {
            AliasActivate | AliasUpdate => 3,
            OfferActivate | OfferUpdate => 2,
            OfferAccept => 4,
            CertActivate | CertUpdate | CertTransfer => 2,
            EscrowActivate | EscrowRelease | EscrowRefund | EscrowComplete => 3,
            MessageActivate => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        use ServiceOpCode::*;
        Some(match value {
                1 => AliasActivate,
                2 => AliasUpdate,
                3 => OfferActivate,
                4 => OfferUpdate,
                5 => OfferAccept,
                6 => CertActivate,
                7 => CertUpdate,
                8 => CertTransfer,
                9 => EscrowActivate,
                10 => EscrowRelease,
                11 => EscrowRefund,
                12 => EscrowComplete,
                13 => MessageActivate,
                _ => return None,
        })
    }
}

/// The script shape is malformed in a way C2 alone can detect, independent
/// of any particular service's payload rules.
#[derive(Error, Debug, Eq, PartialEq)]
pub enum ScriptShapeError {
    /// script does not start with a recognized service op code
    UnknownOp,
    /// script ended before the expected number of pushes were read
    Truncated,
    /// a push was expected but a non-push opcode was found
    ExpectedPush,
    /// the number of OP_DROP/OP_2DROP operations does not match the pushes
    DropCountMismatch,
}

/// A parsed service script: the op, its raw argument pushes, and the
/// destination script that follows the prefix.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServicePrefix {
    pub op: ServiceOpCode,
    pub args: Vec<Vec<u8>>,
    pub destination: Script,
}

impl ServicePrefix {
    /// Parse a service script's prefix: pull pushes until the first
    /// `OP_DROP`/`OP_2DROP` run, then rewind to the start of the
    /// destination script.
    pub fn decode(script: &Script) -> Result<ServicePrefix, ScriptShapeError> {
        let bytes = &script.0;
        let mut cursor = 0usize;

        let op_byte = *bytes.get(cursor).ok_or(ScriptShapeError::Truncated)?;
        let op = ServiceOpCode::from_u8(op_byte).ok_or(ScriptShapeError::UnknownOp)?;
        cursor += 1;

        let expected_pushes = op.arity();
        let mut args = Vec::with_capacity(expected_pushes);
        for _ in 0..expected_pushes {
            let (push, next) = read_push(bytes, cursor).ok_or(ScriptShapeError::ExpectedPush)?;
            args.push(push);
            cursor = next;
        }

        let mut dropped = 0usize;
        while dropped < expected_pushes {
            match bytes.get(cursor) {
                Some(&OP_DROP) => {
                    cursor += 1;
                    dropped += 1;
                }
                Some(&OP_2DROP) => {
                    cursor += 1;
                    dropped += 2;
                }
                _ => return Err(ScriptShapeError::DropCountMismatch),
            }
        }
        if dropped != expected_pushes {
            return Err(ScriptShapeError::DropCountMismatch);
        }

        Ok(ServicePrefix {
                op,
                args,
                destination: Script(bytes[cursor..].to_vec()),
        })
    }

    /// Re-encode this prefix back into a script, for tests and for
    /// transaction construction in `services-test` fixtures.
    pub fn encode(&self) -> Script {
        let mut out = vec![self.op as u8];
        for arg in &self.args {
            write_push(&mut out, arg);
        }
        let mut remaining_drops = self.args.len();
        while remaining_drops > 0 {
            if remaining_drops >= 2 {
                out.push(OP_2DROP);
                remaining_drops -= 2;
            } else {
                out.push(OP_DROP);
                remaining_drops -= 1;
            }
        }
        out.extend_from_slice(&self.destination.0);
        Script(out)
    }

    /// The "remove prefix" operation : yields the destination
    /// script alone, used for ownership checks against the alias pubkey
    /// hash.
    pub fn remove_prefix(script: &Script) -> Result<Script, ScriptShapeError> {
        Ok(Self::decode(script)?.destination)
    }
}

/// Minimal push-data reader: a length byte (0..=75) directly encodes a
/// push of that many bytes, which covers every guid/hash push (never
/// exceeding ~71 bytes).
fn read_push(bytes: &[u8], at: usize) -> Option<(Vec<u8>, usize)> {
    let len = *bytes.get(at)? as usize;
    if len > 75 {
        return None;
    }
    let start = at + 1;
    let end = start + len;
    if end > bytes.len() {
        return None;
    }
    Some((bytes[start..end].to_vec(), end))
}

fn write_push(out: &mut Vec<u8>, data: &[u8]) {
    debug_assert!(data.len() <= 75, "service args never exceed a direct push");
    out.push(data.len() as u8);
    out.extend_from_slice(data);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_alias_activate() {
        let prefix = ServicePrefix {
            op: ServiceOpCode::AliasActivate,
            args: vec![b"buyeralias".to_vec(), b"guid123".to_vec(), b"abc123".to_vec()],
            destination: Script(vec![0x76, 0xa9, 0x14]),
        };
        let encoded = prefix.encode();
        let decoded = ServicePrefix::decode(&encoded).unwrap();
        assert_eq!(decoded, prefix);
    }

    #[test]
    fn wrong_arity_is_rejected_at_drop_count() {
        // AliasActivate expects 3 pushes + OP_2DROP,OP_DROP but we only
        // encode 2 pushes worth of drops.
        let mut bytes = vec![ServiceOpCode::AliasActivate as u8];
        write_push(&mut bytes, b"only-one-push");
        bytes.push(OP_DROP);
        let script = Script(bytes);
        assert!(matches!(
                ServicePrefix::decode(&script),
                Err(ScriptShapeError::ExpectedPush) | Err(ScriptShapeError::DropCountMismatch)
        ));
    }
}

