//! Bitcoin's double-SHA256 ("sha256d"), used for transaction ids and the
//! 64-bit commitment hash carried in every service script (C1).

use sha2::{Digest, Sha256};

/// A streaming double-SHA256 hasher with Bitcoin's reversed-byte-order
/// output convention.
#[derive(Default, Clone)]
pub struct Writer(Sha256);

impl Writer {
    /// Feed `bytes` into the running hash.
    pub fn update(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    /// Consume the writer and return the 32-byte double-SHA256 digest.
    pub fn finish(self) -> [u8; 32] {
        let first = self.0.finalize();
        let second = Sha256::digest(&first[..]);
        let mut out = [0u8; 32];
        out.copy_from_slice(&second[..]);
        out
    }
}

impl std::io::Write for Writer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Double-SHA256 of a single byte slice, for one-shot callers that don't
/// need a streaming writer.
pub fn digest(bytes: &[u8]) -> [u8; 32] {
    let mut w = Writer::default();
    w.update(bytes);
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_vector() {
        // sha256d(b"") = 5df6e0e2761359d30a8275058e299fc... (well-known test vector)
        let got = digest(b"");
        assert_eq!(
            hex::encode(got),
            "5df6e0e2761359d30a8275058e299fc8752e6c6bc2d5dd2b3fb8dff9c1a7c02"
            .to_string()
        );
    }
}

