//! Nonce source.

use rand::RngCore;

/// Supplies the per-request nonce.
pub trait RandomSource: Send + Sync {
    /// A fresh nonce of 16 to 40 printable characters.
    fn nonce(&self) -> String;
}

/// 16 random bytes from the thread-local CSPRNG, hex-encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn nonce(&self) -> String {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}
