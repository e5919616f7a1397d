//! Result token generation
//!
//! Tokens are opaque, unguessable handles to a parked result set.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;

/// Generator for result tokens backed by the OS-seeded thread RNG
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    /// Number of random bytes to generate
    token_bytes: usize,
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenGenerator {
    /// Minimum entropy accepted for a token, in bytes (128 bits)
    pub const MIN_TOKEN_BYTES: usize = 16;

    /// Create a generator producing 256-bit tokens
    pub fn new() -> Self {
        Self { token_bytes: 32 }
    }

    /// Generate a new URL-safe token
    pub fn generate(&self) -> String {
        let mut random_bytes = vec![0u8; self.token_bytes];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        URL_SAFE_NO_PAD.encode(&random_bytes)
    }

    /// Whether `token` could have been produced by a generator.
    ///
    /// Anything else is rejected before touching the cache.
    pub fn is_well_formed(token: &str) -> bool {
        let min_len = URL_SAFE_NO_PAD.encode([0u8; Self::MIN_TOKEN_BYTES]).len();

        token.len() >= min_len
            && token.len() <= 256
            && token
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }
}
