//! Credential hashing via PBKDF2-HMAC-SHA256 (ring).
//!
//! Digests are `base64(PBKDF2(password, secret, 4096 iterations, 32
//! bytes))`. The process-wide secret is the only salt-equivalent; there
//! is no per-account salt, so the same password always yields the same
//! digest under one secret and authentication is a plain digest
//! comparison. Rotating the secret invalidates every stored credential
//! and requires an out-of-band bulk rehash.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use ring::pbkdf2;

/// PBKDF2 iteration count.
const PBKDF2_ITERATIONS: u32 = 4096;

/// Derived digest length in bytes.
const KEY_LEN: usize = 32;

/// PBKDF2 algorithm.
static PBKDF2_ALG: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

/// Deterministic, secret-keyed password digest function.
#[derive(Clone)]
pub struct CredentialHasher {
    secret: Vec<u8>,
}

impl CredentialHasher {
    /// Non-empty secret is enforced upstream by
    /// [`StoreConfig`](crate::StoreConfig).
    pub(crate) fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }

    /// Hash a password into a storable digest string.
    pub fn hash(&self, password: &str) -> String {
        let mut digest = [0u8; KEY_LEN];
        let iterations =
            std::num::NonZeroU32::new(PBKDF2_ITERATIONS).expect("PBKDF2_ITERATIONS is non-zero");
        pbkdf2::derive(
            PBKDF2_ALG,
            iterations,
            &self.secret,
            password.as_bytes(),
            &mut digest,
        );
        BASE64.encode(digest)
    }
}

// ── tests ────────────────────────────────────────────────────────────
