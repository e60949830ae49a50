use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;

use crate::error::{StoreError, StoreResult};

/// Environment variable holding the base64-encoded 32-byte key.
pub const KEY_ENV: &str = "CARELINGO_ENCRYPTION_KEY";

/// When `true`, startup fails instead of generating an ephemeral key.
pub const REQUIRE_KEY_ENV: &str = "CARELINGO_REQUIRE_ENCRYPTION_KEY";

/// When `true`, the store is built keyless and refuses all calls.
pub const DISABLED_ENV: &str = "CARELINGO_ENCRYPTION_DISABLED";

/// Key sourcing configuration for [`crate::SecureStore`].
#[derive(Debug, Clone, Default)]
pub struct KeyConfig {
    /// Base64-encoded 32-byte key, if one was pre-shared.
    pub key_b64: Option<String>,
    /// Whether a missing key is a fatal startup condition.
    pub require_key: bool,
    /// Whether encryption is explicitly disabled for this deployment.
    pub disabled: bool,
}

impl KeyConfig {
    /// Load key sourcing configuration from environment variables.
    pub fn from_env() -> Self {
        let key_b64 = std::env::var(KEY_ENV).ok().filter(|v| !v.is_empty());

        let require_key = std::env::var(REQUIRE_KEY_ENV)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(false);

        let disabled = std::env::var(DISABLED_ENV)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(false);

        Self {
            key_b64,
            require_key,
            disabled,
        }
    }

    /// Configuration carrying a concrete pre-shared key.
    pub fn with_key(key_b64: impl Into<String>) -> Self {
        Self {
            key_b64: Some(key_b64.into()),
            require_key: false,
            disabled: false,
        }
    }
}

/// Generate a fresh random 256-bit key.
pub fn generate_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut key);
    key
}

/// Decode a base64-encoded key, enforcing the 32-byte length.
pub fn decode_key(key_b64: &str) -> StoreResult<[u8; 32]> {
    let bytes = BASE64
        .decode(key_b64)
        .map_err(|e| StoreError::InvalidKey(format!("key is not valid base64: {e}")))?;

    if bytes.len() != 32 {
        return Err(StoreError::InvalidKeyLength {
            expected: 32,
            got: bytes.len(),
        });
    }

    let mut key = [0u8; 32];
    key.copy_from_slice(&bytes);
    Ok(key)
}

/// Encode a key for operator-facing output.
pub fn encode_key(key: &[u8; 32]) -> String {
    BASE64.encode(key)
}
