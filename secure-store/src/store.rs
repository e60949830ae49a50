use std::sync::Arc;

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use tracing::warn;
use zeroize::Zeroize;

use crate::error::{StoreError, StoreResult};
use crate::key::{self, KeyConfig};

/// Envelope version emitted by this build. Decryption only accepts
/// envelopes produced under the same version.
const ENVELOPE_VERSION: u32 = 1;

/// AES-256-GCM store guarding every sensitive pipeline artifact.
///
/// Exactly one store (and therefore one key) exists per process; it is
/// cheap to clone and safe to share across concurrent pipeline runs --
/// the key is read-only after construction and every encryption draws
/// its own nonce from the OS RNG.
///
/// Sealed payloads use the envelope format `v{n}:{nonce_b64}:{ct_b64}`
/// so a stored artifact is self-describing about the format it was
/// written under.
#[derive(Clone)]
pub struct SecureStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    cipher: Option<Aes256Gcm>,
    key_version: u32,
}

impl SecureStore {
    /// Build a store around a 32-byte key. The caller's copy of the key
    /// is wiped after the cipher is constructed.
    pub fn new(mut key: [u8; 32]) -> StoreResult<Self> {
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|_| StoreError::InvalidKey("cipher rejected key material".to_string()))?;
        key.zeroize();

        Ok(Self {
            inner: Arc::new(StoreInner {
                cipher: Some(cipher),
                key_version: ENVELOPE_VERSION,
            }),
        })
    }

    /// A store with no key. Every encrypt/decrypt call fails with
    /// [`StoreError::KeyUnavailable`]; nothing is ever passed through in
    /// plaintext.
    pub fn keyless() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                cipher: None,
                key_version: ENVELOPE_VERSION,
            }),
        }
    }

    /// Source the process-wide store from deployment configuration.
    ///
    /// - a pre-shared key is used as-is (malformed key material is a
    ///   hard error, never silently ignored);
    /// - with no key and `require_key` unset, a fresh key is generated
    ///   and surfaced to the operator -- artifacts sealed under it are
    ///   unrecoverable once the process exits unless the key is
    ///   persisted;
    /// - with no key and `require_key` set, startup fails;
    /// - a disabled deployment gets a keyless store that refuses calls.
    pub fn from_key_config(config: &KeyConfig) -> StoreResult<Self> {
        if config.disabled {
            warn!("encryption disabled by configuration; secure store will refuse all calls");
            return Ok(Self::keyless());
        }

        match &config.key_b64 {
            Some(b64) => Self::new(key::decode_key(b64)?),
            None if config.require_key => Err(StoreError::KeyRequired),
            None => {
                let key = key::generate_key();
                warn!(
                    encryption_key = %key::encode_key(&key),
                    "no pre-shared encryption key configured; generated an ephemeral key -- \
                     persist it or artifacts sealed in this process become unrecoverable \
                     after restart"
                );
                Self::new(key)
            }
        }
    }

    /// Whether this store holds a key and can seal/open artifacts.
    pub fn has_key(&self) -> bool {
        self.inner.cipher.is_some()
    }

    /// Encrypt a payload under the process key.
    ///
    /// Randomized per call: encrypting the same payload twice yields
    /// different envelopes, both of which decrypt to the payload.
    pub fn encrypt(&self, plaintext: &[u8]) -> StoreResult<Vec<u8>> {
        let cipher = self.inner.cipher.as_ref().ok_or(StoreError::KeyUnavailable)?;

        let mut nonce_bytes = [0u8; 12];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| StoreError::EncryptionFailed)?;

        let envelope = format!(
            "v{}:{}:{}",
            self.inner.key_version,
            BASE64.encode(nonce_bytes),
            BASE64.encode(&ciphertext)
        );
        Ok(envelope.into_bytes())
    }

    /// Decrypt an envelope produced by [`SecureStore::encrypt`].
    ///
    /// Fails closed: a malformed envelope, a different key, or any
    /// tampering yields [`StoreError::DecryptionFailed`] -- corrupted
    /// plaintext is never returned.
    pub fn decrypt(&self, sealed: &[u8]) -> StoreResult<Vec<u8>> {
        let cipher = self.inner.cipher.as_ref().ok_or(StoreError::KeyUnavailable)?;

        let text = std::str::from_utf8(sealed)
            .map_err(|_| StoreError::DecryptionFailed("envelope is not valid text".to_string()))?;

        let mut parts = text.splitn(3, ':');
        let version = parts
            .next()
            .and_then(|v| v.strip_prefix('v'))
            .and_then(|v| v.parse::<u32>().ok())
            .ok_or_else(|| StoreError::DecryptionFailed("malformed envelope header".to_string()))?;

        if version != self.inner.key_version {
            return Err(StoreError::DecryptionFailed(format!(
                "unsupported envelope version v{version}"
            )));
        }

        let nonce_b64 = parts
            .next()
            .ok_or_else(|| StoreError::DecryptionFailed("missing nonce".to_string()))?;
        let ct_b64 = parts
            .next()
            .ok_or_else(|| StoreError::DecryptionFailed("missing ciphertext".to_string()))?;

        let nonce_bytes = BASE64
            .decode(nonce_b64)
            .map_err(|_| StoreError::DecryptionFailed("nonce is not valid base64".to_string()))?;
        if nonce_bytes.len() != 12 {
            return Err(StoreError::DecryptionFailed(
                "invalid nonce length".to_string(),
            ));
        }

        let ciphertext = BASE64.decode(ct_b64).map_err(|_| {
            StoreError::DecryptionFailed("ciphertext is not valid base64".to_string())
        })?;

        cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|_| StoreError::DecryptionFailed("authentication failed".to_string()))
    }
}
