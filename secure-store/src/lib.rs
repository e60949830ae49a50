//! Secure artifact storage for CareLingo Engine
//!
//! Every sensitive payload the pipeline produces (recorded audio,
//! transcripts, translations, synthesized speech) passes through this
//! crate before it may touch disk. It provides:
//!
//! - AES-256-GCM authenticated encryption with a fresh 96-bit nonce per
//!   call (NIST-recommended nonce size for GCM)
//! - Key sourcing from deployment configuration, with an ephemeral
//!   generated key as the fallback for development deployments
//! - Scoped temporary files that only ever hold ciphertext, are readable
//!   by the owner alone, and are removed on every exit path
//!
//! A store without a key refuses every encrypt/decrypt call with
//! [`StoreError::KeyUnavailable`] instead of silently passing plaintext
//! through.

pub mod error;
pub mod key;
pub mod scoped;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use key::{decode_key, generate_key, KeyConfig};
pub use scoped::ScopedArtifactFile;
pub use store::SecureStore;
