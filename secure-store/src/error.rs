use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no encryption key is loaded; refusing to process plaintext")]
    KeyUnavailable,

    #[error("a pre-shared encryption key is required by this deployment but none was configured")]
    KeyRequired,

    #[error("invalid encryption key: {0}")]
    InvalidKey(String),

    #[error("invalid encryption key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("encryption failed")]
    EncryptionFailed,

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("secure file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
