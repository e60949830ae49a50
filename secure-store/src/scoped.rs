use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::StoreResult;
use crate::store::SecureStore;

/// A temporary file holding one encrypted artifact.
///
/// The backing file only ever contains ciphertext and is readable by the
/// owning user alone. Dropping the handle removes the file, so an
/// artifact staged to disk disappears on every exit path of the scope
/// that created it -- success, early return, or error.
pub struct ScopedArtifactFile {
    file: NamedTempFile,
    store: SecureStore,
}

impl SecureStore {
    /// Seal a payload into a private temporary file.
    ///
    /// Fails with [`crate::StoreError::KeyUnavailable`] on a keyless
    /// store; plaintext never reaches disk.
    pub fn scoped_temp_file(&self, payload: &[u8]) -> StoreResult<ScopedArtifactFile> {
        let sealed = self.encrypt(payload)?;

        let mut file = tempfile::Builder::new()
            .prefix("carelingo-")
            .suffix(".sealed")
            .tempfile()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(&sealed)?;
        file.flush()?;

        Ok(ScopedArtifactFile {
            file,
            store: self.clone(),
        })
    }
}

impl ScopedArtifactFile {
    /// Location of the encrypted backing file, valid until drop.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Read the file back and decrypt it.
    ///
    /// Fails closed if the file was tampered with on disk.
    pub fn read(&self) -> StoreResult<Vec<u8>> {
        let sealed = std::fs::read(self.file.path())?;
        self.store.decrypt(&sealed)
    }
}
