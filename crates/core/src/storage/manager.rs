use std::path::Path;

use crate::errors::CoreError;
use crate::models::session::Session;

use super::encryption::{self, KdfParams};
use super::format::{self, SessionFileHeader};

/// Seals and opens the persisted session.
///
/// Flow: Session → bincode → AES-256-GCM(Argon2id(passphrase)) → TDSN bytes
pub struct SessionVault;

impl SessionVault {
    pub fn seal(session: &Session, passphrase: &str, params: &KdfParams) -> Result<Vec<u8>, CoreError> {
        let plaintext = bincode::serialize(session)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize session: {e}")))?;

        let header = SessionFileHeader {
            version: format::CURRENT_VERSION,
            kdf_params: *params,
            salt: encryption::random_bytes()?,
            nonce: encryption::random_bytes()?,
        };
        let key = encryption::derive_key(passphrase, &header.salt, &header.kdf_params)?;
        let ciphertext = encryption::seal(&plaintext, &key, &header.nonce)?;

        format::encode(&header, &ciphertext)
    }

    pub fn open(data: &[u8], passphrase: &str) -> Result<Session, CoreError> {
        let (header, ciphertext) = format::decode(data)?;
        let key = encryption::derive_key(passphrase, &header.salt, &header.kdf_params)?;
        let plaintext = encryption::open(ciphertext, &key, &header.nonce)?;

        bincode::deserialize(&plaintext)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize session: {e}")))
    }

    /// Write via a sibling temp file and rename, so a crash never leaves a half-written session.
    pub fn save_to_file(
        session: &Session,
        path: &Path,
        passphrase: &str,
        params: &KdfParams,
    ) -> Result<(), CoreError> {
        let bytes = Self::seal(session, passphrase, params)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// `Ok(None)` when no session was ever saved.
    pub fn load_from_file(path: &Path, passphrase: &str) -> Result<Option<Session>, CoreError> {
        match std::fs::read(path) {
            Ok(bytes) => Self::open(&bytes, passphrase).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn remove_file(path: &Path) -> Result<(), CoreError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
