use std::path::PathBuf;
use std::sync::Mutex;

use crate::errors::CoreError;
use crate::models::session::Session;
use crate::storage::encryption::KdfParams;
use crate::storage::manager::SessionVault;

/// Durable key-value slot for the session. Survives process restarts
/// for durable backends.
pub trait SessionPersistence: Send + Sync {
    fn load(&self) -> Result<Option<Session>, CoreError>;
    fn save(&self, session: &Session) -> Result<(), CoreError>;
    fn clear(&self) -> Result<(), CoreError>;
}

/// Non-durable backend. Used by tests and hosts that never persist.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    slot: Mutex<Option<Session>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

impl SessionPersistence for MemoryPersistence {
    fn load(&self) -> Result<Option<Session>, CoreError> {
        Ok(self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, session: &Session) -> Result<(), CoreError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// Encrypted session file on disk.
pub struct EncryptedFilePersistence {
    path: PathBuf,
    passphrase: String,
    kdf_params: KdfParams,
}

impl EncryptedFilePersistence {
    pub fn new(path: impl Into<PathBuf>, passphrase: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            passphrase: passphrase.into(),
            kdf_params: KdfParams::default(),
        }
    }

    pub fn with_kdf_params(mut self, params: KdfParams) -> Self {
        self.kdf_params = params;
        self
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl std::fmt::Debug for EncryptedFilePersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedFilePersistence")
            .field("path", &self.path)
            .field("kdf_params", &self.kdf_params)
            .finish_non_exhaustive()
    }
}

impl SessionPersistence for EncryptedFilePersistence {
    fn load(&self) -> Result<Option<Session>, CoreError> {
        SessionVault::load_from_file(&self.path, &self.passphrase)
    }

    fn save(&self, session: &Session) -> Result<(), CoreError> {
        SessionVault::save_to_file(session, &self.path, &self.passphrase, &self.kdf_params)
    }

    fn clear(&self) -> Result<(), CoreError> {
        SessionVault::remove_file(&self.path)
    }
}
