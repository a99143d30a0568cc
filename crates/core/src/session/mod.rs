pub mod persistence;
pub mod store;

pub use persistence::{EncryptedFilePersistence, MemoryPersistence, SessionPersistence};
pub use store::SessionStore;
