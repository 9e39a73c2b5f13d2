use std::path::Path;

use tracing::warn;

use crate::core::errors::Result;
use crate::core::models::keyring_handle::KeyringHandle;
use crate::core::models::requests::{DEFAULT_ARMOR, DEFAULT_EXPIRE, DEFAULT_KEY_LENGTH, KeyGenParams};
use crate::core::services::encryption_service::EncryptionService;
use crate::core::services::key_service::KeyService;
use crate::core::services::keyring_state::KeyringState;
use crate::core::services::signature_service::SignatureService;
use crate::core::traits::engine::OpenPgpEngine;

/// Values applied when a request does not say otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub key_length: u32,
    pub expire: String,
    pub armor: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            key_length: DEFAULT_KEY_LENGTH,
            expire: DEFAULT_EXPIRE.to_string(),
            armor: DEFAULT_ARMOR,
        }
    }
}

/// One engine bound to one keyring.
///
/// Separate sessions never share keyring state, which is what keeps tests
/// (and callers with several keyrings) isolated from each other.
pub struct PgpSession<E: OpenPgpEngine> {
    engine: E,
    keyring: KeyringState,
    defaults: Defaults,
}

impl<E: OpenPgpEngine> PgpSession<E> {
    /// Open a session on `home`, or on a fresh ephemeral keyring.
    pub fn open(engine: E, home: Option<&Path>) -> Result<Self> {
        Ok(Self {
            engine,
            keyring: KeyringState::open(home)?,
            defaults: Defaults::default(),
        })
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn keys(&self) -> KeyService<'_, E> {
        KeyService::new(&self.engine, &self.keyring)
    }

    pub fn encryption(&self) -> EncryptionService<'_, E> {
        EncryptionService::new(&self.engine, &self.keyring)
    }

    pub fn signatures(&self) -> SignatureService<'_, E> {
        SignatureService::new(&self.engine, &self.keyring)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn keyring(&self) -> &KeyringHandle {
        self.keyring.handle()
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Key generation parameters pre-filled with the session defaults.
    pub fn key_params(&self, email: &str, name: &str) -> KeyGenParams {
        KeyGenParams::new(email, name)
            .key_length(self.defaults.key_length)
            .expire(self.defaults.expire.clone())
    }

    /// Point the session at another keyring, or a new ephemeral one.
    pub fn configure(&mut self, home: Option<&Path>) -> Result<&KeyringHandle> {
        let previous = self.keyring.handle().clone();
        if let Err(e) = self.engine.release(&previous) {
            warn!(keyring = %previous, error = %e, "failed to stop engine helpers");
        }
        self.keyring.configure(home)
    }

    /// Switch to a persistent keyring directory, creating it if needed.
    pub fn set_home_directory(&mut self, path: &Path) -> Result<&KeyringHandle> {
        self.configure(Some(path))
    }

    pub fn version(&self) -> Result<String> {
        self.engine.version()
    }

    /// Stop engine helpers and remove ephemeral storage.
    pub fn teardown(self) -> Result<()> {
        self.engine.release(self.keyring.handle())?;
        self.keyring.teardown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::requests::EncryptOptions;
    use crate::core::services::test_support::FakeEngine;

    #[test]
    fn ephemeral_session_is_removed_on_teardown() {
        let session = PgpSession::open(FakeEngine::new(), None).unwrap();
        let path = session.keyring().path().to_path_buf();
        assert!(session.keyring().is_ephemeral());
        assert!(path.is_dir());

        session.teardown().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn explicit_home_survives_teardown() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("keyring");
        let session = PgpSession::open(FakeEngine::new(), Some(&home)).unwrap();
        assert!(!session.keyring().is_ephemeral());

        session.teardown().unwrap();
        assert!(home.is_dir());
    }

    #[test]
    fn set_home_directory_replaces_ephemeral_keyring() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = PgpSession::open(FakeEngine::new(), None).unwrap();
        let old = session.keyring().path().to_path_buf();

        let home = dir.path().join("persistent");
        let handle = session.set_home_directory(&home).unwrap();
        assert_eq!(handle.path(), home.as_path());
        assert!(!old.exists());
        assert!(home.is_dir());
    }

    #[test]
    fn key_params_use_session_defaults() {
        let session = PgpSession::open(FakeEngine::new(), None)
            .unwrap()
            .with_defaults(Defaults {
                key_length: 3072,
                expire: "1y".into(),
                armor: false,
            });
        let params = session.key_params("a@example.com", "A");
        assert_eq!(params.key_length, 3072);
        assert_eq!(params.expire, "1y");
    }

    #[test]
    fn services_share_one_keyring() {
        let session = PgpSession::open(FakeEngine::new(), None).unwrap();
        session
            .keys()
            .generate(&session.key_params("alice@example.com", "Alice"))
            .unwrap();
        let ciphertext = session
            .encryption()
            .encrypt(b"hi", "alice@example.com", &EncryptOptions::default())
            .unwrap();
        assert_eq!(
            session.encryption().decrypt(ciphertext.as_bytes(), None).unwrap(),
            b"hi"
        );
        assert_eq!(session.version().unwrap(), "fake (pgpkit tests) 1.0");
    }
}
