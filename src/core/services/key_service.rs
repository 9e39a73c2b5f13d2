use std::path::Path;

use tracing::{debug, info};

use crate::core::errors::{PgpError, Result};
use crate::core::models::key_record::KeyRecord;
use crate::core::models::requests::{KeyGenParams, Passphrase};
use crate::core::services::keyring_state::KeyringState;
use crate::core::services::normalizer;
use crate::core::services::resolver::{Resolution, resolve};
use crate::core::traits::engine::OpenPgpEngine;

/// Generates, imports, exports, inspects and deletes keys in one keyring.
///
/// Every lookup re-lists the keyring; nothing is cached between calls.
pub struct KeyService<'a, E: OpenPgpEngine> {
    pub engine: &'a E,
    pub keyring: &'a KeyringState,
}

impl<'a, E: OpenPgpEngine> KeyService<'a, E> {
    pub fn new(engine: &'a E, keyring: &'a KeyringState) -> Self {
        Self { engine, keyring }
    }

    /// Generate a key pair and return its fingerprint.
    pub fn generate(&self, params: &KeyGenParams) -> Result<String> {
        let _guard = self.keyring.lock_mutations();
        let fingerprint = self.engine.generate_key(self.keyring.handle(), params)?;
        if fingerprint.is_empty() {
            return Err(PgpError::KeyGenerationFailed {
                reason: format!("engine returned no fingerprint for {}", params.email),
            });
        }
        info!(email = %params.email, %fingerprint, "generated key pair");
        Ok(fingerprint)
    }

    /// Import armored (or binary) key data.
    pub fn import_key(&self, data: &[u8]) -> Result<Vec<String>> {
        let _guard = self.keyring.lock_mutations();
        let fingerprints = self.engine.import_key(self.keyring.handle(), data)?;
        if fingerprints.is_empty() {
            return Err(PgpError::ImportFailed {
                reason: "no importable keys found".into(),
            });
        }
        info!(count = fingerprints.len(), "imported key(s)");
        Ok(fingerprints)
    }

    /// Read a key file and import it.
    pub fn import_key_file(&self, path: &Path) -> Result<Vec<String>> {
        if !path.exists() {
            return Err(PgpError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let data = std::fs::read(path)?;
        self.import_key(&data)
    }

    /// Armored public key for exactly one matching key.
    pub fn export_public(&self, identifier: &str) -> Result<String> {
        let record = self.resolve(identifier, false)?;
        self.engine
            .export_key(self.keyring.handle(), &record.fingerprint, false, None)
    }

    /// Armored secret key for exactly one matching secret key.
    pub fn export_secret(&self, identifier: &str, passphrase: Option<&Passphrase>) -> Result<String> {
        let record = self.resolve(identifier, true)?;
        self.engine
            .export_key(self.keyring.handle(), &record.fingerprint, true, passphrase)
    }

    /// Public (or secret) keys in engine listing order.
    pub fn list(&self, secret: bool) -> Result<Vec<KeyRecord>> {
        let raw = self.engine.list_keys(self.keyring.handle(), secret)?;
        Ok(raw.iter().map(normalizer::key_record).collect())
    }

    /// Full record for exactly one matching key.
    pub fn get_info(&self, identifier: &str) -> Result<KeyRecord> {
        self.resolve(identifier, false)
    }

    /// Remove a key from the keyring.
    ///
    /// With `secret` only the secret part goes. Without it the whole key
    /// goes, secret part included when there is one.
    pub fn delete(
        &self,
        identifier: &str,
        secret: bool,
        passphrase: Option<&Passphrase>,
    ) -> Result<()> {
        let _guard = self.keyring.lock_mutations();
        let handle = self.keyring.handle();

        let record = self.resolve(identifier, secret)?;
        let fingerprint = record.fingerprint.as_str();
        let has_secret = secret || self.has_secret(fingerprint)?;

        if has_secret {
            // gpg deletes secret keys without asking for the passphrase, so
            // unlock the key first and stop on a rejection.
            self.engine
                .export_key(handle, fingerprint, true, passphrase)?;
            self.engine
                .delete_key(handle, fingerprint, true, passphrase)?;
        }
        if !secret {
            self.engine.delete_key(handle, fingerprint, false, None)?;
        }

        // gpg can exit cleanly without removing anything; trust the listing.
        let still_listed = self
            .list(secret)?
            .iter()
            .any(|r| r.fingerprint == fingerprint);
        if still_listed {
            return Err(PgpError::KeyDeletionFailed {
                identifier: identifier.to_string(),
                reason: "key is still present after deletion".into(),
            });
        }

        info!(
            %fingerprint,
            part = if secret { "secret" } else { "public" },
            "deleted key"
        );
        Ok(())
    }

    /// Resolve an identifier to exactly one key of the public (or secret)
    /// listing.
    pub fn resolve(&self, identifier: &str, secret: bool) -> Result<KeyRecord> {
        let records = self.list(secret)?;
        match resolve(&records, identifier) {
            Resolution::Found(record) => {
                debug!(identifier, fingerprint = %record.fingerprint, "resolved key");
                Ok(record.clone())
            }
            Resolution::NotFound => Err(PgpError::KeyNotFound {
                identifier: identifier.to_string(),
            }),
            Resolution::Ambiguous(matches) => Err(PgpError::AmbiguousKey {
                identifier: identifier.to_string(),
                count: matches.len(),
                candidates: matches
                    .iter()
                    .map(|r| r.fingerprint.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    fn has_secret(&self, fingerprint: &str) -> Result<bool> {
        Ok(self
            .list(true)?
            .iter()
            .any(|r| r.fingerprint == fingerprint))
    }
}
