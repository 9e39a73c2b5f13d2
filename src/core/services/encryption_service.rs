use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::core::errors::{PgpError, Result};
use crate::core::models::requests::{Ciphertext, EncryptOptions, Passphrase, Recipients};
use crate::core::models::verification::VerificationRecord;
use crate::core::services::key_service::KeyService;
use crate::core::services::keyring_state::KeyringState;
use crate::core::services::normalizer;
use crate::core::traits::engine::OpenPgpEngine;

/// Plaintext plus whatever the engine could say about an embedded signature.
#[derive(Debug, Clone)]
pub struct DecryptedMessage {
    pub plaintext: Vec<u8>,
    /// `None` when the message carried no signature.
    pub signature: Option<VerificationRecord>,
}

/// Orchestrates public-key and password-based encryption against one
/// keyring.
///
/// Recipients and signers are resolved before the engine is invoked, so an
/// unknown or ambiguous identifier never produces partial ciphertext.
pub struct EncryptionService<'a, E: OpenPgpEngine> {
    pub engine: &'a E,
    pub keyring: &'a KeyringState,
}

impl<'a, E: OpenPgpEngine> EncryptionService<'a, E> {
    pub fn new(engine: &'a E, keyring: &'a KeyringState) -> Self {
        Self { engine, keyring }
    }

    fn keys(&self) -> KeyService<'a, E> {
        KeyService::new(self.engine, self.keyring)
    }

    /// Encrypt `payload` to every recipient, optionally co-signing.
    pub fn encrypt(
        &self,
        payload: &[u8],
        recipients: impl Into<Recipients>,
        options: &EncryptOptions,
    ) -> Result<Ciphertext> {
        let recipients = recipients.into();
        if recipients.is_empty() {
            return Err(PgpError::InvalidConfig {
                detail: "at least one recipient is required".into(),
            });
        }

        let keys = self.keys();
        let mut fingerprints: Vec<String> = Vec::new();
        for identifier in recipients.identifiers() {
            let record = keys.resolve(identifier, false).map_err(|e| match e {
                PgpError::KeyNotFound { identifier } => PgpError::RecipientNotFound { identifier },
                other => other,
            })?;
            if !fingerprints.contains(&record.fingerprint) {
                fingerprints.push(record.fingerprint);
            }
        }

        let signer = match options.sign.as_deref() {
            Some(identifier) => Some(self.resolve_signer(identifier)?),
            None => None,
        };

        debug!(
            recipients = fingerprints.len(),
            signed = signer.is_some(),
            armor = options.armor,
            "encrypting"
        );
        let output = self.engine.encrypt(
            self.keyring.handle(),
            payload,
            &fingerprints,
            signer.as_deref(),
            options.passphrase.as_ref(),
            options.armor,
        )?;
        if output.is_empty() {
            return Err(PgpError::EncryptionFailed {
                reason: "engine produced no ciphertext".into(),
            });
        }
        into_ciphertext(output, options.armor)
    }

    /// Password-based encryption; no keys are looked up.
    pub fn encrypt_symmetric(
        &self,
        payload: &[u8],
        passphrase: &Passphrase,
        armor: bool,
    ) -> Result<Ciphertext> {
        let output =
            self.engine
                .encrypt_symmetric(self.keyring.handle(), payload, passphrase, armor)?;
        if output.is_empty() {
            return Err(PgpError::EncryptionFailed {
                reason: "engine produced no ciphertext".into(),
            });
        }
        into_ciphertext(output, armor)
    }

    /// Decrypt public-key or symmetric ciphertext.
    pub fn decrypt(&self, ciphertext: &[u8], passphrase: Option<&Passphrase>) -> Result<Vec<u8>> {
        Ok(self.decrypt_detailed(ciphertext, passphrase)?.plaintext)
    }

    /// Decrypt and decode the plaintext as UTF-8.
    pub fn decrypt_text(&self, ciphertext: &[u8], passphrase: Option<&Passphrase>) -> Result<String> {
        let plaintext = self.decrypt(ciphertext, passphrase)?;
        String::from_utf8(plaintext).map_err(|e| PgpError::DecryptionFailed {
            reason: format!("plaintext is not valid UTF-8: {e}"),
        })
    }

    /// Decrypt and report the embedded signature, if any.
    ///
    /// A bad or unverifiable signature never fails the call.
    pub fn decrypt_detailed(
        &self,
        ciphertext: &[u8],
        passphrase: Option<&Passphrase>,
    ) -> Result<DecryptedMessage> {
        let decrypted = self
            .engine
            .decrypt(self.keyring.handle(), ciphertext, passphrase)?;

        let signature = match decrypted.signature.verdict {
            Some(_) => normalizer::verification_record(&decrypted.signature).ok(),
            None => None,
        };
        if let Some(record) = signature.as_ref().filter(|r| !r.valid) {
            warn!(key_id = %record.key_id, "decrypted message carries an unverified signature");
        }

        Ok(DecryptedMessage {
            plaintext: decrypted.plaintext,
            signature,
        })
    }

    /// Encrypt a file to `dest`. `dest` only appears once encryption succeeded.
    pub fn encrypt_file(
        &self,
        source: &Path,
        dest: &Path,
        recipients: impl Into<Recipients>,
        options: &EncryptOptions,
    ) -> Result<()> {
        let payload = read_input(source)?;
        let ciphertext = self.encrypt(&payload, recipients, options)?;
        write_atomically(dest, ciphertext.as_bytes())?;
        info!(source = %source.display(), dest = %dest.display(), "encrypted file");
        Ok(())
    }

    /// Decrypt a file to `dest`. `dest` only appears once decryption succeeded.
    pub fn decrypt_file(
        &self,
        source: &Path,
        dest: &Path,
        passphrase: Option<&Passphrase>,
    ) -> Result<()> {
        let ciphertext = read_input(source)?;
        let plaintext = self.decrypt(&ciphertext, passphrase)?;
        write_atomically(dest, &plaintext)?;
        info!(source = %source.display(), dest = %dest.display(), "decrypted file");
        Ok(())
    }

    fn resolve_signer(&self, identifier: &str) -> Result<String> {
        match self.keys().resolve(identifier, true) {
            Ok(record) => Ok(record.fingerprint),
            Err(PgpError::KeyNotFound { identifier }) => {
                Err(PgpError::SignerNotFound { identifier })
            }
            Err(other) => Err(other),
        }
    }
}

fn into_ciphertext(output: Vec<u8>, armor: bool) -> Result<Ciphertext> {
    if !armor {
        return Ok(Ciphertext::Binary(output));
    }
    String::from_utf8(output)
        .map(Ciphertext::Armored)
        .map_err(|e| PgpError::EncryptionFailed {
            reason: format!("armored output is not text: {e}"),
        })
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(PgpError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(std::fs::read(path)?)
}

/// Write through a temp file in the destination directory, then rename.
///
/// Readers never see a partially written `dest`.
pub fn write_atomically(dest: &Path, contents: &[u8]) -> Result<()> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(dest).map_err(|e| PgpError::Io(e.error))?;
    Ok(())
}
