use tracing::{debug, info};

use crate::core::errors::{PgpError, Result};
use crate::core::models::requests::Passphrase;
use crate::core::models::verification::VerificationRecord;
use crate::core::services::key_service::KeyService;
use crate::core::services::keyring_state::KeyringState;
use crate::core::services::normalizer;
use crate::core::traits::engine::OpenPgpEngine;

/// Cleartext signing and signature verification.
pub struct SignatureService<'a, E: OpenPgpEngine> {
    pub engine: &'a E,
    pub keyring: &'a KeyringState,
}

impl<'a, E: OpenPgpEngine> SignatureService<'a, E> {
    pub fn new(engine: &'a E, keyring: &'a KeyringState) -> Self {
        Self { engine, keyring }
    }

    /// Clear-sign `payload` with the secret key matching `identifier`.
    ///
    /// An identifier with no secret key behind it is `SignerNotFound`, even
    /// when its public key is present.
    pub fn sign(
        &self,
        payload: &[u8],
        identifier: &str,
        passphrase: Option<&Passphrase>,
    ) -> Result<String> {
        let signer = match KeyService::new(self.engine, self.keyring).resolve(identifier, true) {
            Ok(record) => record,
            Err(PgpError::KeyNotFound { identifier }) => {
                return Err(PgpError::SignerNotFound { identifier });
            }
            Err(other) => return Err(other),
        };

        let signed = self
            .engine
            .sign(self.keyring.handle(), payload, &signer.fingerprint, passphrase)
            .map_err(|e| match e {
                PgpError::WrongPassphrase { .. }
                | PgpError::SigningFailed { .. }
                | PgpError::EngineTimeout { .. }
                | PgpError::EngineUnavailable { .. } => e,
                other => PgpError::SigningFailed {
                    reason: other.to_string(),
                },
            })?;

        info!(fingerprint = %signer.fingerprint, "signed payload");
        Ok(signed)
    }

    /// Verify a cleartext-signed block.
    ///
    /// A bad signature or an unknown signer yields `valid == false`; only
    /// input without any signature is an error.
    pub fn verify(&self, signed: &[u8]) -> Result<VerificationRecord> {
        let status = self.engine.verify(self.keyring.handle(), signed)?;
        let record = normalizer::verification_record(&status)?;
        debug!(valid = record.valid, key_id = %record.key_id, "verified signature");
        Ok(record)
    }
}
