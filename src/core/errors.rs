use std::path::PathBuf;

/// All domain errors for pgpkit.
///
/// Resolution failures (`KeyNotFound`, `AmbiguousKey`, `RecipientNotFound`,
/// `SignerNotFound`) are raised before the engine is touched. Everything
/// passphrase-related surfaces as `WrongPassphrase` so callers can re-prompt
/// instead of aborting.
#[derive(Debug, thiserror::Error)]
pub enum PgpError {
    #[error(
        "Keyring storage unavailable at {path}: {reason}\n\n  \
         Check that the directory exists or can be created, and is writable."
    )]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("Key not found: {identifier}")]
    KeyNotFound { identifier: String },

    #[error(
        "Identifier '{identifier}' matches {count} keys: {candidates}\n\n  \
         Use the full fingerprint to select exactly one key."
    )]
    AmbiguousKey {
        identifier: String,
        count: usize,
        candidates: String,
    },

    #[error("Key generation failed: {reason}")]
    KeyGenerationFailed { reason: String },

    #[error("Key import failed: {reason}")]
    ImportFailed { reason: String },

    #[error(
        "Wrong passphrase for {target}\n\n  \
         The secret key exists but could not be unlocked with the given passphrase."
    )]
    WrongPassphrase { target: String },

    #[error("Recipient not found in keyring: {identifier}")]
    RecipientNotFound { identifier: String },

    #[error("Signing key not found in keyring: {identifier}")]
    SignerNotFound { identifier: String },

    #[error("Encryption failed: {reason}")]
    EncryptionFailed { reason: String },

    #[error(
        "Decryption failed: {reason}\n\n  \
         No local secret key matches the message recipients, or the data is not\n  \
         an OpenPGP message."
    )]
    DecryptionFailed { reason: String },

    #[error("Signing failed: {reason}")]
    SigningFailed { reason: String },

    #[error("Verification error: {reason}")]
    VerificationError { reason: String },

    #[error("Key deletion failed for {identifier}: {reason}")]
    KeyDeletionFailed { identifier: String, reason: String },

    #[error("gpg invocation timed out after {secs} seconds")]
    EngineTimeout { secs: u64 },

    #[error(
        "OpenPGP engine unavailable: {reason}\n\n  \
         Install GnuPG or point --gpg / PGPKIT_GPG at the gpg binary."
    )]
    EngineUnavailable { reason: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PgpError {
    /// True for failures a caller can fix by supplying another passphrase.
    pub fn is_passphrase_error(&self) -> bool {
        matches!(self, PgpError::WrongPassphrase { .. })
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PgpError>;
