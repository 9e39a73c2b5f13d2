use crate::core::errors::Result;
use crate::core::models::keyring_handle::KeyringHandle;
use crate::core::models::raw_listing::{RawKeyEntry, SignatureStatus};
use crate::core::models::requests::{KeyGenParams, Passphrase};

/// Decrypted payload plus whatever signature status came with it.
#[derive(Debug, Clone, Default)]
pub struct Decrypted {
    pub plaintext: Vec<u8>,
    pub signature: SignatureStatus,
}

/// Port for the external OpenPGP engine.
///
/// Implementations live in `adapters` (e.g. `GpgEngine`). The services only
/// ever depend on this trait. Every call names the keyring it runs against;
/// keys are always passed as fully resolved fingerprints.
pub trait OpenPgpEngine: Send + Sync {
    /// Generate a key pair and return its fingerprint.
    fn generate_key(&self, keyring: &KeyringHandle, params: &KeyGenParams) -> Result<String>;

    /// Import every key in `data`, returning the imported fingerprints.
    fn import_key(&self, keyring: &KeyringHandle, data: &[u8]) -> Result<Vec<String>>;

    /// Export one key as armored text.
    fn export_key(
        &self,
        keyring: &KeyringHandle,
        fingerprint: &str,
        secret: bool,
        passphrase: Option<&Passphrase>,
    ) -> Result<String>;

    /// List public (or secret) keys in engine order.
    fn list_keys(&self, keyring: &KeyringHandle, secret: bool) -> Result<Vec<RawKeyEntry>>;

    /// Delete a key. `secret` removes the secret part only; the public part
    /// is removed when `secret` is false.
    fn delete_key(
        &self,
        keyring: &KeyringHandle,
        fingerprint: &str,
        secret: bool,
        passphrase: Option<&Passphrase>,
    ) -> Result<()>;

    /// Encrypt to `recipients`, optionally signing with `signer`.
    fn encrypt(
        &self,
        keyring: &KeyringHandle,
        plaintext: &[u8],
        recipients: &[String],
        signer: Option<&str>,
        passphrase: Option<&Passphrase>,
        armor: bool,
    ) -> Result<Vec<u8>>;

    fn decrypt(
        &self,
        keyring: &KeyringHandle,
        ciphertext: &[u8],
        passphrase: Option<&Passphrase>,
    ) -> Result<Decrypted>;

    /// Password-only encryption; no key material involved.
    fn encrypt_symmetric(
        &self,
        keyring: &KeyringHandle,
        plaintext: &[u8],
        passphrase: &Passphrase,
        armor: bool,
    ) -> Result<Vec<u8>>;

    /// Produce a cleartext-signed message.
    fn sign(
        &self,
        keyring: &KeyringHandle,
        plaintext: &[u8],
        signer: &str,
        passphrase: Option<&Passphrase>,
    ) -> Result<String>;

    /// Check a signed block. Only malformed input is an error.
    fn verify(&self, keyring: &KeyringHandle, signed: &[u8]) -> Result<SignatureStatus>;

    /// Engine version banner.
    fn version(&self) -> Result<String>;

    /// Release engine-side resources bound to a keyring (agents, sockets)
    /// before its storage goes away.
    fn release(&self, _keyring: &KeyringHandle) -> Result<()> {
        Ok(())
    }

    /// Human-readable name of this engine (e.g. "gpg").
    fn name(&self) -> &str;
}
