//! Keyring-scoped OpenPGP operations on top of an external engine.
//!
//! `core` holds the domain (models, the engine port, orchestration
//! services), `adapters` the gpg-backed engine and `config` the optional
//! TOML configuration. Most callers only need [`PgpSession`].

pub mod adapters;
pub mod config;
pub mod core;

pub use crate::adapters::gpg::gpg_engine::GpgEngine;
pub use crate::core::errors::{PgpError, Result};
pub use crate::core::models::key_record::{KeyRecord, SubkeyRecord, TrustLevel};
pub use crate::core::models::keyring_handle::KeyringHandle;
pub use crate::core::models::requests::{
    Ciphertext, EncryptOptions, KeyGenParams, Passphrase, Recipients, passphrase,
};
pub use crate::core::models::verification::VerificationRecord;
pub use crate::core::services::encryption_service::write_atomically;
pub use crate::core::services::session::{Defaults, PgpSession};
pub use crate::core::traits::engine::OpenPgpEngine;
