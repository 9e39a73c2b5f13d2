//! Shared setup for the integration tests.
//!
//! Tests that need a real gpg call `gpg_session()` and return early when it
//! yields `None`.

#![allow(dead_code)]

use pgpkit::{GpgEngine, PgpSession};

/// Initialize test logging (safe to call from every test).
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("pgpkit=debug")
        .with_test_writer()
        .try_init();
}

pub fn gpg_available() -> bool {
    GpgEngine::new().is_available()
}

/// A session on a fresh ephemeral keyring, or `None` without gpg.
pub fn gpg_session() -> Option<PgpSession<GpgEngine>> {
    init_test_logging();
    if !gpg_available() {
        eprintln!("gpg not found; skipping");
        return None;
    }
    Some(PgpSession::open(GpgEngine::new(), None).expect("ephemeral keyring"))
}
