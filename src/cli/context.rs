use std::path::PathBuf;

use tracing::debug;

use pgpkit::config::app_config::AppConfig;
use pgpkit::{GpgEngine, Passphrase, PgpError, PgpSession, Result, passphrase};

use crate::cli::Cli;

/// Everything a command needs: an open session plus the global flags.
///
/// Flags and environment variables override the config file.
pub struct Context {
    pub session: PgpSession<GpgEngine>,
    pub passphrase: Option<Passphrase>,
    pub json: bool,
}

impl Context {
    pub fn from_cli(args: &Cli) -> Result<Self> {
        let config = AppConfig::load(args.config.as_deref())?;

        if args.timeout == Some(0) {
            return Err(PgpError::InvalidConfig {
                detail: "--timeout must be greater than zero".into(),
            });
        }
        let timeout = args
            .timeout
            .map(std::time::Duration::from_secs)
            .or_else(|| config.timeout());
        let gpg = args
            .gpg
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.engine.gpg_binary));
        let home = args.homedir.clone().or_else(|| config.keyring.home.clone());

        debug!(gpg = %gpg.display(), home = ?home, ?timeout, "opening session");
        let engine = GpgEngine::with_path(gpg).with_timeout(timeout);
        let session =
            PgpSession::open(engine, home.as_deref())?.with_defaults(config.session_defaults());

        Ok(Self {
            session,
            passphrase: args.passphrase.clone().map(passphrase),
            json: args.json,
        })
    }

    pub fn passphrase(&self) -> Option<&Passphrase> {
        self.passphrase.as_ref()
    }

    /// Like `passphrase`, but the command cannot run without one.
    pub fn require_passphrase(&self, purpose: &str) -> Result<&Passphrase> {
        self.passphrase.as_ref().ok_or_else(|| PgpError::InvalidConfig {
            detail: format!("{purpose} needs a passphrase (--passphrase or PGPKIT_PASSPHRASE)"),
        })
    }

    /// Warn when mutating a keyring that disappears at exit.
    pub fn warn_if_ephemeral(&self) {
        if self.session.keyring().is_ephemeral() {
            crate::cli::output::warning(
                "Using an ephemeral keyring; changes are discarded on exit (set --homedir to keep them)",
            );
        }
    }

    pub fn close(self) -> Result<()> {
        self.session.teardown()
    }
}
