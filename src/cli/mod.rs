pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Keyring-scoped OpenPGP operations: keys, encryption, signatures, passwords.
#[derive(Parser, Debug)]
#[command(name = "pgpkit", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Keyring directory (default: a fresh ephemeral keyring)
    #[arg(long, global = true, env = "PGPKIT_HOME")]
    pub homedir: Option<PathBuf>,

    /// Path to the gpg binary
    #[arg(long, global = true, env = "PGPKIT_GPG")]
    pub gpg: Option<PathBuf>,

    /// Abort any single gpg invocation after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Passphrase for the secret key or symmetric password
    #[arg(long, global = true, env = "PGPKIT_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    /// Path to alternative config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print records as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage keys in the keyring
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },

    /// Encrypt to one or more recipients
    Encrypt {
        /// Input file ("-" or absent for stdin)
        input: Option<PathBuf>,
        /// Recipient identifier (fingerprint, key id, email or name). Repeatable.
        #[arg(short, long = "recipient", required = true)]
        recipients: Vec<String>,
        /// Also sign with this key
        #[arg(long)]
        sign: Option<String>,
        /// Emit binary OpenPGP instead of ASCII armor
        #[arg(long)]
        binary: bool,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decrypt a public-key or password-encrypted message
    Decrypt {
        /// Input file ("-" or absent for stdin)
        input: Option<PathBuf>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Encrypt with a password only
    Symmetric {
        /// Input file ("-" or absent for stdin)
        input: Option<PathBuf>,
        /// Emit binary OpenPGP instead of ASCII armor
        #[arg(long)]
        binary: bool,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Produce a cleartext signature
    Sign {
        /// Input file ("-" or absent for stdin)
        input: Option<PathBuf>,
        /// Signing key identifier
        #[arg(short = 'k', long)]
        key: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a cleartext signature
    Verify {
        /// Signed file ("-" or absent for stdin)
        input: Option<PathBuf>,
    },

    /// Show the OpenPGP engine version
    Version,
}

#[derive(Subcommand, Debug)]
pub enum KeysAction {
    /// Generate a new RSA key pair
    Generate {
        /// Email address for the user id
        email: String,
        /// Real name for the user id
        name: String,
        /// RSA modulus length in bits
        #[arg(long)]
        key_length: Option<u32>,
        /// Expiration ("0" = never, "1y", "30d", ...)
        #[arg(long)]
        expire: Option<String>,
    },
    /// Import keys from a file
    Import {
        /// Key file ("-" for stdin)
        file: PathBuf,
    },
    /// Export a public (or secret) key as armored text
    Export {
        identifier: String,
        /// Export the secret key
        #[arg(long)]
        secret: bool,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List keys
    List {
        /// Only keys with a secret part
        #[arg(long)]
        secret: bool,
    },
    /// Show everything known about one key
    Info { identifier: String },
    /// Delete a key
    Delete {
        identifier: String,
        /// Delete only the secret part
        #[arg(long)]
        secret: bool,
    },
}
