use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::time::Duration;

use secrecy::ExposeSecret;
use tracing::debug;

use crate::adapters::gpg::colon_listing::parse_key_listing;
use crate::adapters::gpg::status::StatusReport;
use crate::core::errors::{PgpError, Result};
use crate::core::models::keyring_handle::KeyringHandle;
use crate::core::models::raw_listing::{RawKeyEntry, SignatureStatus};
use crate::core::models::requests::{KeyGenParams, Passphrase};
use crate::core::traits::engine::{Decrypted, OpenPgpEngine};

const MIN_RSA_BITS: u32 = 1024;
const MAX_RSA_BITS: u32 = 4096;

/// OpenPGP engine that shells out to the system `gpg` binary.
///
/// Every invocation runs in batch mode with loopback pinentry against the
/// keyring named by the caller, and reports machine-readable status on
/// stderr.
pub struct GpgEngine {
    /// Path to the gpg binary (defaults to "gpg").
    gpg_path: PathBuf,
    /// Per-invocation deadline; `None` waits forever.
    timeout: Option<Duration>,
}

/// Raw result of one gpg run.
struct GpgRun {
    success: bool,
    stdout: Vec<u8>,
    report: StatusReport,
}

impl GpgEngine {
    /// Create an engine using the default `gpg` binary.
    pub fn new() -> Self {
        Self {
            gpg_path: PathBuf::from("gpg"),
            timeout: None,
        }
    }

    /// Create an engine with a custom gpg binary path.
    pub fn with_path(gpg_path: PathBuf) -> Self {
        Self {
            gpg_path,
            timeout: None,
        }
    }

    /// Bound every gpg invocation by `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check if gpg can be executed.
    pub fn is_available(&self) -> bool {
        Command::new(&self.gpg_path)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success())
    }

    fn base_command(&self, keyring: &KeyringHandle) -> Vec<String> {
        vec![
            "--homedir".into(),
            keyring.path().display().to_string(),
            "--batch".into(),
            "--yes".into(),
            "--no-tty".into(),
            "--pinentry-mode".into(),
            "loopback".into(),
            "--status-fd".into(),
            "2".into(),
        ]
    }

    /// Run gpg against `keyring`.
    ///
    /// A passphrase is fed as the first stdin line (`--passphrase-fd 0`),
    /// ahead of `input`.
    fn run(
        &self,
        keyring: &KeyringHandle,
        args: &[&str],
        passphrase: Option<&Passphrase>,
        input: &[u8],
    ) -> Result<GpgRun> {
        let mut full_args = self.base_command(keyring);
        let mut stdin_data = Vec::with_capacity(input.len() + 64);

        if let Some(pass) = passphrase {
            let secret = pass.expose_secret();
            if secret.contains('\n') {
                return Err(PgpError::InvalidConfig {
                    detail: "passphrases must not contain newlines".into(),
                });
            }
            full_args.push("--passphrase-fd".into());
            full_args.push("0".into());
            stdin_data.extend_from_slice(secret.as_bytes());
            stdin_data.push(b'\n');
        }
        stdin_data.extend_from_slice(input);
        full_args.extend(args.iter().map(|a| a.to_string()));

        debug!(
            homedir = %keyring.path().display(),
            command = args.first().copied().unwrap_or_default(),
            "invoking gpg"
        );

        let output = match self.timeout {
            Some(limit) => self.spawn_with_deadline(&full_args, stdin_data, limit)?,
            None => self.spawn_blocking(&full_args, stdin_data)?,
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        Ok(GpgRun {
            success: output.status.success(),
            stdout: output.stdout,
            report: StatusReport::parse(&stderr),
        })
    }

    fn spawn_blocking(&self, args: &[String], stdin_data: Vec<u8>) -> Result<Output> {
        let mut child = Command::new(&self.gpg_path)
            .env("LC_ALL", "C")
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PgpError::EngineUnavailable {
                reason: format!("failed to run {}: {e}", self.gpg_path.display()),
            })?;

        // Feed stdin from a separate thread so a large payload cannot deadlock
        // against gpg filling its stdout pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            std::thread::spawn(move || {
                if let Err(e) = stdin.write_all(&stdin_data) {
                    debug!(error = %e, "gpg closed stdin early");
                }
            })
        });

        let output = child.wait_with_output()?;
        if let Some(handle) = writer {
            if handle.join().is_err() {
                debug!("gpg stdin writer thread panicked");
            }
        }
        Ok(output)
    }

    fn spawn_with_deadline(
        &self,
        args: &[String],
        stdin_data: Vec<u8>,
        limit: Duration,
    ) -> Result<Output> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        rt.block_on(async {
            use tokio::io::AsyncWriteExt;

            let mut child = tokio::process::Command::new(&self.gpg_path)
                .env("LC_ALL", "C")
                .args(args)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| PgpError::EngineUnavailable {
                    reason: format!("failed to run {}: {e}", self.gpg_path.display()),
                })?;

            if let Some(mut stdin) = child.stdin.take() {
                tokio::spawn(async move {
                    if let Err(e) = stdin.write_all(&stdin_data).await {
                        debug!(error = %e, "gpg closed stdin early");
                    }
                });
            }

            // Dropping the future on expiry drops the child, which kills it.
            match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(output) => Ok(output?),
                Err(_) => Err(PgpError::EngineTimeout {
                    secs: limit.as_secs(),
                }),
            }
        })
    }

    fn gpgconf_path(&self) -> PathBuf {
        match self.gpg_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join("gpgconf"),
            _ => PathBuf::from("gpgconf"),
        }
    }
}

impl Default for GpgEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject parameter values that would break out of a gen-key parameter line.
fn check_param_line(label: &str, value: &str) -> Result<()> {
    if value.contains('\n') || value.contains('\r') {
        return Err(PgpError::KeyGenerationFailed {
            reason: format!("{label} must not contain line breaks"),
        });
    }
    Ok(())
}

fn key_generation_script(params: &KeyGenParams) -> Result<String> {
    if !(MIN_RSA_BITS..=MAX_RSA_BITS).contains(&params.key_length) {
        return Err(PgpError::KeyGenerationFailed {
            reason: format!(
                "unsupported RSA key length {} (expected {MIN_RSA_BITS}..={MAX_RSA_BITS})",
                params.key_length
            ),
        });
    }
    check_param_line("name", &params.name)?;
    check_param_line("email", &params.email)?;
    check_param_line("expiration", &params.expire)?;

    let mut script = format!(
        "Key-Type: RSA\n\
         Key-Length: {bits}\n\
         Subkey-Type: RSA\n\
         Subkey-Length: {bits}\n\
         Name-Real: {name}\n\
         Name-Email: {email}\n\
         Expire-Date: {expire}\n",
        bits = params.key_length,
        name = params.name,
        email = params.email,
        expire = params.expire,
    );

    match &params.passphrase {
        Some(pass) if !pass.expose_secret().is_empty() => {
            check_param_line("passphrase", pass.expose_secret())?;
            script.push_str(&format!("Passphrase: {}\n", pass.expose_secret()));
        }
        _ => script.push_str("%no-protection\n"),
    }
    script.push_str("%commit\n");
    Ok(script)
}

impl OpenPgpEngine for GpgEngine {
    fn generate_key(&self, keyring: &KeyringHandle, params: &KeyGenParams) -> Result<String> {
        let script = key_generation_script(params)?;
        // The agent caches nothing, so gpg asks again when binding the
        // subkey; the script line alone is not enough.
        let run = self.run(
            keyring,
            &["--gen-key"],
            params
                .passphrase
                .as_ref()
                .filter(|p| !p.expose_secret().is_empty()),
            script.as_bytes(),
        )?;

        // KEY_CREATED <type> <fingerprint> [<handle>]
        run.report
            .args("KEY_CREATED")
            .and_then(|args| args.get(1).cloned())
            .ok_or_else(|| PgpError::KeyGenerationFailed {
                reason: format!(
                    "gpg reported no fingerprint for {}: {}",
                    params.email,
                    run.report.diagnostics()
                ),
            })
    }

    fn import_key(&self, keyring: &KeyringHandle, data: &[u8]) -> Result<Vec<String>> {
        let run = self.run(keyring, &["--import"], None, data)?;

        // IMPORT_OK <reason> <fingerprint>; a key with a secret part
        // reports twice.
        let mut fingerprints: Vec<String> = Vec::new();
        for args in run.report.all("IMPORT_OK") {
            if let Some(fpr) = args.get(1)
                && !fpr.is_empty()
                && !fingerprints.contains(fpr)
            {
                fingerprints.push(fpr.clone());
            }
        }

        if fingerprints.is_empty() {
            return Err(PgpError::ImportFailed {
                reason: format!("no importable keys found: {}", run.report.diagnostics()),
            });
        }
        Ok(fingerprints)
    }

    fn export_key(
        &self,
        keyring: &KeyringHandle,
        fingerprint: &str,
        secret: bool,
        passphrase: Option<&Passphrase>,
    ) -> Result<String> {
        let command = if secret {
            "--export-secret-keys"
        } else {
            "--export"
        };
        let pass = if secret { passphrase } else { None };
        let run = self.run(keyring, &["--armor", command, fingerprint], pass, &[])?;

        if secret && run.report.passphrase_rejected(pass.is_some()) {
            return Err(PgpError::WrongPassphrase {
                target: fingerprint.to_string(),
            });
        }
        if run.stdout.is_empty() {
            return Err(PgpError::KeyNotFound {
                identifier: fingerprint.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&run.stdout).into_owned())
    }

    fn list_keys(&self, keyring: &KeyringHandle, secret: bool) -> Result<Vec<RawKeyEntry>> {
        let command = if secret {
            "--list-secret-keys"
        } else {
            "--list-keys"
        };
        let run = self.run(
            keyring,
            &[
                command,
                "--with-colons",
                "--fixed-list-mode",
                "--with-fingerprint",
                "--with-fingerprint",
            ],
            None,
            &[],
        )?;

        // An empty keyring makes gpg exit non-zero on some versions;
        // the listing is authoritative either way.
        if !run.success {
            debug!(diagnostics = %run.report.diagnostics(), "gpg listing exited non-zero");
        }
        Ok(parse_key_listing(&String::from_utf8_lossy(&run.stdout)))
    }

    fn delete_key(
        &self,
        keyring: &KeyringHandle,
        fingerprint: &str,
        secret: bool,
        passphrase: Option<&Passphrase>,
    ) -> Result<()> {
        let (command, pass) = if secret {
            ("--delete-secret-keys", passphrase)
        } else {
            ("--delete-keys", None)
        };
        let run = self.run(keyring, &[command, fingerprint], pass, &[])?;

        if secret && run.report.passphrase_rejected(pass.is_some()) {
            return Err(PgpError::WrongPassphrase {
                target: fingerprint.to_string(),
            });
        }
        if !run.success {
            return Err(PgpError::KeyDeletionFailed {
                identifier: fingerprint.to_string(),
                reason: run.report.diagnostics(),
            });
        }
        Ok(())
    }

    fn encrypt(
        &self,
        keyring: &KeyringHandle,
        plaintext: &[u8],
        recipients: &[String],
        signer: Option<&str>,
        passphrase: Option<&Passphrase>,
        armor: bool,
    ) -> Result<Vec<u8>> {
        if recipients.is_empty() {
            return Err(PgpError::EncryptionFailed {
                reason: "No recipients provided".into(),
            });
        }

        let mut args = vec!["--encrypt", "--trust-model", "always"];
        if armor {
            args.push("--armor");
        }
        for fpr in recipients {
            args.push("--recipient");
            args.push(fpr);
        }
        if let Some(fpr) = signer {
            args.extend_from_slice(&["--sign", "--local-user", fpr]);
        }
        let pass = signer.and(passphrase);

        let run = self.run(keyring, &args, pass, plaintext)?;

        if signer.is_some() && run.report.passphrase_rejected(pass.is_some()) {
            return Err(PgpError::WrongPassphrase {
                target: signer.unwrap_or_default().to_string(),
            });
        }
        if !run.success || run.stdout.is_empty() || !run.report.has("END_ENCRYPTION") {
            return Err(PgpError::EncryptionFailed {
                reason: run.report.diagnostics(),
            });
        }
        Ok(run.stdout)
    }

    fn decrypt(
        &self,
        keyring: &KeyringHandle,
        ciphertext: &[u8],
        passphrase: Option<&Passphrase>,
    ) -> Result<Decrypted> {
        let run = self.run(keyring, &["--decrypt"], passphrase, ciphertext)?;

        // gpg exits non-zero when an embedded signature cannot be checked;
        // the decryption itself is judged by DECRYPTION_OKAY alone.
        if run.report.has("DECRYPTION_OKAY") {
            return Ok(Decrypted {
                plaintext: run.stdout,
                signature: run.report.signature(),
            });
        }

        if run.report.passphrase_rejected(passphrase.is_some()) {
            return Err(PgpError::WrongPassphrase {
                target: "message key".into(),
            });
        }

        let missing: Vec<String> = run
            .report
            .all("NO_SECKEY")
            .filter_map(|args| args.first().cloned())
            .collect();
        let reason = if missing.is_empty() {
            run.report.diagnostics()
        } else {
            format!("no secret key for recipient(s) {}", missing.join(", "))
        };
        Err(PgpError::DecryptionFailed { reason })
    }

    fn encrypt_symmetric(
        &self,
        keyring: &KeyringHandle,
        plaintext: &[u8],
        passphrase: &Passphrase,
        armor: bool,
    ) -> Result<Vec<u8>> {
        let mut args = vec!["--symmetric"];
        if armor {
            args.push("--armor");
        }
        let run = self.run(keyring, &args, Some(passphrase), plaintext)?;

        if !run.success || run.stdout.is_empty() {
            return Err(PgpError::EncryptionFailed {
                reason: format!("symmetric encryption failed: {}", run.report.diagnostics()),
            });
        }
        Ok(run.stdout)
    }

    fn sign(
        &self,
        keyring: &KeyringHandle,
        plaintext: &[u8],
        signer: &str,
        passphrase: Option<&Passphrase>,
    ) -> Result<String> {
        let run = self.run(
            keyring,
            &["--clearsign", "--local-user", signer],
            passphrase,
            plaintext,
        )?;

        if run.report.passphrase_rejected(passphrase.is_some()) {
            return Err(PgpError::WrongPassphrase {
                target: signer.to_string(),
            });
        }
        if !run.success || !run.report.has("SIG_CREATED") {
            return Err(PgpError::SigningFailed {
                reason: run.report.diagnostics(),
            });
        }
        Ok(String::from_utf8_lossy(&run.stdout).into_owned())
    }

    fn verify(&self, keyring: &KeyringHandle, signed: &[u8]) -> Result<SignatureStatus> {
        let run = self.run(keyring, &["--verify"], None, signed)?;
        let status = run.report.signature();

        if status.verdict.is_none() {
            return Err(PgpError::VerificationError {
                reason: format!("no signature found: {}", run.report.diagnostics()),
            });
        }
        Ok(status)
    }

    fn version(&self) -> Result<String> {
        let output = Command::new(&self.gpg_path)
            .env("LC_ALL", "C")
            .arg("--version")
            .output()
            .map_err(|e| PgpError::EngineUnavailable {
                reason: format!("failed to run {}: {e}", self.gpg_path.display()),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .next()
            .filter(|line| output.status.success() && !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| PgpError::EngineUnavailable {
                reason: "gpg --version produced no output".into(),
            })
    }

    fn release(&self, keyring: &KeyringHandle) -> Result<()> {
        let result = Command::new(self.gpgconf_path())
            .arg("--homedir")
            .arg(keyring.path())
            .args(["--kill", "gpg-agent"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if let Err(e) = result {
            debug!(error = %e, "could not stop gpg-agent");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "gpg"
    }
}
