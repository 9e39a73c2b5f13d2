mod common;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Run pgpkit with a clean environment against `home`.
fn pgpkit(home: &std::path::Path) -> Command {
    let mut cmd = cargo_bin_cmd!("pgpkit");
    cmd.env_remove("PGPKIT_PASSPHRASE")
        .env_remove("PGPKIT_GPG")
        .env_remove("RUST_LOG")
        .env("PGPKIT_HOME", home);
    cmd
}

#[test]
fn help_lists_commands() {
    let dir = assert_fs::TempDir::new().unwrap();
    pgpkit(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("keys"))
        .stdout(predicate::str::contains("encrypt"))
        .stdout(predicate::str::contains("verify"));
}

#[test]
fn encrypt_without_recipient_is_usage_error() {
    let dir = assert_fs::TempDir::new().unwrap();
    pgpkit(dir.path())
        .args(["encrypt", "-"])
        .write_stdin("data")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--recipient"));
}

#[test]
fn missing_config_file_is_reported() {
    let dir = assert_fs::TempDir::new().unwrap();
    pgpkit(dir.path())
        .args(["--config", "does-not-exist.toml", "version"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn malformed_config_is_reported() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("config.toml").write_str("[engine\n").unwrap();
    pgpkit(dir.path())
        .args(["--config", "config.toml", "version"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn missing_gpg_binary_is_engine_unavailable() {
    let dir = assert_fs::TempDir::new().unwrap();
    pgpkit(dir.path())
        .args(["--gpg", "/nonexistent/gpg", "keys", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OpenPGP engine unavailable"));
}

#[test]
fn version_reports_engine() {
    if !common::gpg_available() {
        return;
    }
    let dir = assert_fs::TempDir::new().unwrap();
    pgpkit(dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("GnuPG"));
}

#[test]
fn generate_encrypt_decrypt_through_cli() {
    if !common::gpg_available() {
        return;
    }
    let dir = assert_fs::TempDir::new().unwrap();
    let home = dir.child("keyring");

    pgpkit(home.path())
        .args(["keys", "generate", "alice@example.com", "Alice"])
        .env("PGPKIT_PASSPHRASE", "secret123")
        .assert()
        .success()
        .stderr(predicate::str::contains("Generated key"));

    pgpkit(home.path())
        .args(["keys", "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice@example.com"));

    dir.child("plain.txt").write_str("Hello, World!").unwrap();
    pgpkit(home.path())
        .args(["encrypt", "-r", "alice@example.com", "-o"])
        .arg(dir.child("plain.asc").path())
        .arg(dir.child("plain.txt").path())
        .assert()
        .success();
    dir.child("plain.asc")
        .assert(predicate::str::starts_with("-----BEGIN PGP MESSAGE-----"));

    pgpkit(home.path())
        .arg("decrypt")
        .arg(dir.child("plain.asc").path())
        .env("PGPKIT_PASSPHRASE", "secret123")
        .assert()
        .success()
        .stdout("Hello, World!");

    pgpkit(home.path())
        .arg("decrypt")
        .arg(dir.child("plain.asc").path())
        .env("PGPKIT_PASSPHRASE", "wrong")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wrong passphrase"));
}

#[test]
fn unknown_recipient_writes_nothing() {
    if !common::gpg_available() {
        return;
    }
    let dir = assert_fs::TempDir::new().unwrap();
    let out = dir.child("out.asc");

    pgpkit(dir.child("keyring").path())
        .args(["encrypt", "-r", "ghost@example.com", "-o"])
        .arg(out.path())
        .write_stdin("data")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Recipient not found"));
    out.assert(predicate::path::missing());
}

#[test]
fn sign_then_verify_through_cli() {
    if !common::gpg_available() {
        return;
    }
    let dir = assert_fs::TempDir::new().unwrap();
    let home = dir.child("keyring");

    pgpkit(home.path())
        .args(["keys", "generate", "signer@example.com", "Signer"])
        .assert()
        .success();

    let signed = pgpkit(home.path())
        .args(["sign", "-k", "signer@example.com", "-"])
        .write_stdin("ship it\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    dir.child("msg.asc").write_binary(&signed).unwrap();

    pgpkit(home.path())
        .args(["verify", "--json"])
        .arg(dir.child("msg.asc").path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"valid\": true"));
}

#[test]
fn symmetric_needs_a_passphrase() {
    let dir = assert_fs::TempDir::new().unwrap();
    pgpkit(dir.path())
        .args(["symmetric", "-"])
        .write_stdin("data")
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs a passphrase"));
}
