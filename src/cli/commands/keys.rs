use std::path::Path;

use pgpkit::{KeyRecord, PgpError, Result};

use crate::cli::KeysAction;
use crate::cli::commands::io_helpers::{armor_kinds, print_json, read_input, write_output};
use crate::cli::context::Context;
use crate::cli::output;

/// Execute the `pgpkit keys` command.
pub fn execute(ctx: &Context, action: &KeysAction) -> Result<()> {
    match action {
        KeysAction::Generate {
            email,
            name,
            key_length,
            expire,
        } => execute_generate(ctx, email, name, *key_length, expire.as_deref()),
        KeysAction::Import { file } => execute_import(ctx, file),
        KeysAction::Export {
            identifier,
            secret,
            output,
        } => execute_export(ctx, identifier, *secret, output.as_deref()),
        KeysAction::List { secret } => execute_list(ctx, *secret),
        KeysAction::Info { identifier } => execute_info(ctx, identifier),
        KeysAction::Delete { identifier, secret } => execute_delete(ctx, identifier, *secret),
    }
}

fn execute_generate(
    ctx: &Context,
    email: &str,
    name: &str,
    key_length: Option<u32>,
    expire: Option<&str>,
) -> Result<()> {
    ctx.warn_if_ephemeral();

    let mut params = ctx.session.key_params(email, name);
    if let Some(bits) = key_length {
        params = params.key_length(bits);
    }
    if let Some(spec) = expire {
        params = params.expire(spec);
    }
    if let Some(pass) = ctx.passphrase() {
        params = params.passphrase(pass.clone());
    } else {
        output::warning("No passphrase given; the secret key will be unprotected");
    }

    let spinner = output::spinner(&format!(
        "Generating {}-bit RSA key for {email}...",
        params.key_length
    ));
    let result = ctx.session.keys().generate(&params);
    spinner.finish_and_clear();
    let fingerprint = result?;

    if ctx.json {
        print_json(&serde_json::json!({ "fingerprint": fingerprint }))?;
    } else {
        output::success(&format!("Generated key {fingerprint}"));
    }
    Ok(())
}

fn execute_import(ctx: &Context, file: &Path) -> Result<()> {
    ctx.warn_if_ephemeral();

    let data = read_input(Some(file))?;
    let blocks = armor_kinds(&data);
    if !blocks.is_empty() && !blocks.iter().any(|b| b.ends_with("KEY BLOCK")) {
        return Err(PgpError::ImportFailed {
            reason: format!("input is a PGP {}, not a key block", blocks[0]),
        });
    }

    let fingerprints = ctx.session.keys().import_key(&data)?;
    if ctx.json {
        print_json(&serde_json::json!({ "imported": fingerprints }))?;
    } else {
        for fpr in &fingerprints {
            output::success(&format!("Imported {fpr}"));
        }
    }
    Ok(())
}

fn execute_export(
    ctx: &Context,
    identifier: &str,
    secret: bool,
    out: Option<&Path>,
) -> Result<()> {
    let keys = ctx.session.keys();
    let armored = if secret {
        keys.export_secret(identifier, ctx.passphrase())?
    } else {
        keys.export_public(identifier)?
    };
    write_output(out, armored.as_bytes())?;
    if let Some(path) = out {
        output::success(&format!("Exported to {}", path.display()));
    }
    Ok(())
}

fn execute_list(ctx: &Context, secret: bool) -> Result<()> {
    let records = ctx.session.keys().list(secret)?;

    if ctx.json {
        return print_json(&records);
    }

    let kind = if secret { "secret" } else { "public" };
    if records.is_empty() {
        output::warning(&format!("No {kind} keys in {}", ctx.session.keyring()));
        return Ok(());
    }

    output::header(&format!("{} {kind} key(s) in {}", records.len(), ctx.session.keyring()));
    for record in &records {
        println!(
            "\n  {}  {} {}  [{}]",
            record.fingerprint, record.algorithm, record.length, record.trust
        );
        for uid in &record.uids {
            println!("      {uid}");
        }
    }
    Ok(())
}

fn execute_info(ctx: &Context, identifier: &str) -> Result<()> {
    let record = ctx.session.keys().get_info(identifier)?;
    if ctx.json {
        return print_json(&record);
    }
    print_record(&record);
    Ok(())
}

fn execute_delete(ctx: &Context, identifier: &str, secret: bool) -> Result<()> {
    ctx.warn_if_ephemeral();
    ctx.session
        .keys()
        .delete(identifier, secret, ctx.passphrase())?;
    let part = if secret { "Secret key" } else { "Key" };
    output::success(&format!("{part} {identifier} deleted"));
    Ok(())
}

fn print_record(record: &KeyRecord) {
    let title = match record.primary_uid() {
        "" => record.fingerprint.as_str(),
        uid => uid,
    };
    output::header(title);
    output::detail("Fingerprint", &record.fingerprint);
    output::detail("Key ID", &record.key_id);
    output::detail(
        "Algorithm",
        &format!("{} {}", record.algorithm, record.length),
    );
    output::detail("Trust", &record.trust.to_string());
    output::detail(
        "Created",
        &record
            .created
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown".into()),
    );
    output::detail(
        "Expires",
        &record
            .expires
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "never".into()),
    );
    for uid in &record.uids {
        output::detail("UID", uid);
    }
    for sub in &record.subkeys {
        output::detail(
            "Subkey",
            &format!(
                "{} {} {} [{}]",
                sub.key_id, sub.algorithm, sub.length, sub.capabilities
            ),
        );
    }
}
