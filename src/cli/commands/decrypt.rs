use std::path::Path;

use pgpkit::{PgpError, Result};

use crate::cli::commands::io_helpers::{armor_kind, print_json, read_input, write_output};
use crate::cli::context::Context;
use crate::cli::output;

/// Execute the `pgpkit decrypt` command.
///
/// Works for both recipient-addressed and password-encrypted messages. An
/// embedded signature is reported but never blocks decryption.
pub fn execute(ctx: &Context, input: Option<&Path>, out: Option<&Path>) -> Result<()> {
    let ciphertext = read_input(input)?;
    if armor_kind(&ciphertext).as_deref() == Some("SIGNED MESSAGE") {
        return Err(PgpError::DecryptionFailed {
            reason: "input is a cleartext-signed message, not an encrypted one (use 'pgpkit verify')"
                .into(),
        });
    }

    let message = ctx
        .session
        .encryption()
        .decrypt_detailed(&ciphertext, ctx.passphrase())?;
    write_output(out, &message.plaintext)?;

    if let Some(signature) = &message.signature {
        if ctx.json {
            return print_json(signature);
        }
        if signature.valid {
            output::success(&format!(
                "Good signature from {} ({})",
                signature.username, signature.fingerprint
            ));
        } else {
            output::warning(&format!(
                "Signature could not be verified (key id {})",
                signature.key_id
            ));
        }
    }
    if let Some(path) = out {
        output::success(&format!("Decrypted → {}", path.display()));
    }
    Ok(())
}
