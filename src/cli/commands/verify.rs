use std::path::Path;

use pgpkit::{PgpError, Result};

use crate::cli::commands::io_helpers::{armor_kind, print_json, read_input};
use crate::cli::context::Context;
use crate::cli::output;

/// Execute the `pgpkit verify` command.
///
/// An invalid signature is reported, and exits non-zero, but it is not an
/// error in the library sense.
pub fn execute(ctx: &Context, input: Option<&Path>) -> Result<()> {
    let signed = read_input(input)?;
    if let Some(kind) = armor_kind(&signed).filter(|k| k == "MESSAGE") {
        return Err(PgpError::VerificationError {
            reason: format!("input is an encrypted PGP {kind}; decrypt it instead"),
        });
    }

    let record = ctx.session.signatures().verify(&signed)?;

    if ctx.json {
        print_json(&record)?;
    } else if record.valid {
        output::success("Good signature");
        output::detail("Signer", &record.username);
        output::detail("Fingerprint", &record.fingerprint);
        output::detail("Trust", &record.trust_level.to_string());
        if let Some(ts) = record.timestamp {
            output::detail("Signed", &ts.to_rfc3339());
        }
    } else {
        output::warning("Signature is NOT valid");
        output::detail("Key ID", &record.key_id);
    }

    if record.valid {
        Ok(())
    } else {
        Err(PgpError::VerificationError {
            reason: format!("bad or unverifiable signature (key id {})", record.key_id),
        })
    }
}
