use std::path::Path;

use pgpkit::{EncryptOptions, Result};

use crate::cli::commands::io_helpers::{read_input, write_output};
use crate::cli::context::Context;
use crate::cli::output;

/// Execute the `pgpkit encrypt` command.
///
/// Every recipient (and the signer, when given) is resolved before any
/// ciphertext is produced.
pub fn execute(
    ctx: &Context,
    input: Option<&Path>,
    recipients: &[String],
    sign: Option<&str>,
    binary: bool,
    out: Option<&Path>,
) -> Result<()> {
    let payload = read_input(input)?;
    let options = EncryptOptions {
        sign: sign.map(str::to_string),
        passphrase: ctx.passphrase().cloned(),
        armor: ctx.session.defaults().armor && !binary,
    };

    let ciphertext = ctx
        .session
        .encryption()
        .encrypt(&payload, recipients.to_vec(), &options)?;
    write_output(out, ciphertext.as_bytes())?;

    if let Some(path) = out {
        output::success(&format!(
            "Encrypted for {} recipient(s) → {}",
            recipients.len(),
            path.display()
        ));
    }
    Ok(())
}
