use std::path::Path;

use pgpkit::Result;

use crate::cli::commands::io_helpers::{read_input, write_output};
use crate::cli::context::Context;
use crate::cli::output;

/// Execute the `pgpkit symmetric` command: password-only encryption.
pub fn execute(ctx: &Context, input: Option<&Path>, binary: bool, out: Option<&Path>) -> Result<()> {
    let password = ctx.require_passphrase("symmetric encryption")?;
    let payload = read_input(input)?;
    let armor = ctx.session.defaults().armor && !binary;

    let ciphertext = ctx
        .session
        .encryption()
        .encrypt_symmetric(&payload, password, armor)?;
    write_output(out, ciphertext.as_bytes())?;

    if let Some(path) = out {
        output::success(&format!("Encrypted with password → {}", path.display()));
    }
    Ok(())
}
