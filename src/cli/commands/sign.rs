use std::path::Path;

use pgpkit::Result;

use crate::cli::commands::io_helpers::{read_input, write_output};
use crate::cli::context::Context;
use crate::cli::output;

/// Execute the `pgpkit sign` command (cleartext signature).
pub fn execute(ctx: &Context, input: Option<&Path>, key: &str, out: Option<&Path>) -> Result<()> {
    let payload = read_input(input)?;
    let signed = ctx
        .session
        .signatures()
        .sign(&payload, key, ctx.passphrase())?;
    write_output(out, signed.as_bytes())?;

    if let Some(path) = out {
        output::success(&format!("Signed → {}", path.display()));
    }
    Ok(())
}
