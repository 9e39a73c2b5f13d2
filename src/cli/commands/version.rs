use pgpkit::Result;

use crate::cli::commands::io_helpers::print_json;
use crate::cli::context::Context;
use crate::cli::output;

/// Execute the `pgpkit version` command.
pub fn execute(ctx: &Context) -> Result<()> {
    let engine = ctx.session.version()?;
    if ctx.json {
        return print_json(&serde_json::json!({
            "pgpkit": env!("CARGO_PKG_VERSION"),
            "engine": engine,
        }));
    }
    output::header(&format!("pgpkit v{}", env!("CARGO_PKG_VERSION")));
    output::detail("Engine", &engine);
    output::detail("Keyring", &ctx.session.keyring().to_string());
    Ok(())
}
