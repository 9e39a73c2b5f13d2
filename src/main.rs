mod cli;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};

/// Initialize logging on stderr. `RUST_LOG` wins over the defaults.
fn init_logging(verbose: bool) {
    let level = if verbose { "pgpkit=debug" } else { "pgpkit=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(level)
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() {
    let args = Cli::parse();
    init_logging(args.verbose);

    let result = cli::context::Context::from_cli(&args).and_then(|ctx| {
        let outcome = match &args.command {
            Commands::Keys { action } => cli::commands::keys::execute(&ctx, action),
            Commands::Encrypt {
                input,
                recipients,
                sign,
                binary,
                output,
            } => cli::commands::encrypt::execute(
                &ctx,
                input.as_deref(),
                recipients,
                sign.as_deref(),
                *binary,
                output.as_deref(),
            ),
            Commands::Decrypt { input, output } => {
                cli::commands::decrypt::execute(&ctx, input.as_deref(), output.as_deref())
            }
            Commands::Symmetric {
                input,
                binary,
                output,
            } => cli::commands::symmetric::execute(
                &ctx,
                input.as_deref(),
                *binary,
                output.as_deref(),
            ),
            Commands::Sign { input, key, output } => {
                cli::commands::sign::execute(&ctx, input.as_deref(), key, output.as_deref())
            }
            Commands::Verify { input } => cli::commands::verify::execute(&ctx, input.as_deref()),
            Commands::Version => cli::commands::version::execute(&ctx),
        };
        let closed = ctx.close();
        outcome.and(closed)
    });

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}
