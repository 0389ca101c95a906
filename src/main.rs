use std::process;

use catmark::cli::{self, AppError};
use tracing_subscriber::EnvFilter;

fn main()
{
    // stdout is reserved for the key, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli::run()
    {
        Ok(()) => {},
        Err(AppError::Usage(err)) =>
        {
            // clap renders its own error and usage lines
            eprint!("{err}");
            process::exit(1);
        },
        Err(err) =>
        {
            eprintln!("Error: {err}");
            process::exit(1);
        },
    }
}
