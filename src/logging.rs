//! Tracing subscriber setup.
//!
//! Log lines go to stderr so stdout stays parseable for scripts. The level
//! comes from `RUST_LOG` when set, otherwise from the `--verbose` flag.

use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Ignore the error from a second init (tests, embedding callers).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
