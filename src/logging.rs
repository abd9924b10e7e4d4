//! Diagnostic logging setup

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber on stderr.
///
/// `RUST_LOG` wins when set; otherwise the level is `warn`, or `info` with
/// `--verbose`. Calling this twice is harmless.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "monover=info"
    } else {
        "monover=warn"
    }
}
