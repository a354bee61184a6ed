//! Tracing setup. Logs go to stderr so stdout carries only command output.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise only warnings are shown, plus
/// AgentDesk's own info (or debug, when `verbose`) events.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose),
        )
        .with(filter)
        .init();
}

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "warn,agentdesk=debug"
    } else {
        "warn,agentdesk=info"
    }
}
