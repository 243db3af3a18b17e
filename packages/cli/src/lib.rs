// ABOUTME: Library half of the tracksync CLI
// ABOUTME: Environment configuration and wiring of storage, client, and orchestrator

pub mod config;
pub mod context;

pub use config::{Config, ConfigError};
pub use context::AppContext;

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// `info` filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
