//! Juicy CLI Library
//!
//! Command implementations for the `juicy` binary: validating blog content
//! against the content schema, scaffolding new documents, and emitting the
//! CMS editing schema.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (check, new, cms, env)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use juicy::cmd;
//!
//! // Validate every document under the configured content directory
//! cmd::check::run(Path::new("juicy.toml"), false, false).unwrap();
//! ```

pub mod cmd;

// Re-export core types for convenience
pub use juicy_collector::{ContentCollector, SiteContent};
pub use juicy_core::{Config, Record, Schema};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
