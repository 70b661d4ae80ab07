//! ghostpress CLI Library
//!
//! Command implementations for the ghostpress static site generator. The
//! binary entry point parses arguments and dispatches here.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (build, check)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use ghostpress::{BuildMode, cmd};
//!
//! // Build the site from the cached content snapshot
//! let opts = cmd::BuildOptions {
//!     output: None,
//!     offline: true,
//!     snapshot: None,
//! };
//! cmd::build::run(
//!     Path::new("config.toml"),
//!     Path::new(".ghost.toml"),
//!     BuildMode::Production,
//!     &opts,
//! )
//! .unwrap();
//! ```

pub mod cmd;

pub use ghostpress_core::{BuildMode, Config, SiteContent};
pub use ghostpress_generator::{BuildStats, Builder, Pipeline};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
///
/// # Example
///
/// ```no_run
/// ghostpress::init_tracing(2); // Enable DEBUG level logging
/// ```
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
