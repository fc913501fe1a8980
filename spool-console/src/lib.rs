//! Spool Console - command-line front end of the label engine
//!
//! ```text
//! spool-console/src/
//! ├── args.rs      # clap command line
//! ├── config.rs    # environment configuration
//! ├── logger.rs    # tracing setup
//! └── commands.rs  # presets, preview, export
//! ```

pub mod args;
pub mod commands;
pub mod config;
pub mod logger;

pub use config::Config;
pub use logger::{cleanup_old_logs, init_logger_with_file};

/// Start logging as configured; `verbose` forces debug level
pub fn setup_environment(config: &Config, verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { config.log_level.as_str() };
    init_logger_with_file(level, config.log_json, config.log_dir.as_deref())
}
