//! ftcache CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use file_transform_cache::cli::{Cli, CommandDispatcher};
use file_transform_cache::config::{load_config, validate, CacheConfig};
use file_transform_cache::engine::CacheOptions;
use file_transform_cache::ui::{OutputMode, TerminalUI, UserInterface};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. `logging_level` from the config, WARN by default
///
/// Logs go to stderr so transformed output on stdout stays clean.
fn init_tracing(debug: bool, level: &str) {
    let filter = if debug {
        EnvFilter::new("file_transform_cache=debug")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .unwrap_or_else(|_| EnvFilter::new(CacheOptions::DEFAULT_LOGGING_LEVEL))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut ui = TerminalUI::new(OutputMode::from_quiet(cli.quiet));

    let project_root = match cli.project.clone() {
        Some(root) => root,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                ui.error(&format!("Error: cannot determine current directory: {}", e));
                return ExitCode::from(1);
            }
        },
    };

    let loaded = load_config(&project_root, cli.config.as_deref());
    let level = loaded
        .as_ref()
        .map(|c| c.logging_level.clone())
        .unwrap_or_else(|_| CacheConfig::default().logging_level);
    init_tracing(cli.debug, &level);

    tracing::debug!("ftcache starting with args: {:?}", cli);

    let config = match loaded.and_then(|c| validate(&c).map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            return ExitCode::from(1);
        }
    };

    let dispatcher = CommandDispatcher::new(project_root, config);

    match dispatcher.dispatch(&cli, &mut ui) {
        Ok(result) => ExitCode::from(result.exit_code.clamp(0, 255) as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
