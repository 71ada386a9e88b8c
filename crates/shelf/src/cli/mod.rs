//! # CLI Behavior
//!
//! This is one client of `shelfapp`. It is the only place that knows about
//! terminal output, files named on the command line, and exit codes.
//!
//! ## Start-up
//!
//! 1. Parse arguments (`setup`).
//! 2. Install the `tracing` subscriber. `SHELF_LOG` takes an `EnvFilter`
//!    directive; without it the level is `warn`, or `debug` with `--verbose`.
//! 3. Load [`ShelfConfig`] from `--config` or the default location, then let
//!    `--data` override the data directory.
//! 4. Open the catalog on a [`FsBackend`] and dispatch (`handlers`).
//!
//! ## Module Structure
//!
//! - `setup`: argument parsing via clap
//! - `handlers`: one function per subcommand, calls the API and prints
//! - `render`: turns library values into strings
//! - `styles`: named terminal styles

mod handlers;
mod render;
pub mod setup;
mod styles;

use anyhow::Result;
use clap::Parser;
use shelfapp::api::ShelfApi;
use shelfapp::commands::export::ExportOptions;
use shelfapp::config::ShelfConfig;
use shelfapp::store::fs_backend::FsBackend;
use tracing_subscriber::EnvFilter;

use setup::{Cli, Commands};

const LOG_ENV: &str = "SHELF_LOG";

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = ShelfConfig::load(cli.config.as_deref())?;
    if let Some(data) = cli.data {
        config.data_dir = Some(data);
    }
    let data_dir = config.data_dir();
    tracing::debug!(dir = %data_dir.display(), "opening catalog");
    let mut api = ShelfApi::open(FsBackend::new(data_dir), config)?;

    match cli.command {
        Commands::Category { action } => handlers::category(&mut api, action),
        Commands::Rule { action } => handlers::rule(&mut api, action),
        Commands::Purchase { name, category } => {
            handlers::purchase(&mut api, &name, category.as_deref())
        }
        Commands::Suggest { name, json } => handlers::suggest(&api, &name, json),
        Commands::History => handlers::history(&api),
        Commands::Export {
            format,
            rules,
            no_metadata,
            active_only,
            output,
        } => handlers::export(
            &api,
            ExportOptions {
                format,
                include_metadata: !no_metadata,
                include_rules: rules,
                include_archived: !active_only,
            },
            output,
        ),
        Commands::Import {
            file,
            format,
            conflict,
            rules,
            no_validate,
        } => handlers::import(&mut api, &file, format, conflict, rules, no_validate),
        Commands::Template { action } => handlers::template(&mut api, action),
    }
}
