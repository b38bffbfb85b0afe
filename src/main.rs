//! `unbackup` — full and differential 7-Zip backups driven by a plain-text
//! config.
//!
//! # Overview
//!
//! Each run reads one config file, picks the first available backup
//! directory and issues exactly one `7z` command: either a new full archive
//! or a differential archive against the most recent full one.  The path of
//! the archive written is printed on stdout.
//!
//! # Usage
//!
//! ```text
//! unbackup laptop.conf          # diff ([backup] configs) or full ([include] configs)
//! unbackup laptop.conf full     # new full archive
//! unbackup laptop.conf diff     # differential against the latest full archive
//! unbackup -v laptop.conf       # debug logging (or set RUST_LOG)
//! ```
//!
//! # Module layout
//!
//! | Module                   | Responsibility                              |
//! |--------------------------|---------------------------------------------|
//! | [`cli`]                  | Argument types parsed by clap               |
//! | [`config`]               | Config parser, schemas, validation          |
//! | [`destination`]          | Backup directory fallback                   |
//! | [`archive`]              | Archive naming, latest full archive lookup  |
//! | [`runner`]               | 7-Zip argument construction                 |
//! | [`ui`]                   | Stage output, archiver execution            |
//! | [`commands::run`]        | Mode selection and the full/diff flows      |
//! | [`error`]                | Error taxonomy                              |

mod archive;
mod cli;
mod commands;
mod config;
mod destination;
mod error;
mod runner;
mod ui;

use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use error::Error;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: unbackup <config-file> [full|diff]";

fn main() -> ExitCode {
    // Wrong arity or an unknown mode token exits here with status 2.
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(archive) => {
            println!("{}", archive.display());
            ExitCode::SUCCESS
        },
        Err(err) => report_error(&err),
    }
}

fn run(cli: &Cli) -> Result<PathBuf> {
    let cfg = ui::report("Config", config::parse_config(&cli.config), |cfg| {
        format!(
            "{} schema, {} item(s) to back up",
            cfg.schema.label(),
            cfg.inclusions().len()
        )
    })
    .with_context(|| format!("loading {}", cli.config.display()))?;

    let archive = commands::run::run(&cfg, cli.mode)?;
    Ok(archive)
}

/// Print `error[<kind>]: <message>` and pick the exit status: 2 for usage
/// errors, 1 for everything else.
fn report_error(err: &anyhow::Error) -> ExitCode {
    let domain = err.chain().find_map(|e| e.downcast_ref::<Error>());
    let kind = domain.map_or("Error", Error::kind);

    eprintln!("error[{kind}]: {err:#}");
    if let Some(Error::Usage(_)) = domain {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    }
    ExitCode::FAILURE
}

/// Diagnostics go to stderr.  `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
