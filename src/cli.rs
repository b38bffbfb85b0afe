//! Command-line interface definition.
//!
//! All argument parsing lives here so the rest of the codebase can stay
//! agnostic to `clap`.  clap reports arity mistakes and unknown mode tokens
//! with a usage message on stderr and exit status 2.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(
    name    = "unbackup",
    about   = "Full and differential 7-Zip backups driven by a plain-text config",
    version,
    help_template = "\
{before-help}{name} {version}
{about}

{usage-heading} {usage}

{all-args}{after-help}"
)]
pub struct Cli {
    /// Path to the backup configuration file.
    pub config: PathBuf,

    /// Backup mode.
    ///
    /// Defaults to `diff` for `[backup]` configs and to `full` for legacy
    /// `[include]` configs, which cannot do differential backups.
    #[arg(value_enum)]
    pub mode: Option<Mode>,

    /// Log what is being done (same as `RUST_LOG=debug`).
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Write a new, self-contained archive.
    Full,
    /// Write only what changed since the latest full archive.
    Diff,
}
