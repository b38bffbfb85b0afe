//! Backup flows.  Each run issues exactly one archiver command.
//!
//! # Stages
//!
//! | # | Stage       | Full | Diff | Description                                |
//! |---|-------------|------|------|--------------------------------------------|
//! | 1 | Destination | ✓    | ✓    | First existing of `backupdir`/`backupdir2` |
//! | 2 | Discovery   | —    | ✓    | Latest `<name>-<stamp>.7z` in destination  |
//! | 3 | Archive     | ✓    | ✓    | Run 7-Zip, check its exit status           |
//!
//! The first failing stage ends the run.  There is no fallback from `diff`
//! to `full` when no base archive exists.

use std::path::PathBuf;

use tracing::info;

use crate::{
    archive::{diff_archive_path, find_latest_full, full_archive_name, now_stamp},
    cli::Mode,
    config::{Config, Schema},
    destination::resolve_destination,
    error::{Error, Result},
    runner::{build_diff_args, build_full_args},
    ui::{report, run_archiver},
};

/// Stage label for the latest-full-archive lookup of a differential run.
pub const DISCOVERY: &str = "Discovery";

// ─── Entry point ──────────────────────────────────────────────────────────────

/// Run the backup selected by `requested` (or the schema's default mode) and
/// return the path of the archive that was written.
pub fn run(cfg: &Config, requested: Option<Mode>) -> Result<PathBuf> {
    let mode = select_mode(&cfg.schema, requested)?;
    info!(?mode, schema = cfg.schema.label(), "starting backup");
    match mode {
        Mode::Full => full_backup(cfg),
        Mode::Diff => diff_backup(cfg),
    }
}

/// `diff` is the default for diff-capable configs; legacy configs only know
/// `full`.
pub fn select_mode(schema: &Schema, requested: Option<Mode>) -> Result<Mode> {
    match (requested, schema.supports_diff()) {
        (Some(Mode::Diff), false) => Err(legacy_diff_error()),
        (Some(mode), _) => Ok(mode),
        (None, true) => Ok(Mode::Diff),
        (None, false) => Ok(Mode::Full),
    }
}

fn legacy_diff_error() -> Error {
    Error::Usage(
        "differential backups need a [backup] config; [include] configs only support full".into(),
    )
}

// ─── Flows ────────────────────────────────────────────────────────────────────

/// Create a new full archive in the resolved destination.
pub fn full_backup(cfg: &Config) -> Result<PathBuf> {
    let name = cfg.require_name()?;
    let dir = report("Destination", resolve_destination(cfg), |d| {
        d.display().to_string()
    })?;

    let archive = dir.join(full_archive_name(&cfg.schema, name, &now_stamp()));
    let args = build_full_args(cfg, &archive);
    report("Archive", run_archiver(&args), |_| {
        archive.display().to_string()
    })?;

    Ok(archive)
}

/// Write a differential archive next to the latest full archive.
pub fn diff_backup(cfg: &Config) -> Result<PathBuf> {
    if !cfg.schema.supports_diff() {
        return Err(legacy_diff_error());
    }
    let name = cfg.require_name()?;
    let dir = report("Destination", resolve_destination(cfg), |d| {
        d.display().to_string()
    })?;
    let base = report(DISCOVERY, find_latest_full(&dir, name), |b| {
        b.display().to_string()
    })?;

    let diff = diff_archive_path(&base, &now_stamp());
    let args = build_diff_args(cfg, &base, &diff);
    report("Archive", run_archiver(&args), |_| {
        diff.display().to_string()
    })?;

    Ok(diff)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
