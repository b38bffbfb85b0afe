//! Archive file naming and discovery of the latest full archive.
//!
//! | Archive              | File name                              |
//! |----------------------|----------------------------------------|
//! | full (diff-capable)  | `<name>-<stamp>.7z`                    |
//! | full (legacy)        | `<name>-full-<stamp>.7z`               |
//! | differential         | `<name>-<base stamp>-diff-<stamp>.7z`  |
//!
//! `<stamp>` is local time to the minute, `YYYYMMDDhhmm`.  Being fixed-width
//! and zero-padded, sorting stamps as strings also sorts them by time.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local, TimeZone};
use regex::Regex;
use tracing::debug;

use crate::{
    config::Schema,
    error::{Error, Result},
};

/// 7-Zip's native container extension.
pub const EXTENSION: &str = "7z";

const STAMP_FORMAT: &str = "%Y%m%d%H%M";

// ─── Naming ───────────────────────────────────────────────────────────────────

pub fn timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format(STAMP_FORMAT).to_string()
}

/// Stamp for an archive created right now.
pub fn now_stamp() -> String {
    timestamp(&Local::now())
}

/// File name of a new full archive.  Only legacy configs carry the `-full-`
/// token.
pub fn full_archive_name(schema: &Schema, name: &str, stamp: &str) -> String {
    match schema {
        Schema::Legacy { .. } => format!("{name}-full-{stamp}.{EXTENSION}"),
        Schema::DiffCapable { .. } => format!("{name}-{stamp}.{EXTENSION}"),
    }
}

/// Differential archive path, layered onto the full archive it is based on.
pub fn diff_archive_path(full: &Path, stamp: &str) -> PathBuf {
    let stem = full.file_stem().unwrap_or_default().to_string_lossy();
    full.with_file_name(format!("{stem}-diff-{stamp}.{EXTENSION}"))
}

// ─── Discovery ────────────────────────────────────────────────────────────────

/// Most recent full archive for `name` in `dir`.
///
/// Only `<name>-<12 digits>.7z` qualifies, so differential archives and
/// legacy `-full-` archives never become a base.
pub fn find_latest_full(dir: &Path, name: &str) -> Result<PathBuf> {
    let io_err = |source| Error::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if let Ok(file_name) = entry.file_name().into_string() {
            names.push(file_name);
        }
    }

    let latest = latest_full(names.iter().map(String::as_str), name).ok_or_else(|| {
        Error::NoFullArchive {
            name: name.to_string(),
            dir: dir.to_path_buf(),
        }
    })?;

    debug!(archive = latest, "found base archive");
    Ok(dir.join(latest))
}

/// Lexicographically greatest entry of `names` that is a full archive of
/// `name`.
pub fn latest_full<'a, I>(names: I, name: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let pattern = full_archive_pattern(name);
    names.into_iter().filter(|n| pattern.is_match(n)).max()
}

fn full_archive_pattern(name: &str) -> Regex {
    let source = format!(r"^{}-\d{{12}}\.{}$", regex::escape(name), EXTENSION);
    Regex::new(&source).expect("escaped name is a valid pattern")
}

// ─── Tests ────────────────────────────────────────────────────────────────────
