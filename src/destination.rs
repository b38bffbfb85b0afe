//! Backup destination selection.
//!
//! `backupdir` wins whenever it is an existing directory; `backupdir2` is
//! only consulted when it is not.  Directories are never created here.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::{
    config::Config,
    error::{Error, Result},
};

/// Returns the first candidate that is an existing directory.
pub fn resolve_destination(cfg: &Config) -> Result<PathBuf> {
    let candidates = std::iter::once(&cfg.backupdir).chain(cfg.backupdir2.as_ref());

    let mut tried = Vec::new();
    for dir in candidates {
        if dir.is_dir() {
            debug!(dir = %dir.display(), "using backup directory");
            return Ok(dir.clone());
        }
        warn!(dir = %dir.display(), "backup directory is not available");
        tried.push(dir.clone());
    }

    Err(Error::NoDestination { tried })
}
