//! Error taxonomy.
//!
//! Every failure is fatal for the run.  Each variant maps to one stable
//! [`Error::kind`] label which `main` prints alongside the message, so the
//! operator can tell a bad config apart from a missing destination or a
//! failed archiver run.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    /// A line that is neither `key = value`, a `[section]` header, nor an
    /// entry of an open list section.
    #[error("line {line}: cannot parse `{text}`")]
    Parse { line: usize, text: String },

    #[error("line {line}: unknown key `{key}`")]
    UnknownKey { line: usize, key: String },

    #[error("line {line}: unknown list section `[{section}]`")]
    UnknownSection { line: usize, section: String },

    #[error("{0}")]
    Validation(String),

    #[error("no usable backup directory (tried {})", format_candidates(.tried))]
    NoDestination { tried: Vec<PathBuf> },

    #[error("no full archive named `{name}-<timestamp>.7z` in {}", .dir.display())]
    NoFullArchive { name: String, dir: PathBuf },

    /// The archiver ran but reported a fatal exit status (anything above 1),
    /// or was killed by a signal (`status == None`).
    #[error("{program} failed with {}", format_status(.status))]
    Archiver { program: String, status: Option<i32> },

    #[error("cannot start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Usage(String),
}

impl Error {
    /// Taxonomy label reported next to the message.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "ParseError",
            Self::UnknownKey { .. } => "UnknownKeyError",
            Self::UnknownSection { .. } => "UnknownSectionError",
            Self::Validation(_) => "ValidationError",
            Self::NoDestination { .. } => "NoDestinationError",
            Self::NoFullArchive { .. } => "NoFullArchiveError",
            Self::Archiver { .. } | Self::Spawn { .. } => "ArchiverError",
            Self::Io { .. } => "IoError",
            Self::Usage(_) => "UsageError",
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

fn format_candidates(tried: &[PathBuf]) -> String {
    tried
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {code}"),
        None => "termination by signal".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_label_is_distinct() {
        let errors = [
            Error::Parse { line: 1, text: "x".into() },
            Error::UnknownKey { line: 1, key: "x".into() },
            Error::UnknownSection { line: 1, section: "x".into() },
            Error::validation("x"),
            Error::NoDestination { tried: vec![] },
            Error::NoFullArchive { name: "x".into(), dir: "/x".into() },
            Error::Archiver { program: "7z".into(), status: Some(2) },
            Error::Io { path: "/x".into(), source: std::io::Error::other("x") },
            Error::Usage("x".into()),
        ];
        let mut kinds: Vec<_> = errors.iter().map(Error::kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn spawn_failure_is_reported_as_archiver_error() {
        let err = Error::Spawn {
            program: "7z".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.kind(), "ArchiverError");
    }

    #[test]
    fn messages_name_the_offending_input() {
        let err = Error::UnknownKey { line: 4, key: "colour".into() };
        assert_eq!(err.to_string(), "line 4: unknown key `colour`");

        let err = Error::NoDestination {
            tried: vec!["/mnt/a".into(), "/mnt/b".into()],
        };
        assert_eq!(
            err.to_string(),
            "no usable backup directory (tried '/mnt/a', '/mnt/b')"
        );

        let err = Error::Archiver { program: "7z".into(), status: Some(2) };
        assert_eq!(err.to_string(), "7z failed with exit status 2");

        let err = Error::Archiver { program: "7z".into(), status: None };
        assert_eq!(err.to_string(), "7z failed with termination by signal");
    }
}
