//! Configuration types and the line-oriented config parser.
//!
//! A config file is a flat list of `key = value` assignments and `[section]`
//! list headers.  Lines following a header are entries of that list, one per
//! line, until the next header.  `#` starts a comment that runs to the end of
//! the line; there is no quoting, so a literal `#` cannot be represented.
//!
//! # File format
//!
//! ```text
//! backupdir  = /mnt/usb/backups
//! backupdir2 = /mnt/nas/backups   # used when the first one is missing
//! name       = laptop
//! mx         = 7                  # 7-Zip compression level, 0–9
//!
//! [backup]
//! /home/alice/projects
//! !/home/alice/.ssh               # `!` = must exist when the config loads
//!
//! [exclude]
//! .cache
//!
//! [exclude-recursive]
//! node_modules
//! ```
//!
//! # Schemas
//!
//! Two dialects exist and are told apart by the inclusion list they use:
//!
//! | Schema         | Inclusion list | Extra vocabulary           | Modes        |
//! |----------------|----------------|----------------------------|--------------|
//! | legacy         | `[include]`    | `full_alert` key           | full         |
//! | diff-capable   | `[backup]`     | `[exclude-recursive]` list | full, diff   |
//!
//! # Parser rules
//!
//! - A repeated `key = value` overwrites the earlier value (last one wins).
//! - A re-opened `[section]` keeps its earlier entries and appends to them.
//! - Unknown keys and section names are errors, never ignored.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};

// ─── Defaults ─────────────────────────────────────────────────────────────────

/// Values seeded into every config before the file is read.
///
/// A key that appears in the file replaces the seeded value; nothing else
/// ever changes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    /// Archiver executable, looked up on `PATH` when not absolute.
    pub archiver: String,
    /// 7-Zip `-mx` level.
    pub compression_level: u8,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            archiver: String::from("7z"),
            compression_level: 5,
        }
    }
}

// ─── Config ───────────────────────────────────────────────────────────────────

/// Dialect-specific part of a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    /// `[include]` configs: full backups only, every exclude is recursive.
    Legacy {
        /// A leading `!` marks a required path; it is removed before the
        /// entry reaches 7-Zip.
        include: Vec<String>,
    },

    /// `[backup]` configs: full and differential backups, with separate
    /// top-level and recursive exclude lists.
    DiffCapable {
        /// A leading `!` marks a required path; it is removed before the
        /// entry reaches 7-Zip.
        backup: Vec<String>,
        exclude_recursive: Vec<String>,
    },
}

impl Schema {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Legacy { .. } => "legacy",
            Self::DiffCapable { .. } => "diff-capable",
        }
    }

    pub const fn supports_diff(&self) -> bool {
        matches!(self, Self::DiffCapable { .. })
    }
}

/// A parsed and validated configuration.  Read-only once returned by
/// [`parse_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub schema: Schema,

    /// Preferred destination directory.
    pub backupdir: PathBuf,

    /// Fallback destination, tried when `backupdir` is not a directory.
    pub backupdir2: Option<PathBuf>,

    /// Archiver executable (`7zip = ...`).
    pub archiver: String,

    /// Backup-set name, the prefix of every archive file name.
    pub name: Option<String>,

    /// `-mx` level, always within 0..=9.
    pub compression_level: u8,

    /// Exclusion patterns in declaration order.
    pub exclude: Vec<String>,

    /// Accepted in legacy configs and carried along untouched.
    #[allow(dead_code)]
    pub full_alert: Option<String>,
}

impl Config {
    /// What to archive, in declaration order.  `!` markers are already
    /// stripped.
    pub fn inclusions(&self) -> &[String] {
        match &self.schema {
            Schema::Legacy { include } => include,
            Schema::DiffCapable { backup, .. } => backup,
        }
    }

    /// Recursive exclusions; always empty for legacy configs.
    pub fn exclude_recursive(&self) -> &[String] {
        match &self.schema {
            Schema::Legacy { .. } => &[],
            Schema::DiffCapable {
                exclude_recursive, ..
            } => exclude_recursive,
        }
    }

    /// The backup-set name, required by every flow that names archives.
    pub fn require_name(&self) -> Result<&str> {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(Error::validation("missing required key `name`")),
        }
    }
}

// ─── Vocabulary ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    BackupDir,
    BackupDir2,
    Archiver,
    Name,
    CompressionLevel,
    FullAlert,
}

impl Key {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "backupdir" => Self::BackupDir,
            "backupdir2" => Self::BackupDir2,
            "7zip" => Self::Archiver,
            "name" => Self::Name,
            "mx" => Self::CompressionLevel,
            "full_alert" => Self::FullAlert,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Include,
    Backup,
    Exclude,
    ExcludeRecursive,
}

impl Section {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "include" => Self::Include,
            "backup" => Self::Backup,
            "exclude" => Self::Exclude,
            "exclude-recursive" => Self::ExcludeRecursive,
            _ => return None,
        })
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Include => "include",
            Self::Backup => "backup",
            Self::Exclude => "exclude",
            Self::ExcludeRecursive => "exclude-recursive",
        })
    }
}

static ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*=\s*(.+)$").expect("static assignment regex"));

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\s*(.+?)\s*\]$").expect("static header regex"));

// ─── Draft ────────────────────────────────────────────────────────────────────

/// Working state while lines are consumed.  Scalars stay raw strings until
/// validation; `line` fields remember where schema-specific vocabulary
/// first appeared so late errors can still point at it.
#[derive(Debug)]
struct Draft {
    backupdir: Option<String>,
    backupdir2: Option<String>,
    archiver: String,
    name: Option<String>,
    compression_level: String,
    full_alert: Option<(usize, String)>,
    include: Option<Vec<String>>,
    backup: Option<Vec<String>>,
    exclude: Vec<String>,
    exclude_recursive: Option<(usize, Vec<String>)>,
}

impl Draft {
    fn seeded(defaults: &Defaults) -> Self {
        Self {
            backupdir: None,
            backupdir2: None,
            archiver: defaults.archiver.clone(),
            name: None,
            compression_level: defaults.compression_level.to_string(),
            full_alert: None,
            include: None,
            backup: None,
            exclude: Vec::new(),
            exclude_recursive: None,
        }
    }

    fn set(&mut self, key: Key, value: String, line: usize) {
        match key {
            Key::BackupDir => self.backupdir = Some(value),
            Key::BackupDir2 => self.backupdir2 = Some(value),
            Key::Archiver => self.archiver = value,
            Key::Name => self.name = Some(value),
            Key::CompressionLevel => self.compression_level = value,
            Key::FullAlert => {
                let first = self.full_alert.as_ref().map_or(line, |(l, _)| *l);
                self.full_alert = Some((first, value));
            },
        }
    }

    /// Opens `section`, creating it empty on first use.  Re-opening keeps
    /// whatever was collected before.
    fn open(&mut self, section: Section, line: usize) {
        match section {
            Section::Include => {
                self.include.get_or_insert_with(Vec::new);
            },
            Section::Backup => {
                self.backup.get_or_insert_with(Vec::new);
            },
            Section::Exclude => {},
            Section::ExcludeRecursive => {
                self.exclude_recursive.get_or_insert_with(|| (line, Vec::new()));
            },
        }
    }

    fn push(&mut self, section: Section, entry: String) {
        let list = match section {
            Section::Include => self.include.get_or_insert_with(Vec::new),
            Section::Backup => self.backup.get_or_insert_with(Vec::new),
            Section::Exclude => &mut self.exclude,
            Section::ExcludeRecursive => {
                &mut self.exclude_recursive.get_or_insert_with(|| (0, Vec::new())).1
            },
        };
        list.push(entry);
    }
}

// ─── Loader ───────────────────────────────────────────────────────────────────

/// Read, parse and validate the config at `path` using [`Defaults::default`].
pub fn parse_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&text, &Defaults::default())
}

/// Parse and validate config text.  `!` entries are checked against the
/// filesystem relative to the current directory.
pub fn parse_str(text: &str, defaults: &Defaults) -> Result<Config> {
    let mut draft = Draft::seeded(defaults);
    let mut current: Option<Section> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw);
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = ASSIGNMENT.captures(line) {
            let key = &caps[1];
            let Some(k) = Key::parse(key) else {
                return Err(Error::UnknownKey {
                    line: line_no,
                    key: key.to_string(),
                });
            };
            draft.set(k, caps[2].to_string(), line_no);
        } else if let Some(caps) = HEADER.captures(line) {
            let name = &caps[1];
            let Some(section) = Section::parse(name) else {
                return Err(Error::UnknownSection {
                    line: line_no,
                    section: name.to_string(),
                });
            };
            draft.open(section, line_no);
            current = Some(section);
        } else if let Some(section) = current {
            draft.push(section, line.to_string());
        } else {
            return Err(Error::Parse {
                line: line_no,
                text: line.to_string(),
            });
        }
    }

    validate(draft)
}

fn strip_comment(raw: &str) -> &str {
    raw.split('#').next().unwrap_or_default().trim()
}

// ─── Validation ───────────────────────────────────────────────────────────────

fn validate(draft: Draft) -> Result<Config> {
    let Some(backupdir) = draft.backupdir else {
        return Err(Error::validation("missing required key `backupdir`"));
    };

    let schema = match (draft.include, draft.backup) {
        (Some(_), Some(_)) => {
            return Err(Error::validation(
                "both [include] and [backup] are present; a config uses exactly one",
            ));
        },
        (None, None) => {
            return Err(Error::validation(
                "missing required list [backup] (or [include] for legacy configs)",
            ));
        },
        (Some(include), None) => {
            if let Some((line, _)) = draft.exclude_recursive {
                return Err(Error::UnknownSection {
                    line,
                    section: Section::ExcludeRecursive.to_string(),
                });
            }
            Schema::Legacy {
                include: required_paths(include)?,
            }
        },
        (None, Some(backup)) => {
            if let Some((line, _)) = draft.full_alert {
                return Err(Error::UnknownKey {
                    line,
                    key: "full_alert".into(),
                });
            }
            Schema::DiffCapable {
                backup: required_paths(backup)?,
                exclude_recursive: draft.exclude_recursive.map(|(_, l)| l).unwrap_or_default(),
            }
        },
    };

    let compression_level = parse_level(&draft.compression_level)?;

    debug!(schema = schema.label(), backupdir = %backupdir, "config validated");

    Ok(Config {
        schema,
        backupdir: PathBuf::from(backupdir),
        backupdir2: draft.backupdir2.map(PathBuf::from),
        archiver: draft.archiver,
        name: draft.name,
        compression_level,
        exclude: draft.exclude,
        full_alert: draft.full_alert.map(|(_, v)| v),
    })
}

/// Entries starting with `!` must name an existing path.  The marker is
/// dropped from the returned entries; everything else passes through as a
/// pattern.
fn required_paths(entries: Vec<String>) -> Result<Vec<String>> {
    entries
        .into_iter()
        .map(|entry| match entry.strip_prefix('!') {
            Some(path) if Path::new(path).exists() => Ok(path.to_string()),
            Some(path) => Err(Error::validation(format!(
                "required path '{path}' does not exist"
            ))),
            None => Ok(entry),
        })
        .collect()
}

fn parse_level(raw: &str) -> Result<u8> {
    let level: i64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::validation(format!("mx must be an integer, got '{raw}'")))?;
    u8::try_from(level)
        .ok()
        .filter(|l| *l <= 9)
        .ok_or_else(|| Error::validation(format!("mx must be between 0 and 9, got {level}")))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
