//! 7-Zip argument construction.
//!
//! This module only *builds* argument lists; execution lives in
//! [`crate::ui::run_archiver`].  Every function here is pure and can be
//! tested without spawning anything.
//!
//! # Argument grammar
//!
//! ```text
//! legacy full:   7z a -t7z -mx<N> -xr!<ex>... -ir!<in>... <archive>
//! diff-capable:  7z a <archive> -t7z -mx<N> -x!<ex>... -xr!<exr>... -ir!<in>...
//! differential:  7z u <base> -t7z -mx<N> -x!<ex>... -xr!<exr>... -ir!<in>... \
//!                   -u- -up0q3r2x2y2z0w2!<diff>
//! ```
//!
//! Legacy configs have a single `[exclude]` list and always pass it with the
//! recursive switch.  Diff-capable configs keep `[exclude]` top-level only and
//! put recursive patterns under `[exclude-recursive]`.

use std::path::Path;

use crate::{
    archive::EXTENSION,
    config::{Config, Schema},
};

const ADD: &str = "a";
const UPDATE: &str = "u";
const EXCLUDE: &str = "-x!";
const EXCLUDE_RECURSIVE: &str = "-xr!";
const INCLUDE_RECURSIVE: &str = "-ir!";

/// Leave the base archive untouched.
const KEEP_BASE: &str = "-u-";

/// Write added (`p0q3`), changed (`r2 x2 y2`) and renamed (`w2`) entries to a
/// new archive; drop deleted ones (`z0`).
const DIFF_UPDATE: &str = "-up0q3r2x2y2z0w2!";

// ─── Shared pieces ────────────────────────────────────────────────────────────

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// `-t7z -mx<N>`.
fn format_flags(cfg: &Config) -> [String; 2] {
    [
        format!("-t{EXTENSION}"),
        format!("-mx{}", cfg.compression_level),
    ]
}

/// Exclusion switches followed by inclusion switches, in declaration order.
fn filter_flags(cfg: &Config) -> Vec<String> {
    let exclude_switch = match cfg.schema {
        Schema::Legacy { .. } => EXCLUDE_RECURSIVE,
        Schema::DiffCapable { .. } => EXCLUDE,
    };

    let mut args: Vec<String> = Vec::new();
    args.extend(cfg.exclude.iter().map(|e| format!("{exclude_switch}{e}")));
    args.extend(
        cfg.exclude_recursive()
            .iter()
            .map(|e| format!("{EXCLUDE_RECURSIVE}{e}")),
    );
    args.extend(
        cfg.inclusions()
            .iter()
            .map(|i| format!("{INCLUDE_RECURSIVE}{i}")),
    );
    args
}

// ─── Builders ─────────────────────────────────────────────────────────────────

/// Arguments for creating the full archive `archive`.
///
/// The archive operand goes last for legacy configs and straight after the
/// verb for diff-capable ones.
pub fn build_full_args(cfg: &Config, archive: &Path) -> Vec<String> {
    let mut args = vec![cfg.archiver.clone(), ADD.into()];
    match cfg.schema {
        Schema::Legacy { .. } => {
            args.extend(format_flags(cfg));
            args.extend(filter_flags(cfg));
            args.push(path_arg(archive));
        },
        Schema::DiffCapable { .. } => {
            args.push(path_arg(archive));
            args.extend(format_flags(cfg));
            args.extend(filter_flags(cfg));
        },
    }
    args
}

/// Arguments for writing the differential archive `diff` against `base`.
pub fn build_diff_args(cfg: &Config, base: &Path, diff: &Path) -> Vec<String> {
    let mut args = vec![cfg.archiver.clone(), UPDATE.into(), path_arg(base)];
    args.extend(format_flags(cfg));
    args.extend(filter_flags(cfg));
    args.push(KEEP_BASE.into());
    args.push(format!("{DIFF_UPDATE}{}", path_arg(diff)));
    args
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn make_cfg(schema: Schema) -> Config {
        Config {
            schema,
            backupdir: PathBuf::from("/mnt/b"),
            backupdir2: None,
            archiver: "7z".into(),
            name: Some("foo".into()),
            compression_level: 7,
            exclude: vec![".git".into()],
            full_alert: None,
        }
    }

    fn legacy() -> Config {
        make_cfg(Schema::Legacy {
            include: vec!["src".into(), "docs".into()],
        })
    }

    fn diff_capable() -> Config {
        make_cfg(Schema::DiffCapable {
            backup: vec!["src".into(), "docs".into()],
            exclude_recursive: vec!["target".into(), "node_modules".into()],
        })
    }

    // ── unit assertions ───────────────────────────────────────────────────────

    #[test]
    fn excludes_precede_includes() {
        for cfg in [legacy(), diff_capable()] {
            let args = build_full_args(&cfg, Path::new("/mnt/b/foo.7z"));
            let last_exclude = args.iter().rposition(|a| a.starts_with("-x")).unwrap();
            let first_include = args.iter().position(|a| a.starts_with("-ir!")).unwrap();
            assert!(last_exclude < first_include, "{args:?}");
        }
    }

    #[test]
    fn compression_level_appears_exactly_once() {
        for cfg in [legacy(), diff_capable()] {
            let args = build_full_args(&cfg, Path::new("/mnt/b/foo.7z"));
            let mx: Vec<_> = args.iter().filter(|a| a.starts_with("-mx")).collect();
            assert_eq!(mx, vec!["-mx7"]);
        }
    }

    #[test]
    fn legacy_maps_every_exclude_to_the_recursive_switch() {
        let args = build_full_args(&legacy(), Path::new("/a.7z"));
        assert!(args.contains(&"-xr!.git".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("-x!")));
    }

    #[test]
    fn diff_capable_splits_top_level_and_recursive_excludes() {
        let args = build_full_args(&diff_capable(), Path::new("/a.7z"));
        assert!(args.contains(&"-x!.git".to_string()));
        assert!(args.contains(&"-xr!target".to_string()));
        assert!(!args.contains(&"-xr!.git".to_string()));
    }

    #[test]
    fn archive_operand_position_depends_on_schema() {
        let archive = Path::new("/mnt/b/foo-202401010000.7z");
        assert_eq!(
            build_full_args(&legacy(), archive).last().unwrap(),
            "/mnt/b/foo-202401010000.7z"
        );
        assert_eq!(
            build_full_args(&diff_capable(), archive)[2],
            "/mnt/b/foo-202401010000.7z"
        );
    }

    #[test]
    fn custom_archiver_is_the_program() {
        let mut cfg = diff_capable();
        cfg.archiver = "/usr/local/bin/7zz".into();
        assert_eq!(build_full_args(&cfg, Path::new("/a.7z"))[0], "/usr/local/bin/7zz");
    }

    #[test]
    fn empty_lists_leave_only_the_fixed_arguments() {
        let cfg = Config {
            exclude: vec![],
            ..make_cfg(Schema::DiffCapable {
                backup: vec![],
                exclude_recursive: vec![],
            })
        };
        assert_eq!(build_full_args(&cfg, Path::new("/a.7z")), vec![
            "7z", "a", "/a.7z", "-t7z", "-mx7"
        ]);
    }

    #[test]
    fn diff_args_end_with_the_update_switches() {
        let args = build_diff_args(
            &diff_capable(),
            Path::new("/mnt/b/foo-202401020000.7z"),
            Path::new("/mnt/b/foo-202401020000-diff-202401021200.7z"),
        );
        let n = args.len();
        assert_eq!(args[1], "u");
        assert_eq!(args[2], "/mnt/b/foo-202401020000.7z");
        assert_eq!(args[n - 2], "-u-");
        assert_eq!(
            args[n - 1],
            "-up0q3r2x2y2z0w2!/mnt/b/foo-202401020000-diff-202401021200.7z"
        );
    }

    // ── insta snapshots ───────────────────────────────────────────────────────
    // Exact argument vectors; 7-Zip's switch grammar is unforgiving.

    #[test]
    fn snapshot_legacy_full() {
        let args = build_full_args(&legacy(), Path::new("/mnt/b/foo-full-202401010000.7z"));
        insta::assert_debug_snapshot!(args, @r#"
        [
            "7z",
            "a",
            "-t7z",
            "-mx7",
            "-xr!.git",
            "-ir!src",
            "-ir!docs",
            "/mnt/b/foo-full-202401010000.7z",
        ]
        "#);
    }

    #[test]
    fn snapshot_diff_capable_full() {
        let args = build_full_args(&diff_capable(), Path::new("/mnt/b/foo-202401010000.7z"));
        insta::assert_debug_snapshot!(args, @r#"
        [
            "7z",
            "a",
            "/mnt/b/foo-202401010000.7z",
            "-t7z",
            "-mx7",
            "-x!.git",
            "-xr!target",
            "-xr!node_modules",
            "-ir!src",
            "-ir!docs",
        ]
        "#);
    }

    #[test]
    fn snapshot_differential() {
        let args = build_diff_args(
            &diff_capable(),
            Path::new("/mnt/b/foo-202401020000.7z"),
            Path::new("/mnt/b/foo-202401020000-diff-202401021200.7z"),
        );
        insta::assert_debug_snapshot!(args, @r#"
        [
            "7z",
            "u",
            "/mnt/b/foo-202401020000.7z",
            "-t7z",
            "-mx7",
            "-x!.git",
            "-xr!target",
            "-xr!node_modules",
            "-ir!src",
            "-ir!docs",
            "-u-",
            "-up0q3r2x2y2z0w2!/mnt/b/foo-202401020000-diff-202401021200.7z",
        ]
        "#);
    }
}
