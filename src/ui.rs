//! Terminal output and archiver execution.
//!
//! Progress is reported as one `✓`/`✗` line per stage on stderr, so stdout
//! carries nothing but the path of the archive that was written.  The
//! archiver's own output is never captured: its stdout is redirected to our
//! stderr and its stderr is inherited.  The `error[<kind>]` line for a failed
//! stage is printed once, by the caller that decides the exit status.
//!
//! # Exit status
//!
//! 7-Zip exits with `1` for warnings such as files that vanished while
//! being read; the archive is still written, so `0` and `1` both count as
//! success.  Anything higher, or death by signal, is a failure.

use std::process::Command;

use console::style;
use tracing::{info, warn};

use crate::error::{Error, Result};

// ─── Icons ───────────────────────────────────────────────────────────────────

/// Green ✓, printed when a stage succeeds.
fn icon_ok() -> console::StyledObject<&'static str> {
    style("✓").green().bold()
}
/// Red ✗, printed when a stage fails.
fn icon_err() -> console::StyledObject<&'static str> {
    style("✗").red().bold()
}

// ─── Stage result ─────────────────────────────────────────────────────────────

/// The outcome of one step of a backup run.
#[derive(Debug)]
pub struct StageOutcome {
    /// Human-readable stage label, e.g. `"Destination"`.
    pub label: String,
    pub success: bool,
    /// Short note shown after the label, e.g. the chosen directory.
    pub detail: Option<String>,
}

impl StageOutcome {
    pub fn ok(label: &str, detail: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            success: true,
            detail: Some(detail.into()),
        }
    }

    pub fn failed(label: &str) -> Self {
        Self {
            label: label.to_string(),
            success: false,
            detail: None,
        }
    }

    /// Builds the outcome for `result`, using `detail` on success.
    pub fn from_result<T>(
        label: &str,
        result: &Result<T>,
        detail: impl FnOnce(&T) -> String,
    ) -> Self {
        match result {
            Ok(value) => Self::ok(label, detail(value)),
            Err(_) => Self::failed(label),
        }
    }

    /// Print the one-line summary (✓/✗ + label) to stderr.
    pub fn print(&self) {
        let icon = if self.success { icon_ok() } else { icon_err() };
        match &self.detail {
            Some(detail) => eprintln!(
                "  {}  {}  {}",
                icon,
                style(&self.label).bold(),
                style(detail).dim()
            ),
            None => eprintln!("  {}  {}", icon, style(&self.label).bold()),
        }
    }
}

/// Print the outcome of `result` as stage `label` and hand the result back.
pub fn report<T>(
    label: &str,
    result: Result<T>,
    detail: impl FnOnce(&T) -> String,
) -> Result<T> {
    StageOutcome::from_result(label, &result, detail).print();
    result
}

// ─── Archiver execution ───────────────────────────────────────────────────────

/// Run the archiver synchronously and map its exit status.  `args[0]` is the
/// program.  Its stdout goes to our stderr so that stdout stays reserved for
/// the archive path.
pub fn run_archiver(args: &[String]) -> Result<()> {
    let Some((program, rest)) = args.split_first() else {
        return Err(Error::validation("archiver command is empty"));
    };

    info!(command = %args.join(" "), "running archiver");
    let status = Command::new(program)
        .args(rest)
        .stdout(std::io::stderr())
        .status()
        .map_err(|source| Error::Spawn {
            program: program.clone(),
            source,
        })?;

    check_status(program, status.code())
}

/// `0` and `1` succeed; `None` means the process was killed by a signal.
pub fn check_status(program: &str, code: Option<i32>) -> Result<()> {
    match code {
        Some(0) => Ok(()),
        Some(1) => {
            warn!(program, "archiver finished with warnings");
            Ok(())
        },
        status => Err(Error::Archiver {
            program: program.to_string(),
            status,
        }),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
