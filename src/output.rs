//! Output formatting for the updater CLI.
//!
//! Status and diagnostic lines go to stderr through an injected writer so
//! tests can capture them without touching the process streams.

use camino::Utf8Path;
use std::io::Write;

/// Write a single line to the given writer, ignoring write failures.
///
/// Output is best-effort: a closed stderr must never abort the run.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Format the final success message.
#[must_use]
pub fn success_message(manifest_path: &Utf8Path) -> String {
    format!("Wrote {manifest_path}")
}
