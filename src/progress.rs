//! Progress reporting for archive downloads.
//!
//! The downloader reports byte counts after each chunk; the console
//! reporter renders a textual bar to stderr using carriage returns. This
//! output is a side effect only and carries no contract: a quiet run uses
//! the null reporter and produces nothing.

use std::io::Write;

/// Width of the rendered progress bar in characters.
const BAR_WIDTH: u64 = 30;

/// Receives download progress updates.
pub trait ProgressReporter {
    /// Called after each chunk with the cumulative byte count and the
    /// total size when the server reported one.
    fn on_progress(&mut self, received: u64, total: Option<u64>);

    /// Called once the transfer has completed.
    fn finish(&mut self);
}

/// A reporter that discards all updates.
pub struct NullProgress;

impl ProgressReporter for NullProgress {
    fn on_progress(&mut self, _received: u64, _total: Option<u64>) {}

    fn finish(&mut self) {}
}

/// Renders a textual progress bar to the given writer.
///
/// Updates are throttled to whole-percent changes when the total size is
/// known, and to megabyte boundaries otherwise, so a large download does
/// not flood the terminal.
pub struct ConsoleProgress<'a> {
    out: &'a mut dyn Write,
    last_rendered: Option<u64>,
}

impl<'a> ConsoleProgress<'a> {
    /// Create a reporter writing to `out`.
    #[must_use]
    pub fn new(out: &'a mut dyn Write) -> Self {
        Self {
            out,
            last_rendered: None,
        }
    }
}

impl ProgressReporter for ConsoleProgress<'_> {
    fn on_progress(&mut self, received: u64, total: Option<u64>) {
        let line = match total {
            Some(total_bytes) => {
                let percent = fraction_of(received, total_bytes, 100);
                if self.last_rendered == Some(percent) {
                    return;
                }
                self.last_rendered = Some(percent);
                render_bar(received, total_bytes)
            }
            None => {
                let megabytes = received / (1024 * 1024);
                if self.last_rendered == Some(megabytes) {
                    return;
                }
                self.last_rendered = Some(megabytes);
                format!("\rdownloaded {megabytes} MiB")
            }
        };
        // Best-effort output; a closed stderr must not abort the download.
        let _ = write!(self.out, "{line}");
        let _ = self.out.flush();
    }

    fn finish(&mut self) {
        let _ = writeln!(self.out);
    }
}

/// Render the bar line for a known total.
fn render_bar(received: u64, total: u64) -> String {
    let filled = fraction_of(received, total, BAR_WIDTH);
    let percent = fraction_of(received, total, 100);
    let mut bar = String::new();
    for position in 0..BAR_WIDTH {
        bar.push(if position < filled { '#' } else { ' ' });
    }
    format!("\r[{bar}] {percent:3}%")
}

/// Scale `received / total` to `scale`, clamping overshoot to the maximum.
fn fraction_of(received: u64, total: u64, scale: u64) -> u64 {
    if total == 0 {
        return scale;
    }
    let clamped = received.min(total);
    let scaled = (u128::from(clamped) * u128::from(scale)) / u128::from(total);
    u64::try_from(scaled).unwrap_or(scale)
}
