//! Resolve, download, checksum, and patch orchestration.
//!
//! The pipeline is strictly linear: resolve the indicator, download the
//! archive, compute its digest, patch the manifest. There are no retries;
//! the first failure aborts the run and the output manifest is only
//! written after patching has fully succeeded. The downloaded archive is
//! deliberately left on disk for the packaging tool to consume.

use crate::cli::Cli;
use crate::download::{BuildDownloader, join_url};
use crate::error::{FetchError, Result};
use crate::manifest::patch_manifest;
use crate::output::{success_message, write_stderr_line};
use crate::progress::{ConsoleProgress, NullProgress, ProgressReporter};
use crate::sha256_digest::compute_sha256;
use crate::token::{BuildToken, INDICATOR_FILE};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;

/// Local filename the downloaded archive is written to.
pub const ARCHIVE_FILENAME: &str = "webkitgtk.zip";

/// Filename of the manifest template read from the working directory.
pub const MANIFEST_TEMPLATE: &str = "org.gnome.Epiphany.Canary.json.in";

/// Configuration for one fetch-and-patch run.
#[derive(Debug)]
pub struct FetchConfig<'a> {
    /// Root URL of the nightly build server.
    pub base_url: &'a str,
    /// Server directory for the selected build flavour.
    pub build_dir: &'a str,
    /// Path of the manifest template to patch.
    pub template_path: &'a Utf8Path,
    /// Destination path for the downloaded archive.
    pub archive_dest: &'a Utf8Path,
    /// Directory recorded for the local project module.
    pub project_dir: &'a Utf8Path,
    /// Suppress status output.
    pub quiet: bool,
    /// Render a console progress bar while downloading.
    pub show_progress: bool,
}

impl<'a> FetchConfig<'a> {
    /// Build a run configuration from parsed CLI arguments and the fixed
    /// working-directory filenames.
    #[must_use]
    pub fn from_cli(
        cli: &'a Cli,
        build_dir: &'a str,
        template_path: &'a Utf8Path,
        archive_dest: &'a Utf8Path,
        project_dir: &'a Utf8Path,
    ) -> Self {
        Self {
            base_url: &cli.base_url,
            build_dir,
            template_path,
            archive_dest,
            project_dir,
            quiet: cli.quiet,
            show_progress: cli.verbose,
        }
    }
}

/// Run the full pipeline and return the path of the written manifest.
///
/// # Errors
///
/// Propagates the first failure from any stage: [`FetchError::BuildNotFound`]
/// when the indicator is missing or empty, [`FetchError::Download`] when a
/// transfer fails, and the manifest error variants when patching fails.
pub fn run_pipeline(
    config: &FetchConfig<'_>,
    downloader: &dyn BuildDownloader,
    stderr: &mut dyn Write,
) -> Result<Utf8PathBuf> {
    let indicator_url = join_url(config.base_url, &[config.build_dir, INDICATOR_FILE]);
    log::debug!("resolving latest build from {indicator_url}");
    let body = downloader.fetch_indicator(&indicator_url)?;
    let token = BuildToken::from_indicator(&body).ok_or(FetchError::BuildNotFound {
        url: indicator_url,
    })?;

    if !config.quiet {
        write_stderr_line(stderr, format!("Latest nightly build: {token}"));
    }

    let archive_url = join_url(config.base_url, &[config.build_dir, token.as_str()]);
    log::debug!("downloading {archive_url} to {}", config.archive_dest);
    download_with_progress(config, downloader, &archive_url, stderr)?;

    let digest = compute_sha256(config.archive_dest.as_std_path())?;
    log::trace!("archive digest {digest}");

    let output = patch_manifest(
        config.template_path,
        config.archive_dest,
        &digest,
        config.project_dir,
    )?;

    if !config.quiet {
        write_stderr_line(stderr, success_message(&output));
    }
    Ok(output)
}

/// Download the archive, rendering a progress bar when requested.
fn download_with_progress(
    config: &FetchConfig<'_>,
    downloader: &dyn BuildDownloader,
    archive_url: &str,
    stderr: &mut dyn Write,
) -> Result<()> {
    if config.show_progress {
        let mut reporter = ConsoleProgress::new(stderr);
        downloader.download_archive(archive_url, config.archive_dest, &mut reporter)?;
        reporter.finish();
    } else {
        let mut reporter = NullProgress;
        downloader.download_archive(archive_url, config.archive_dest, &mut reporter)?;
    }
    Ok(())
}
