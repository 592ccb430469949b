//! Canary updater CLI entrypoint.
//!
//! This binary resolves the latest WebKitGTK nightly build, downloads its
//! archive into the working directory, and rewrites the Canary flatpak
//! manifest to reference the downloaded build and the local checkout.

use camino::Utf8PathBuf;
use canary_update::cli::Cli;
use canary_update::download::{BuildDownloader, HttpDownloader};
use canary_update::error::{EXIT_FAILURE, EXIT_USAGE};
use canary_update::output::write_stderr_line;
use canary_update::pipeline::{ARCHIVE_FILENAME, FetchConfig, MANIFEST_TEMPLATE, run_pipeline};
use clap::{CommandFactory, Parser};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let exit_code = run(&cli, &HttpDownloader, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Run the updater and map the outcome to a process exit code.
fn run(cli: &Cli, downloader: &dyn BuildDownloader, stderr: &mut dyn Write) -> i32 {
    let Some(build_type) = cli.build_type else {
        print_usage(stderr);
        return EXIT_USAGE;
    };

    let project_dir = match resolve_project_dir(cli) {
        Ok(dir) => dir,
        Err(err) => {
            write_stderr_line(stderr, err);
            return EXIT_FAILURE;
        }
    };

    let template_path = Utf8PathBuf::from(MANIFEST_TEMPLATE);
    let archive_dest = Utf8PathBuf::from(ARCHIVE_FILENAME);
    let config = FetchConfig::from_cli(
        cli,
        build_type.remote_dir(),
        &template_path,
        &archive_dest,
        &project_dir,
    );

    match run_pipeline(&config, downloader, stderr) {
        Ok(_) => 0,
        Err(err) => {
            write_stderr_line(stderr, &err);
            err.exit_code()
        }
    }
}

/// Determine the directory recorded for the epiphany module.
fn resolve_project_dir(cli: &Cli) -> Result<Utf8PathBuf, String> {
    if let Some(dir) = &cli.project_dir {
        return Ok(dir.clone());
    }
    let cwd = std::env::current_dir().map_err(|e| format!("cannot determine working directory: {e}"))?;
    Utf8PathBuf::try_from(cwd).map_err(|e| format!("working directory is not valid UTF-8: {e}"))
}

/// Print usage text for a missing build-type selection.
fn print_usage(stderr: &mut dyn Write) {
    let usage = Cli::command().render_usage();
    write_stderr_line(stderr, usage);
    write_stderr_line(stderr, "error: a build type (release or debug) is required");
}
