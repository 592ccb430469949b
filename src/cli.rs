//! CLI argument definitions for the canary updater.
//!
//! This module defines the command-line interface using clap. It is
//! separated from the main entrypoint to keep the binary focused on
//! orchestration and exit-code mapping.

use crate::download::DEFAULT_BASE_URL;
use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Update the Canary flatpak manifest with the latest nightly build.
#[derive(Parser, Debug)]
#[command(name = "canary-update")]
#[command(version, about)]
#[command(long_about = concat!(
    "Update the GNOME Web Canary flatpak manifest with the latest WebKitGTK ",
    "nightly build.\n\n",
    "The updater resolves the newest archive from the nightly build server, ",
    "downloads it to the working directory, computes its SHA-256 checksum, and ",
    "rewrites org.gnome.Epiphany.Canary.json.in into ",
    "org.gnome.Epiphany.Canary.json with the webkitgtk module pointing at the ",
    "downloaded archive and the epiphany module pointing at the local checkout.\n\n",
    "The build type selects which nightly flavour to download and is required.",
))]
#[command(after_help = concat!(
    "EXIT CODES:\n",
    "  0  manifest written successfully\n",
    "  1  missing build type, or a download/manifest failure\n",
    "  2  no nightly build found\n\n",
    "EXAMPLES:\n",
    "  Fetch the latest release nightly with a progress bar:\n",
    "    $ canary-update -v release\n\n",
    "  Fetch a debug nightly from a mirror:\n",
    "    $ canary-update --base-url https://mirror.example.org debug\n",
))]
pub struct Cli {
    /// Nightly build flavour to download.
    #[arg(value_enum, value_name = "BUILD_TYPE")]
    pub build_type: Option<BuildType>,

    /// Root URL of the nightly build server.
    #[arg(long, value_name = "URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Directory recorded for the epiphany module [default: current directory].
    #[arg(long, value_name = "DIR")]
    pub project_dir: Option<Utf8PathBuf>,

    /// Show a download progress bar and step messages.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// The nightly build flavours published by the build server.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildType {
    /// Optimised nightly build.
    Release,
    /// Debug nightly build with assertions enabled.
    Debug,
}

impl Default for Cli {
    /// Creates a `Cli` instance with no build type selected and the
    /// production base URL, useful for testing or programmatic
    /// construction.
    fn default() -> Self {
        Self {
            build_type: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
            project_dir: None,
            verbose: false,
            quiet: false,
        }
    }
}

impl BuildType {
    /// The server directory holding this flavour's builds.
    #[must_use]
    pub fn remote_dir(self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::Debug => "debug",
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
