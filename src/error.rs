//! Error types for the canary-update CLI.
//!
//! This module defines semantic error variants for every failure the fetch
//! pipeline can encounter, together with the exit code each maps to. There
//! is no retry or recovery: the first error aborts the run and is surfaced
//! as a single diagnostic line.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Exit code returned when a required build-type selection is absent.
pub const EXIT_USAGE: i32 = 1;

/// Exit code returned for download, manifest, and I/O failures.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code returned when no nightly build could be resolved.
pub const EXIT_NO_BUILD: i32 = 2;

/// Errors that can occur while fetching a build and patching the manifest.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The indicator resource was missing or named no build.
    #[error("no nightly build found at {url}")]
    BuildNotFound {
        /// The indicator URL that failed to resolve.
        url: String,
    },

    /// An HTTP transfer could not complete.
    #[error("download failed for {url}: {reason}")]
    Download {
        /// The URL that was being transferred.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The manifest template file could not be read.
    #[error("cannot read manifest template {path}")]
    ManifestRead {
        /// Path to the template that could not be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest template was not valid JSON.
    #[error("invalid manifest template {path}: {reason}")]
    ManifestParse {
        /// Path to the unparsable template.
        path: Utf8PathBuf,
        /// Description of the parse error.
        reason: String,
    },

    /// The manifest document does not have the expected shape.
    #[error("malformed manifest {path}: {reason}")]
    ManifestShape {
        /// Path to the malformed template.
        path: Utf8PathBuf,
        /// Description of the structural problem.
        reason: String,
    },

    /// A required module is absent from the manifest template.
    #[error("module {name} not found in manifest {path}")]
    ModuleMissing {
        /// Name of the missing module.
        name: String,
        /// Path to the template that lacks the module.
        path: Utf8PathBuf,
    },

    /// A value was not a well-formed SHA-256 hex digest.
    #[error("invalid SHA-256 digest: {reason}")]
    InvalidDigest {
        /// Description of the validation failure.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Map the error to the process exit code it should produce.
    ///
    /// A resolution failure is distinguished so that CI callers can tell
    /// "no build published yet" apart from genuine breakage.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::BuildNotFound { .. } => EXIT_NO_BUILD,
            _ => EXIT_FAILURE,
        }
    }
}

/// Result type alias using [`FetchError`].
pub type Result<T> = std::result::Result<T, FetchError>;
