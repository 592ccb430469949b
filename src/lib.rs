//! Canary nightly-build fetcher library.
//!
//! This crate provides the core functionality for locating the latest
//! WebKitGTK nightly build, downloading its archive, and rewriting the
//! GNOME Web Canary flatpak manifest to reference the downloaded build.
//! It is used by the `canary-update` CLI binary and can be consumed
//! programmatically for testing or custom packaging workflows.
//!
//! # Modules
//!
//! - [`cli`] - Command-line argument definitions
//! - [`download`] - HTTP retrieval of the build indicator and archive
//! - [`error`] - Semantic error types with exit-code mapping
//! - [`manifest`] - Flatpak manifest template patching
//! - [`output`] - Stderr line writing and user-facing messages
//! - [`pipeline`] - Resolve, download, checksum, and patch orchestration
//! - [`progress`] - Download progress reporting
//! - [`sha256_digest`] - Validated SHA-256 digest newtype and computation
//! - [`token`] - Build token resolution from the indicator resource

pub mod cli;
pub mod download;
pub mod error;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod sha256_digest;
pub mod token;
