//! Flatpak manifest template patching.
//!
//! The Canary manifest template is a JSON document with a top-level
//! `modules` array. Patching rewrites exactly two entries: the `webkitgtk`
//! module gains an archive source pointing at the downloaded nightly, and
//! the `epiphany` module gains a directory source pointing at the local
//! checkout. Every other module passes through structurally unchanged;
//! `serde_json`'s `preserve_order` feature keeps the template's key order
//! so the rewrite is stable and idempotent.

use crate::error::{FetchError, Result};
use crate::sha256_digest::Sha256Digest;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use serde_json::Value;

/// Name of the external-dependency module rewritten to an archive source.
pub const WEBKIT_MODULE: &str = "webkitgtk";

/// Name of the local-project module rewritten to a directory source.
pub const PROJECT_MODULE: &str = "epiphany";

/// Suffix distinguishing the template from the generated manifest.
pub const TEMPLATE_SUFFIX: &str = ".in";

/// A single entry in a module's `sources` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum SourceEntry {
    /// A local archive referenced by `file://` URL with its checksum.
    #[serde(rename = "archive")]
    Archive {
        /// `file://` URL of the downloaded archive.
        url: String,
        /// Hex SHA-256 digest of the archive.
        sha256: String,
        /// Number of leading path components to strip on extraction.
        #[serde(rename = "strip-components")]
        strip_components: u32,
    },

    /// A local directory used as-is.
    #[serde(rename = "dir")]
    Dir {
        /// Absolute path of the source directory.
        path: String,
    },
}

/// Derive the output manifest path by stripping the template suffix.
///
/// # Errors
///
/// Returns [`FetchError::ManifestShape`] when the template filename does
/// not carry the `.in` suffix.
pub fn output_path(template_path: &Utf8Path) -> Result<Utf8PathBuf> {
    template_path
        .as_str()
        .strip_suffix(TEMPLATE_SUFFIX)
        .map(Utf8PathBuf::from)
        .ok_or_else(|| FetchError::ManifestShape {
            path: template_path.to_owned(),
            reason: format!("template name must end in {TEMPLATE_SUFFIX}"),
        })
}

/// Patch the manifest template and write the generated manifest.
///
/// Reads the template, rewrites the `webkitgtk` and `epiphany` module
/// sources, and writes the pretty-printed result to the derived output
/// path. The output file is only created once patching has fully
/// succeeded in memory; a failed run leaves no partial output behind.
///
/// # Errors
///
/// Returns [`FetchError::ManifestRead`] when the template cannot be read,
/// [`FetchError::ManifestParse`] when it is not valid JSON,
/// [`FetchError::ManifestShape`] when the document lacks a `modules`
/// array, and [`FetchError::ModuleMissing`] when either target module is
/// absent.
pub fn patch_manifest(
    template_path: &Utf8Path,
    archive_path: &Utf8Path,
    digest: &Sha256Digest,
    project_dir: &Utf8Path,
) -> Result<Utf8PathBuf> {
    let destination = output_path(template_path)?;
    let mut document = read_template(template_path)?;

    let archive_source = SourceEntry::Archive {
        url: format!("file://{}", absolute(archive_path)?),
        sha256: digest.as_str().to_owned(),
        strip_components: 0,
    };
    let dir_source = SourceEntry::Dir {
        path: absolute(project_dir)?.into_string(),
    };

    rewrite_modules(&mut document, template_path, &archive_source, &dir_source)?;

    let mut rendered = serde_json::to_string_pretty(&document).map_err(|e| {
        FetchError::ManifestShape {
            path: template_path.to_owned(),
            reason: e.to_string(),
        }
    })?;
    rendered.push('\n');
    std::fs::write(destination.as_std_path(), rendered)?;
    log::debug!("wrote manifest {destination}");
    Ok(destination)
}

/// Read and parse the template JSON document.
fn read_template(template_path: &Utf8Path) -> Result<Value> {
    let text = std::fs::read_to_string(template_path.as_std_path()).map_err(|source| {
        FetchError::ManifestRead {
            path: template_path.to_owned(),
            source,
        }
    })?;
    serde_json::from_str(&text).map_err(|e| FetchError::ManifestParse {
        path: template_path.to_owned(),
        reason: e.to_string(),
    })
}

/// Rewrite the two target modules in place, leaving the rest untouched.
fn rewrite_modules(
    document: &mut Value,
    template_path: &Utf8Path,
    archive_source: &SourceEntry,
    dir_source: &SourceEntry,
) -> Result<()> {
    let modules = document
        .get_mut("modules")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| FetchError::ManifestShape {
            path: template_path.to_owned(),
            reason: "missing top-level \"modules\" array".to_owned(),
        })?;

    let mut saw_webkit = false;
    let mut saw_project = false;
    for module in modules.iter_mut() {
        match module.get("name").and_then(Value::as_str) {
            Some(WEBKIT_MODULE) => {
                replace_sources(module, template_path, archive_source)?;
                saw_webkit = true;
            }
            Some(PROJECT_MODULE) => {
                replace_sources(module, template_path, dir_source)?;
                saw_project = true;
            }
            _ => {}
        }
    }

    if !saw_webkit {
        return Err(module_missing(WEBKIT_MODULE, template_path));
    }
    if !saw_project {
        return Err(module_missing(PROJECT_MODULE, template_path));
    }
    Ok(())
}

/// Replace a module's `sources` list with a single entry.
fn replace_sources(
    module: &mut Value,
    template_path: &Utf8Path,
    source: &SourceEntry,
) -> Result<()> {
    let entry = serde_json::to_value(source).map_err(|e| FetchError::ManifestShape {
        path: template_path.to_owned(),
        reason: e.to_string(),
    })?;
    let object = module
        .as_object_mut()
        .ok_or_else(|| FetchError::ManifestShape {
            path: template_path.to_owned(),
            reason: "module entry is not an object".to_owned(),
        })?;
    object.insert("sources".to_owned(), Value::Array(vec![entry]));
    Ok(())
}

fn module_missing(name: &str, template_path: &Utf8Path) -> FetchError {
    FetchError::ModuleMissing {
        name: name.to_owned(),
        path: template_path.to_owned(),
    }
}

/// Resolve a path against the current working directory.
fn absolute(path: &Utf8Path) -> Result<Utf8PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }
    let cwd = std::env::current_dir()?;
    let cwd = Utf8PathBuf::try_from(cwd)
        .map_err(|e| FetchError::Io(std::io::Error::other(e.to_string())))?;
    Ok(cwd.join(path))
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
