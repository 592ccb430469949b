//! Build token resolution from the remote indicator resource.
//!
//! The nightly build server publishes a small `LAST-IS` text file whose
//! content names the latest archive. The trimmed, percent-encoded content
//! is the build token used to construct the archive URL.

use std::fmt;

/// Filename of the remote indicator resource naming the latest build.
pub const INDICATOR_FILE: &str = "LAST-IS";

/// A resolved build identifier, safe for use as a URL path segment.
///
/// # Examples
///
/// ```
/// use canary_update::token::BuildToken;
///
/// let token = BuildToken::from_indicator("WebKitGTK-289406.zip\n").expect("non-empty");
/// assert_eq!(token.as_str(), "WebKitGTK-289406.zip");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildToken(String);

impl BuildToken {
    /// Resolve a token from the indicator resource body.
    ///
    /// The body is trimmed and percent-encoded. Returns `None` when the
    /// trimmed body is empty, which callers treat as "no build found".
    #[must_use]
    pub fn from_indicator(body: &str) -> Option<Self> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(encode_path_segment(trimmed)))
    }

    /// Return the encoded token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Percent-encode a string for use as a single URL path segment.
///
/// Unreserved characters (RFC 3986 §2.3) pass through; everything else,
/// including `/` and `%`, is encoded so an indicator body can never splice
/// extra path components into the archive URL.
fn encode_path_segment(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        if is_unreserved(byte) {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

/// Whether a byte is an RFC 3986 unreserved character.
fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~')
}
