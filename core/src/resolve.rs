//! Turns user input into a URL.

use std::fs::{self, File};
use std::path::Path;

use url::Url;

use crate::error::FetchError;

/// Resolves a URL string or a local filesystem path.
///
/// Input that does not start with `http` and names a readable file becomes
/// a `file` URL of its absolute path. Everything else must parse as an
/// absolute URL. No network I/O happens here.
pub fn resolve_url(path_or_url: &str) -> Result<Url, FetchError> {
    if !path_or_url.starts_with("http") {
        if let Some(url) = readable_file_url(Path::new(path_or_url)) {
            return Ok(url);
        }
    }
    Url::parse(path_or_url).map_err(|e| FetchError::malformed(path_or_url, e))
}

fn readable_file_url(path: &Path) -> Option<Url> {
    File::open(path).ok()?;
    let absolute = fs::canonicalize(path).ok()?;
    Url::from_file_path(absolute).ok()
}
