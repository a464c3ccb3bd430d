//! Content types for uploaded assets, by file extension.

use std::path::Path;

/// `Content-Type` for an asset path. Unknown extensions are served as
/// `application/octet-stream`.
#[must_use]
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

/// Whether the asset is a script, i.e. where the API URL placeholder is expected.
#[must_use]
pub fn is_script(path: &Path) -> bool {
    mime_guess::from_path(path)
        .first()
        .is_some_and(|mime| mime.subtype() == "javascript")
}
