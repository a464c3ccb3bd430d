//! Byte-level placeholder substitution.
//!
//! Assets are treated as opaque bytes: only exact occurrences of a token are
//! rewritten, so binary files pass through untouched unless they happen to
//! contain the token.

use std::collections::BTreeMap;

/// Token the webapp build leaves where the API base URL belongs.
pub const PLACEHOLDER_TOKEN: &str = "REMOTE_API_URL_PLACEHOLDER";

/// Placeholder token → replacement value.
pub type Substitutions = BTreeMap<String, String>;

/// The single rule every asset is deployed with.
#[must_use]
pub fn api_url_substitutions(api_url: &str) -> Substitutions {
    BTreeMap::from([(PLACEHOLDER_TOKEN.to_string(), api_url.to_string())])
}

/// Replaces every non-overlapping occurrence of `token`, scanning left to right.
/// An empty token leaves the input unchanged.
#[must_use]
pub fn replace_all(contents: &[u8], token: &[u8], replacement: &[u8]) -> Vec<u8> {
    if token.is_empty() || contents.len() < token.len() {
        return contents.to_vec();
    }

    let mut out = Vec::with_capacity(contents.len());
    let mut rest = contents;
    while let Some(pos) = rest.windows(token.len()).position(|w| w == token) {
        out.extend_from_slice(&rest[..pos]);
        out.extend_from_slice(replacement);
        rest = &rest[pos + token.len()..];
    }
    out.extend_from_slice(rest);
    out
}

/// Applies every rule of `substitutions` to `contents`, in key order.
#[must_use]
pub fn substitute(contents: &[u8], substitutions: &Substitutions) -> Vec<u8> {
    substitutions
        .iter()
        .fold(contents.to_vec(), |acc, (token, value)| {
            replace_all(&acc, token.as_bytes(), value.as_bytes())
        })
}
