//! Builds the per-file deployment actions for a webapp build.

use lambda_runtime::tracing::{info, warn};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::mime::{content_type_for, is_script};
use super::substitute::{Substitutions, api_url_substitutions, substitute};
use crate::models::AppError;

/// One asset to upload, with the substitutions to apply on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutedFile {
    /// Absolute path of the built asset
    pub source: PathBuf,
    /// Object key: the path relative to the asset root, `/`-separated
    pub destination_key: String,
    pub is_script: bool,
    pub content_type: String,
    pub substitutions: Substitutions,
}

impl SubstitutedFile {
    /// The asset's bytes with every substitution applied.
    #[must_use]
    pub fn render(&self, contents: &[u8]) -> Vec<u8> {
        substitute(contents, &self.substitutions)
    }
}

/// Object key for `path` below `root`.
fn destination_key(root: &Path, path: &Path) -> Result<String, AppError> {
    let relative = path.strip_prefix(root).map_err(|e| {
        AppError::Io(format!(
            "{} is not below {}: {e}",
            path.display(),
            root.display()
        ))
    })?;

    Ok(relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/"))
}

/// Schedules one [`SubstitutedFile`] per file below `asset_root`, whatever its
/// type, each carrying the `REMOTE_API_URL_PLACEHOLDER → api_url` rule.
///
/// Files are listed in file-name order so plans are reproducible. A missing
/// asset root is not an error: the webapp may simply not be built yet, so the
/// website step is skipped with a warning and the plan is empty.
///
/// # Errors
///
/// Returns [`AppError::Io`] if the asset root is not a directory or the tree
/// cannot be walked.
pub fn plan_website_files(
    asset_root: &Path,
    api_url: &str,
) -> Result<Vec<SubstitutedFile>, AppError> {
    if !asset_root.exists() {
        warn!(
            "Directory {} does not exist. Skipping website deployment.",
            asset_root.display()
        );
        return Ok(Vec::new());
    }
    if !asset_root.is_dir() {
        return Err(AppError::Io(format!(
            "asset root {} is not a directory",
            asset_root.display()
        )));
    }

    let root = std::fs::canonicalize(asset_root)?;
    let substitutions = api_url_substitutions(api_url);
    let mut files = Vec::new();

    for entry in WalkDir::new(&root).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let source = entry.into_path();
        let destination_key = destination_key(&root, &source)?;
        info!("Creating substituted file for: {}", destination_key);

        files.push(SubstitutedFile {
            is_script: is_script(&source),
            content_type: content_type_for(&source),
            substitutions: substitutions.clone(),
            destination_key,
            source,
        });
    }

    Ok(files)
}
