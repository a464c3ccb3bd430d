//! Deploy-time publication of the webapp build.
//!
//! The API URL only exists once the gateway has been provisioned, so the built
//! assets ship with a placeholder and are rewritten while being uploaded.

pub mod mime;
pub mod plan;
pub mod store;
pub mod substitute;
pub mod url;

use futures::stream::{self, StreamExt, TryStreamExt};
use lambda_runtime::tracing::info;
use std::path::Path;

use crate::models::AppError;

pub use plan::{SubstitutedFile, plan_website_files};
pub use store::{AssetStore, Distribution, LocalAssetStore, S3AssetStore};
pub use substitute::{PLACEHOLDER_TOKEN, substitute};
pub use url::{API_STAGE_NAME, resolve_api_url};

/// Edge cache paths invalidated after a deployment.
pub const INVALIDATION_PATHS: &[&str] = &["/*"];

/// Files read and uploaded at the same time.
pub const MAX_CONCURRENT_UPLOADS: usize = 8;

/// Outcome of [`deploy_website`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentReport {
    /// Object keys written, in plan order
    pub uploaded: Vec<String>,
    /// Edge cache paths an invalidation was requested for; empty when the
    /// target has no edge cache
    pub invalidated: Vec<String>,
}

/// Reads, substitutes and uploads one planned file.
async fn upload_file(store: &dyn AssetStore, file: &SubstitutedFile) -> Result<String, AppError> {
    let contents = tokio::fs::read(&file.source)
        .await
        .map_err(|e| AppError::Io(format!("read {}: {e}", file.source.display())))?;

    store
        .put_object(&file.destination_key, &file.content_type, file.render(&contents))
        .await
        .map_err(|e| AppError::Upload(format!("{}: {e:#}", file.destination_key)))?;

    Ok(file.destination_key.clone())
}

/// Publishes every file under `asset_root` to `store` with the API URL
/// placeholder replaced by `api_url`, then invalidates the edge cache.
///
/// At most [`MAX_CONCURRENT_UPLOADS`] files are in flight at once; the
/// deployment fails as a whole if any upload fails. A missing asset root deploys nothing and is not an error.
///
/// # Errors
///
/// Returns [`AppError::Io`] if the asset tree cannot be read and
/// [`AppError::Upload`] if the store rejects an upload or the invalidation.
pub async fn deploy_website(
    store: &dyn AssetStore,
    asset_root: &Path,
    api_url: &str,
) -> Result<DeploymentReport, AppError> {
    let files = plan_website_files(asset_root, api_url)?;
    if files.is_empty() {
        return Ok(DeploymentReport::default());
    }

    let uploaded: Vec<String> = stream::iter(files.iter().map(|file| upload_file(store, file)))
        .buffered(MAX_CONCURRENT_UPLOADS)
        .try_collect()
        .await?;

    let paths: Vec<String> = INVALIDATION_PATHS.iter().map(ToString::to_string).collect();
    let invalidated = store
        .invalidate(&paths)
        .await
        .map_err(|e| AppError::Upload(format!("invalidation: {e:#}")))?;

    info!(
        files = uploaded.len(),
        api_url = %api_url,
        "Website deployed"
    );

    Ok(DeploymentReport {
        uploaded,
        invalidated,
    })
}
