//! Hosting targets for the website assets.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_cloudfront::{
    Client as CloudFrontClient, Config as CloudFrontConfig,
    types::{InvalidationBatch, Paths},
};
use aws_sdk_s3::{
    Client as S3Client, Config as S3Config,
    config::{Credentials, Region},
    primitives::ByteStream,
};
use chrono::Utc;
use lambda_runtime::tracing::{debug, info, warn};
use std::path::PathBuf;

use crate::models::AppError;

/// Storage the website is served from.
///
/// Implementations must be safe to call concurrently: uploads of different
/// keys run in parallel.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Stores `bytes` under `key`, replacing any previous object.
    async fn put_object(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<()>;

    /// Marks cached copies of `paths` stale at the edge and returns the paths
    /// an invalidation was actually requested for.
    async fn invalidate(&self, paths: &[String]) -> Result<Vec<String>>;
}

/// Writes assets below a local directory. Used for staging a deployment and
/// for inspecting what would be uploaded.
pub struct LocalAssetStore {
    dir: PathBuf,
}

impl LocalAssetStore {
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn put_object(&self, key: &str, _content_type: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.dir.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create {}", parent.display()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        debug!(key = %key, "Staged asset");
        Ok(())
    }

    async fn invalidate(&self, paths: &[String]) -> Result<Vec<String>> {
        debug!(?paths, "Local target has no edge cache");
        Ok(Vec::new())
    }
}

/// Region CloudFront's control plane is addressed in.
const CLOUDFRONT_REGION: &str = "us-east-1";

/// The CloudFront distribution serving the website bucket.
pub struct Distribution {
    client: CloudFrontClient,
    id: String,
}

impl Distribution {
    #[must_use]
    pub const fn new(client: CloudFrontClient, id: String) -> Self {
        Self { client, id }
    }

    async fn create_invalidation(&self, paths: &[String]) -> Result<String> {
        let quantity = i32::try_from(paths.len()).context("too many invalidation paths")?;
        let paths = Paths::builder()
            .quantity(quantity)
            .set_items(Some(paths.to_vec()))
            .build()
            .context("invalidation paths")?;
        let batch = InvalidationBatch::builder()
            .paths(paths)
            .caller_reference(format!(
                "deploy-assets-{}",
                Utc::now().format("%Y%m%dT%H%M%S%.9f")
            ))
            .build()
            .context("invalidation batch")?;

        let output = self
            .client
            .create_invalidation()
            .distribution_id(&self.id)
            .invalidation_batch(batch)
            .send()
            .await
            .with_context(|| format!("cloudfront invalidation of {}", self.id))?;

        Ok(output
            .invalidation()
            .map(|i| i.id().to_string())
            .unwrap_or_default())
    }
}

/// Uploads assets to the website bucket.
pub struct S3AssetStore {
    client: S3Client,
    bucket: String,
    tagging: Option<String>,
    distribution: Option<Distribution>,
}

impl S3AssetStore {
    #[must_use]
    pub const fn new(client: S3Client, bucket: String, tagging: Option<String>) -> Self {
        Self {
            client,
            bucket,
            tagging,
            distribution: None,
        }
    }

    /// Invalidates `distribution` after uploads.
    #[must_use]
    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = Some(distribution);
        self
    }

    /// Builds the clients from `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and
    /// the optional `AWS_SESSION_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if the credentials are not set.
    pub fn from_env(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        tagging: Option<String>,
        distribution_id: Option<String>,
    ) -> Result<Self, AppError> {
        let access_key = std::env::var("AWS_ACCESS_KEY_ID")
            .map_err(|_| AppError::Config("AWS_ACCESS_KEY_ID is not set".to_string()))?;
        let secret_key = std::env::var("AWS_SECRET_ACCESS_KEY")
            .map_err(|_| AppError::Config("AWS_SECRET_ACCESS_KEY is not set".to_string()))?;
        let session_token = std::env::var("AWS_SESSION_TOKEN").ok();

        let credentials = Credentials::new(
            access_key.clone(),
            secret_key.clone(),
            session_token.clone(),
            None,
            "deploy-assets",
        );
        let mut builder = S3Config::builder()
            .region(Region::new(region))
            .credentials_provider(credentials);
        if let Some(endpoint) = endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let store = Self::new(S3Client::from_conf(builder.build()), bucket, tagging);
        let Some(id) = distribution_id else {
            return Ok(store);
        };

        let config = CloudFrontConfig::builder()
            .region(aws_sdk_cloudfront::config::Region::new(CLOUDFRONT_REGION))
            .credentials_provider(aws_sdk_cloudfront::config::Credentials::new(
                access_key,
                secret_key,
                session_token,
                None,
                "deploy-assets",
            ))
            .build();
        Ok(store.with_distribution(Distribution::new(
            CloudFrontClient::from_conf(config),
            id,
        )))
    }
}

#[async_trait]
impl AssetStore for S3AssetStore {
    async fn put_object(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<()> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes));
        if let Some(tagging) = &self.tagging {
            request = request.tagging(tagging);
        }
        request
            .send()
            .await
            .with_context(|| format!("s3 put s3://{}/{key}", self.bucket))?;
        Ok(())
    }

    async fn invalidate(&self, paths: &[String]) -> Result<Vec<String>> {
        let Some(distribution) = &self.distribution else {
            warn!(
                bucket = %self.bucket,
                ?paths,
                "No distribution id given, edge cache not invalidated"
            );
            return Ok(Vec::new());
        };

        let invalidation_id = distribution.create_invalidation(paths).await?;
        info!(
            distribution = %distribution.id,
            invalidation = %invalidation_id,
            ?paths,
            "Edge cache invalidation created"
        );
        Ok(paths.to_vec())
    }
}
