//! Publishes the built webapp with the deployed API URL substituted in.
//!
//! # Usage
//!
//! ```bash
//! # Stage into a local directory
//! deploy-assets --rest-api-id a1b2c3d4e5 --region us-east-1 --local-dir ./staging
//!
//! # Upload to the website bucket and invalidate its distribution
//! deploy-assets --rest-api-id a1b2c3d4e5 --region us-east-1 \
//!     --bucket my-site-bucket --distribution-id E2QWRUHEXAMPLE
//! ```
//!
//! A missing asset root is skipped with a warning, so infrastructure can be
//! applied before the webapp has been built once.

use anyhow::{Context, Result, bail};
use aws_lambda_website::config::AppConfig;
use aws_lambda_website::deploy::{
    AssetStore, LocalAssetStore, S3AssetStore, deploy_website, resolve_api_url,
};
use clap::Parser;
use lambda_runtime::tracing::info;
use std::path::PathBuf;

/// Command-line interface for `deploy-assets`.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Uploads the webapp build with REMOTE_API_URL_PLACEHOLDER replaced by the API URL"
)]
struct Cli {
    /// Root of the webapp build output.
    #[arg(long, default_value = "../webapp/dist")]
    asset_root: PathBuf,

    /// Application configuration (`applicationName`).
    #[arg(long, default_value = "appConfig.json")]
    config: PathBuf,

    /// Id of the deployed REST API.
    #[arg(long, env = "REST_API_ID", required_unless_present = "api_url")]
    rest_api_id: Option<String>,

    /// Region of the deployment.
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// Full API base URL; overrides `--rest-api-id`/`--region`.
    #[arg(long)]
    api_url: Option<String>,

    /// Write the substituted assets below this directory.
    #[arg(long, conflicts_with = "bucket", required_unless_present = "bucket")]
    local_dir: Option<PathBuf>,

    /// Upload the substituted assets to this S3 bucket.
    #[arg(long)]
    bucket: Option<String>,

    /// Custom S3 endpoint (path-style addressing).
    #[arg(long)]
    endpoint_url: Option<String>,

    /// CloudFront distribution to invalidate after the upload.
    #[arg(long, requires = "bucket")]
    distribution_id: Option<String>,
}

impl Cli {
    fn api_url(&self) -> Result<String> {
        if let Some(url) = &self.api_url {
            return Ok(url.clone());
        }
        match (&self.rest_api_id, &self.region) {
            (Some(id), Some(region)) => Ok(resolve_api_url(id, region)),
            (None, _) => bail!("--rest-api-id or --api-url is required"),
            (_, None) => bail!("--region (or AWS_REGION) is required to resolve the API URL"),
        }
    }

    fn store(&self, app: &AppConfig) -> Result<Box<dyn AssetStore>> {
        if let Some(dir) = &self.local_dir {
            return Ok(Box::new(LocalAssetStore::new(dir.clone())));
        }
        let Some(bucket) = &self.bucket else {
            bail!("either --local-dir or --bucket is required");
        };
        let region = self
            .region
            .clone()
            .context("--region (or AWS_REGION) is required for S3 uploads")?;
        let store = S3AssetStore::from_env(
            bucket.clone(),
            region,
            self.endpoint_url.clone(),
            Some(app.resource_names().project_tagging()),
            self.distribution_id.clone(),
        )?;
        Ok(Box::new(store))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    lambda_runtime::tracing::init_default_subscriber();

    let cli = Cli::parse();
    let app = AppConfig::load(&cli.config)?;
    let api_url = cli.api_url()?;
    let store = cli.store(&app)?;

    info!(
        application = %app.application_name,
        asset_root = %cli.asset_root.display(),
        api_url = %api_url,
        "Deploying website assets"
    );

    let report = deploy_website(store.as_ref(), &cli.asset_root, &api_url).await?;

    info!(
        uploaded = report.uploaded.len(),
        invalidated = ?report.invalidated,
        "Done"
    );
    Ok(())
}
