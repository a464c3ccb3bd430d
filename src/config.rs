//! Configuration for the bridge and the deployment tooling.
//!
//! `appConfig.json` names the application; every provisioned resource is
//! named and tagged from it. The local bridge is configured from the
//! environment.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use crate::handler::DEFAULT_HANDLER_NAME;
use crate::models::AppError;

/// Default port of the local bridge.
pub const DEFAULT_PORT: u16 = 3001;

/// Tag key applied to every resource of the application.
pub const PROJECT_TAG_KEY: &str = "Project";

/// Contents of `appConfig.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub application_name: String,
}

impl AppConfig {
    /// Reads and parses an `appConfig.json` file.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if the file cannot be read, is not valid JSON,
    /// or names an empty application.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    /// Parses `appConfig.json` contents.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] on malformed JSON or an empty application name.
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| AppError::Config(format!("invalid appConfig.json: {e}")))?;
        if config.application_name.trim().is_empty() {
            return Err(AppError::Config("applicationName must not be empty".to_string()));
        }
        Ok(config)
    }

    #[must_use]
    pub fn resource_names(&self) -> ResourceNames {
        ResourceNames::new(&self.application_name)
    }
}

/// Names of the provisioned resources, derived from the application name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNames {
    pub application_name: String,
    pub stack_name: String,
    pub rest_api_name: String,
    pub resource_group_name: String,
    pub api_url_export_name: String,
}

impl ResourceNames {
    #[must_use]
    pub fn new(application_name: &str) -> Self {
        Self {
            application_name: application_name.to_string(),
            stack_name: format!("{application_name}ApiStack"),
            rest_api_name: format!("{application_name}-api"),
            resource_group_name: format!("{PROJECT_TAG_KEY}-{application_name}"),
            api_url_export_name: format!("{application_name}-ApiUrl"),
        }
    }

    /// The `Project=<application>` tag in S3 tagging syntax (URL-encoded query).
    #[must_use]
    pub fn project_tagging(&self) -> String {
        format!(
            "{}={}",
            PROJECT_TAG_KEY,
            urlencoding::encode(&self.application_name)
        )
    }
}

/// Settings of the local emulation bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Name of the registered handler to serve
    pub handler: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            handler: DEFAULT_HANDLER_NAME.to_string(),
        }
    }
}

impl BridgeConfig {
    /// Reads `HOST`, `PORT` and `API_MOCK_HANDLER` from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if `HOST` or `PORT` is set but unparseable.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if `HOST` or `PORT` is set but unparseable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT").filter(|p| !p.trim().is_empty()) {
            config.port = port
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("invalid PORT {port:?}: {e}")))?;
        }
        if let Some(host) = lookup("HOST").filter(|h| !h.trim().is_empty()) {
            config.host = host
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("invalid HOST {host:?}: {e}")))?;
        }
        if let Some(handler) = lookup("API_MOCK_HANDLER").filter(|h| !h.trim().is_empty()) {
            config.handler = handler.trim().to_string();
        }

        Ok(config)
    }

    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
