/// Stage the REST API is deployed to.
pub const API_STAGE_NAME: &str = "prod";

/// Invoke URL of a deployed REST API stage, with trailing slash.
///
/// Only known once the API has been provisioned, which is why assets are
/// substituted at deploy time.
#[must_use]
pub fn resolve_api_url(rest_api_id: &str, region: &str) -> String {
    format!("https://{rest_api_id}.execute-api.{region}.amazonaws.com/{API_STAGE_NAME}/")
}
