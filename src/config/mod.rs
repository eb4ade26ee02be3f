use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// S3 endpoint and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Base URL of the S3-compatible endpoint
    pub base_url: String,

    /// Access key ID
    pub access_key: String,

    /// Secret access key
    pub secret_key: String,
}

/// OpenStack identity credentials for Keystone password auth
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenStackConfig {
    /// Keystone v3 base URL (e.g. http://host/identity/v3)
    pub auth_url: String,

    /// Username for password auth
    pub username: String,

    /// Password for password auth
    pub password: String,

    /// Project name the token is scoped to
    pub project: String,
}

/// Main configuration structure
///
/// All options come from environment variables (see `load_from_env`); the
/// struct is passed explicitly into components at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// S3 endpoint settings
    pub s3: S3Config,

    /// Keystone credentials (preparer only)
    pub openstack: OpenStackConfig,

    /// Per-bucket cap on the number of keys the lister enumerates
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,

    /// Concurrent provisioning tasks in the preparer
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_list_limit() -> usize {
    2_000_000
}

fn default_concurrency() -> usize {
    5
}

fn default_s3_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_auth_url() -> String {
    "http://10.17.4.101/identity/v3".to_string()
}

/// Load configuration from environment variables
///
/// Recognized variables and defaults:
/// - `S3_BASEURL` (default http://localhost:8000)
/// - `S3_ACCESS_KEY` / `S3_SECRET_KEY` (default empty)
/// - `S3_LIST_LIMIT` (default 2000000)
/// - `OPENSTACK_BASE_URL` (default http://10.17.4.101/identity/v3)
/// - `AUTH_USERNAME` / `AUTH_PASSWORD` (default rgw/rgw)
/// - `AUTH_PROJECT` (default rgw-sse-kms-test)
/// - `CONCURRENCY` (default 5)
pub fn load_from_env() -> Result<Config> {
    // Try to load .env file if it exists (don't fail if it doesn't)
    let _ = dotenvy::dotenv();

    let s3 = S3Config {
        base_url: std::env::var("S3_BASEURL").unwrap_or_else(|_| default_s3_base_url()),
        access_key: std::env::var("S3_ACCESS_KEY").unwrap_or_default(),
        secret_key: std::env::var("S3_SECRET_KEY").unwrap_or_default(),
    };

    let openstack = OpenStackConfig {
        auth_url: std::env::var("OPENSTACK_BASE_URL").unwrap_or_else(|_| default_auth_url()),
        username: std::env::var("AUTH_USERNAME").unwrap_or_else(|_| "rgw".to_string()),
        password: std::env::var("AUTH_PASSWORD").unwrap_or_else(|_| "rgw".to_string()),
        project: std::env::var("AUTH_PROJECT").unwrap_or_else(|_| "rgw-sse-kms-test".to_string()),
    };

    let list_limit = match std::env::var("S3_LIST_LIMIT") {
        Ok(raw) => raw
            .parse()
            .context("S3_LIST_LIMIT is not a valid number")?,
        Err(_) => default_list_limit(),
    };

    let concurrency = match std::env::var("CONCURRENCY") {
        Ok(raw) => raw.parse().context("CONCURRENCY is not a valid number")?,
        Err(_) => default_concurrency(),
    };

    Ok(Config {
        s3,
        openstack,
        list_limit,
        concurrency,
    })
}
