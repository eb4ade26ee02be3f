//! OpenStack clients: Keystone v3 password auth and Barbican secrets
//!
//! Both are thin JSON-over-HTTP clients sharing the crate's tuned hyper
//! stack. Authentication yields a scoped token plus the key-manager
//! endpoint resolved from the service catalog.

pub mod barbican;
pub mod identity;

use hyper::StatusCode;
use thiserror::Error;

/// OpenStack client errors
#[derive(Error, Debug)]
pub enum OpenStackError {
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::http::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("authentication failed: {status} - {message}")]
    AuthFailed { status: StatusCode, message: String },

    #[error("auth response is missing the X-Subject-Token header")]
    MissingToken,

    #[error("no public key-manager endpoint in the service catalog")]
    NoKeyManagerEndpoint,

    #[error("secret reference {0:?} does not match .../v1/secrets/<id>")]
    BadSecretRef(String),

    #[error("API error: {status} - {message}")]
    Api { status: StatusCode, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<hyper_util::client::legacy::Error> for OpenStackError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        OpenStackError::InvalidResponse(format!("Client error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, OpenStackError>;

pub use barbican::BarbicanClient;
pub use identity::{IdentityClient, Session};
