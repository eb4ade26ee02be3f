//! Barbican secret creation

use crate::http::HttpClient;
use crate::openstack::{OpenStackError, Result, Session};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct SecretResponse {
    secret_ref: String,
}

/// Barbican key-manager client bound to one authenticated session
#[derive(Clone)]
pub struct BarbicanClient {
    client: HttpClient,
    endpoint: String,
    token: String,
}

impl BarbicanClient {
    /// Build a client from an authenticated Keystone session
    pub fn new(client: HttpClient, session: &Session) -> Self {
        Self {
            client,
            endpoint: session.key_manager_endpoint.clone(),
            token: session.token.clone(),
        }
    }

    /// Create and store a symmetric secret, returning its identifier.
    ///
    /// The payload is stored base64-encoded as an AES key of
    /// `payload.len() * 8` bits. The identifier is extracted from the
    /// `secret_ref` URL in the response.
    pub async fn create_secret(&self, name: &str, payload: &[u8]) -> Result<String> {
        let encoded =
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, payload);

        let body = json!({
            "name": name,
            "payload": encoded,
            "payload_content_type": "application/octet-stream",
            "payload_content_encoding": "base64",
            "secret_type": "symmetric",
            "algorithm": "aes",
            "bit_length": payload.len() * 8,
        });

        let url = format!("{}/v1/secrets", self.endpoint);
        let json_bytes = serde_json::to_vec(&body)?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(&url)
            .header("content-type", "application/json")
            .header("x-auth-token", &self.token)
            .body(Full::new(Bytes::from(json_bytes)))?;

        let response = self.client.request(request).await?;
        let status = response.status();
        let body_bytes = response
            .collect()
            .await
            .map_err(|e| OpenStackError::InvalidResponse(format!("Body error: {}", e)))?
            .to_bytes();

        if !status.is_success() {
            let message = String::from_utf8_lossy(&body_bytes).to_string();
            return Err(OpenStackError::Api { status, message });
        }

        let created: SecretResponse = serde_json::from_slice(&body_bytes)?;
        parse_secret_ref(&created.secret_ref)
    }
}

/// Extract the secret identifier from a reference URL of the form
/// `.../v1/secrets/<hex-or-dash-id>`.
///
/// A reference that does not match the pattern is an error, never silently
/// ignored.
pub fn parse_secret_ref(secret_ref: &str) -> Result<String> {
    let trimmed = secret_ref.trim_end_matches('/');
    let (prefix, id) = match trimmed.rsplit_once('/') {
        Some(parts) => parts,
        None => return Err(OpenStackError::BadSecretRef(secret_ref.to_string())),
    };

    let well_formed = prefix.ends_with("/v1/secrets")
        && !id.is_empty()
        && id.bytes().all(|b| b.is_ascii_hexdigit() || b == b'-');

    if !well_formed {
        return Err(OpenStackError::BadSecretRef(secret_ref.to_string()));
    }

    Ok(id.to_string())
}
