//! Keystone v3 password authentication

use crate::http::HttpClient;
use crate::openstack::{OpenStackError, Result};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request};
use serde::Deserialize;
use serde_json::json;

/// An authenticated Keystone session
#[derive(Debug, Clone)]
pub struct Session {
    /// Scoped token for X-Auth-Token headers
    pub token: String,
    /// Public key-manager (Barbican) endpoint from the service catalog
    pub key_manager_endpoint: String,
}

#[derive(Deserialize)]
struct AuthResponse {
    token: TokenBody,
}

#[derive(Deserialize)]
struct TokenBody {
    #[serde(default)]
    catalog: Vec<CatalogEntry>,
}

#[derive(Deserialize)]
struct CatalogEntry {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    endpoints: Vec<Endpoint>,
}

#[derive(Deserialize)]
struct Endpoint {
    interface: String,
    url: String,
}

/// Keystone v3 identity client
#[derive(Clone)]
pub struct IdentityClient {
    client: HttpClient,
    auth_url: String,
}

impl IdentityClient {
    pub fn new(client: HttpClient, auth_url: String) -> Self {
        let auth_url = auth_url.trim_end_matches('/').to_string();
        Self { client, auth_url }
    }

    /// Issue a project-scoped token via password auth.
    ///
    /// User and project domains are both "Default". The token comes from the
    /// X-Subject-Token response header; the Barbican endpoint is resolved
    /// from the catalog in the response body.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        project: &str,
    ) -> Result<Session> {
        let body = json!({
            "auth": {
                "identity": {
                    "methods": ["password"],
                    "password": {
                        "user": {
                            "name": username,
                            "domain": { "name": "Default" },
                            "password": password,
                        }
                    }
                },
                "scope": {
                    "project": {
                        "name": project,
                        "domain": { "name": "Default" },
                    }
                }
            }
        });

        let url = format!("{}/auth/tokens", self.auth_url);
        let payload = serde_json::to_vec(&body)?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(&url)
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(payload)))?;

        let response = self.client.request(request).await?;
        let status = response.status();

        let token = response
            .headers()
            .get("x-subject-token")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body_bytes = response
            .collect()
            .await
            .map_err(|e| OpenStackError::InvalidResponse(format!("Body error: {}", e)))?
            .to_bytes();

        if !status.is_success() {
            let message = String::from_utf8_lossy(&body_bytes).to_string();
            return Err(OpenStackError::AuthFailed { status, message });
        }

        let token = token.ok_or(OpenStackError::MissingToken)?;

        let auth: AuthResponse = serde_json::from_slice(&body_bytes)?;
        let key_manager_endpoint = key_manager_endpoint(&auth.token.catalog)
            .ok_or(OpenStackError::NoKeyManagerEndpoint)?;

        tracing::debug!(endpoint = %key_manager_endpoint, "keystone auth issued");

        Ok(Session {
            token,
            key_manager_endpoint,
        })
    }
}

/// Find the public key-manager endpoint in a service catalog
fn key_manager_endpoint(catalog: &[CatalogEntry]) -> Option<String> {
    catalog
        .iter()
        .filter(|entry| entry.service_type == "key-manager")
        .flat_map(|entry| entry.endpoints.iter())
        .find(|ep| ep.interface == "public")
        .map(|ep| ep.url.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_catalog(json: &str) -> Vec<CatalogEntry> {
        let auth: AuthResponse = serde_json::from_str(json).unwrap();
        auth.token.catalog
    }

    #[test]
    fn test_key_manager_endpoint_found() {
        let catalog = parse_catalog(
            r#"{"token":{"catalog":[
                {"type":"identity","endpoints":[{"interface":"public","url":"http://id"}]},
                {"type":"key-manager","endpoints":[
                    {"interface":"admin","url":"http://km-admin"},
                    {"interface":"public","url":"http://km:9311/"}
                ]}
            ]}}"#,
        );
        assert_eq!(
            key_manager_endpoint(&catalog).as_deref(),
            Some("http://km:9311")
        );
    }

    #[test]
    fn test_key_manager_endpoint_missing() {
        let catalog = parse_catalog(
            r#"{"token":{"catalog":[
                {"type":"object-store","endpoints":[{"interface":"public","url":"http://s3"}]}
            ]}}"#,
        );
        assert!(key_manager_endpoint(&catalog).is_none());
    }

    #[test]
    fn test_catalog_defaults_to_empty() {
        let catalog = parse_catalog(r#"{"token":{}}"#);
        assert!(catalog.is_empty());
        assert!(key_manager_endpoint(&catalog).is_none());
    }
}
