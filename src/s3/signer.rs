//! AWS Signature Version 4 signing for S3 requests

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

/// Hex lookup table for percent encoding
static HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// SHA256 of the empty payload, pre-computed for bodyless requests
const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// AWS Signature Version 4 signer for the `s3` service
#[derive(Clone)]
pub struct SigV4Signer {
    access_key: String,
    region: String,
    /// Pre-computed "AWS4" + secret_key bytes used as the key-derivation root
    aws4_key: Vec<u8>,
}

impl SigV4Signer {
    pub fn new(access_key: String, secret_key: String, region: Option<String>) -> Self {
        let region = region.unwrap_or_else(|| "us-east-1".to_string());
        let aws4_key = format!("AWS4{}", secret_key).into_bytes();
        Self {
            access_key,
            region,
            aws4_key,
        }
    }

    /// Sign a request, returning the full header map to send.
    ///
    /// Input header keys must already be lowercase; `host`, `x-amz-date`,
    /// `x-amz-content-sha256` and `authorization` are added here.
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        mut headers: BTreeMap<String, String>,
        payload: &[u8],
    ) -> BTreeMap<String, String> {
        let payload_hash = if payload.is_empty() {
            EMPTY_SHA256.to_string()
        } else {
            hex::encode(Sha256::digest(payload))
        };

        let (host, path, query) = Self::split_url(url);

        let now = Utc::now();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date_stamp = now.format("%Y%m%d").to_string();

        headers.insert("host".to_string(), host.to_string());
        headers.insert("x-amz-date".to_string(), amz_date.clone());
        headers.insert("x-amz-content-sha256".to_string(), payload_hash.clone());

        let canonical_query = Self::canonical_query_string(query);

        // BTreeMap keeps headers sorted; keys are lowercase by construction
        let mut canonical_headers = String::with_capacity(headers.len() * 64);
        for (k, v) in &headers {
            canonical_headers.push_str(k);
            canonical_headers.push(':');
            canonical_headers.push_str(v.trim());
            canonical_headers.push('\n');
        }
        let signed_headers = headers.keys().cloned().collect::<Vec<_>>().join(";");

        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            method, path, canonical_query, canonical_headers, signed_headers, payload_hash
        );

        let credential_scope = format!("{}/{}/s3/aws4_request", date_stamp, self.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date,
            credential_scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let signing_key = self.derive_signing_key(&date_stamp);
        let signature = hex::encode(Self::hmac_sha256(&signing_key, string_to_sign.as_bytes()));

        let authorization = format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            self.access_key, credential_scope, signed_headers, signature
        );
        headers.insert("authorization".to_string(), authorization);

        headers
    }

    /// Split a URL into (host, path, query) slices without allocating.
    ///
    /// Default ports (:80 / :443) are stripped from the host to match the
    /// Host header the HTTP client will send.
    fn split_url(url: &str) -> (&str, &str, &str) {
        let after_scheme = if let Some(rest) = url.strip_prefix("https://") {
            rest
        } else if let Some(rest) = url.strip_prefix("http://") {
            rest
        } else {
            url
        };

        let (authority, path_and_query) = match after_scheme.find('/') {
            Some(pos) => (&after_scheme[..pos], &after_scheme[pos..]),
            None => (after_scheme, "/"),
        };

        let (path, query) = match path_and_query.find('?') {
            Some(pos) => (&path_and_query[..pos], &path_and_query[pos + 1..]),
            None => (path_and_query, ""),
        };

        let host = if url.starts_with("https") {
            authority.strip_suffix(":443").unwrap_or(authority)
        } else {
            authority.strip_suffix(":80").unwrap_or(authority)
        };

        (host, path, query)
    }

    /// Canonical query string: decode, re-encode RFC 3986, sort by key.
    /// Valueless parameters (like `?encryption`) normalize to `param=`.
    fn canonical_query_string(query: &str) -> String {
        if query.is_empty() {
            return String::new();
        }

        let mut params: Vec<(String, String)> = Vec::new();
        for pair in query.split('&') {
            if let Some(pos) = pair.find('=') {
                let key = &pair[..pos];
                let value = &pair[pos + 1..];
                let decoded_key = urlencoding::decode(key).unwrap_or_else(|_| key.into());
                let decoded_value = urlencoding::decode(value).unwrap_or_else(|_| value.into());
                params.push((
                    Self::uri_encode(&decoded_key),
                    Self::uri_encode(&decoded_value),
                ));
            } else {
                let decoded = urlencoding::decode(pair).unwrap_or_else(|_| pair.into());
                params.push((Self::uri_encode(&decoded), String::new()));
            }
        }

        params.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Derive the signing key for a date (4 chained HMAC operations)
    fn derive_signing_key(&self, date_stamp: &str) -> [u8; 32] {
        let k_date = Self::hmac_sha256(&self.aws4_key, date_stamp.as_bytes());
        let k_region = Self::hmac_sha256(&k_date, self.region.as_bytes());
        let k_service = Self::hmac_sha256(&k_region, b"s3");
        Self::hmac_sha256(&k_service, b"aws4_request")
    }

    fn hmac_sha256(key: &[u8], msg: &[u8]) -> [u8; 32] {
        let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
        mac.update(msg);
        let result = mac.finalize().into_bytes();
        let mut output = [0u8; 32];
        output.copy_from_slice(&result);
        output
    }

    /// URI encode a string (RFC 3986, slash encoded)
    fn uri_encode(s: &str) -> String {
        let mut result = String::with_capacity(s.len() + 16);
        for byte in s.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    result.push(byte as char);
                }
                _ => {
                    result.push('%');
                    result.push(HEX_UPPER[(byte >> 4) as usize] as char);
                    result.push(HEX_UPPER[(byte & 0xf) as usize] as char);
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_encode() {
        assert_eq!(SigV4Signer::uri_encode("hello world"), "hello%20world");
        assert_eq!(SigV4Signer::uri_encode("hello/world"), "hello%2Fworld");
        assert_eq!(
            SigV4Signer::uri_encode("test@example.com"),
            "test%40example.com"
        );
    }

    #[test]
    fn test_canonical_query_string() {
        assert_eq!(SigV4Signer::canonical_query_string(""), "");
        assert_eq!(
            SigV4Signer::canonical_query_string("key=value"),
            "key=value"
        );
        assert_eq!(
            SigV4Signer::canonical_query_string("zebra=1&alpha=2"),
            "alpha=2&zebra=1"
        );
        // Valueless param normalizes to "param="
        assert_eq!(
            SigV4Signer::canonical_query_string("encryption"),
            "encryption="
        );
    }

    #[test]
    fn test_split_url() {
        let (host, path, query) = SigV4Signer::split_url("http://localhost:8000/bucket/?encryption");
        assert_eq!(host, "localhost:8000");
        assert_eq!(path, "/bucket/");
        assert_eq!(query, "encryption");

        let (host, path, query) = SigV4Signer::split_url("https://s3.example.com:443/b");
        assert_eq!(host, "s3.example.com");
        assert_eq!(path, "/b");
        assert_eq!(query, "");
    }

    #[test]
    fn test_empty_sha256_constant() {
        let computed = hex::encode(Sha256::digest(b""));
        assert_eq!(EMPTY_SHA256, computed);
    }

    #[test]
    fn test_signing_key_deterministic() {
        let signer = SigV4Signer::new("access".to_string(), "secret".to_string(), None);
        let k1 = signer.derive_signing_key("20260101");
        let k2 = signer.derive_signing_key("20260101");
        let k3 = signer.derive_signing_key("20260102");
        assert_eq!(k1, k2);
        assert_ne!(k1, k3);
    }
}
