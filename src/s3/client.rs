//! S3 client for the operations the benchmark tools need:
//! ListObjectsV2 (paginated), CreateBucket, PutBucketEncryption.
//!
//! No retry, no backoff, no timeout: a failed or stalled remote call
//! surfaces to the caller as-is.

use crate::http::HttpClient;
use crate::s3::signer::SigV4Signer;
use crate::s3::types::{EncryptionRule, ListObjectsPage};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, StatusCode};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;
use thiserror::Error;

/// S3 client errors
#[derive(Error, Debug)]
pub enum S3Error {
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::http::Error),

    #[error("XML parse error: {0}")]
    XmlParse(String),

    #[error("S3 error: {status} - {message}")]
    S3Response { status: StatusCode, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<quick_xml::Error> for S3Error {
    fn from(err: quick_xml::Error) -> Self {
        S3Error::XmlParse(format!("XML parse error: {}", err))
    }
}

impl From<hyper_util::client::legacy::Error> for S3Error {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        S3Error::InvalidResponse(format!("Client error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, S3Error>;

/// S3 client bound to one endpoint
///
/// Clone is cheap - the underlying HTTP client uses Arc internally and
/// clones share the same connection pool, so one client can be shared
/// across concurrent tasks.
#[derive(Clone)]
pub struct S3Client {
    client: HttpClient,
    signer: SigV4Signer,
    endpoint: String,
}

impl S3Client {
    pub fn new(
        client: HttpClient,
        endpoint: String,
        access_key: String,
        secret_key: String,
    ) -> Self {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let signer = SigV4Signer::new(access_key, secret_key, None);
        Self {
            client,
            signer,
            endpoint,
        }
    }

    /// Sign and send a request, collecting the full response body.
    async fn request(
        &self,
        method: Method,
        url: &str,
        headers: BTreeMap<String, String>,
        body: Bytes,
    ) -> Result<(StatusCode, Bytes)> {
        let signed_headers = self.signer.sign(method.as_str(), url, headers, &body);

        let mut req = Request::builder().method(method).uri(url);
        for (key, value) in signed_headers.iter() {
            req = req.header(key, value);
        }
        let request = req.body(Full::new(body))?;

        let response = self.client.request(request).await?;
        let status = response.status();
        // Always drain body to return connection to pool
        let body_bytes = response
            .collect()
            .await
            .map_err(|e| S3Error::InvalidResponse(format!("Body error: {}", e)))?
            .to_bytes();

        Ok((status, body_bytes))
    }

    /// Build the URL for a ListObjectsV2 request
    fn build_list_url(
        &self,
        bucket: &str,
        max_keys: usize,
        continuation_token: Option<&str>,
    ) -> String {
        let mut url = String::with_capacity(self.endpoint.len() + bucket.len() + 96);
        url.push_str(&self.endpoint);
        url.push('/');
        url.push_str(bucket);
        url.push_str("/?");
        if let Some(token) = continuation_token {
            url.push_str("continuation-token=");
            Self::url_encode_into(&mut url, token);
            url.push('&');
        }
        url.push_str("list-type=2&max-keys=");
        let _ = write!(url, "{}", max_keys);
        url
    }

    /// Fetch one page of a bucket listing (S3 ListObjectsV2)
    pub async fn list_objects_v2(
        &self,
        bucket: &str,
        max_keys: usize,
        continuation_token: Option<&str>,
    ) -> Result<ListObjectsPage> {
        let url = self.build_list_url(bucket, max_keys, continuation_token);

        let (status, body_bytes) = self
            .request(Method::GET, &url, BTreeMap::new(), Bytes::new())
            .await?;

        if !status.is_success() {
            let message = String::from_utf8_lossy(&body_bytes).to_string();
            return Err(S3Error::S3Response { status, message });
        }

        Self::parse_list_response(&body_bytes)
    }

    /// Enumerate up to `limit` object keys in a bucket, following
    /// continuation tokens across pages.
    ///
    /// Per-page size is min(1000, remaining); enumeration stops at the limit
    /// or when the service reports no further pages.
    pub async fn list_all_keys(&self, bucket: &str, limit: usize) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;

        while keys.len() < limit {
            let page_size = (limit - keys.len()).min(1000);
            let page = self
                .list_objects_v2(bucket, page_size, token.as_deref())
                .await?;

            keys.extend(page.keys);

            if !page.is_truncated {
                break;
            }
            token = page.next_continuation_token;
            if token.is_none() {
                // Truncated response without a token would loop forever
                return Err(S3Error::InvalidResponse(
                    "truncated listing without NextContinuationToken".to_string(),
                ));
            }
        }

        keys.truncate(limit);
        Ok(keys)
    }

    /// Create a bucket (PUT bucket)
    pub async fn create_bucket(&self, bucket: &str) -> Result<()> {
        let url = format!("{}/{}", self.endpoint, bucket);

        let (status, body_bytes) = self
            .request(Method::PUT, &url, BTreeMap::new(), Bytes::new())
            .await?;

        if !status.is_success() {
            let message = String::from_utf8_lossy(&body_bytes).to_string();
            return Err(S3Error::S3Response { status, message });
        }

        Ok(())
    }

    /// Apply a default encryption rule to a bucket (PUT ?encryption)
    pub async fn put_bucket_encryption(&self, bucket: &str, rule: &EncryptionRule) -> Result<()> {
        // "?encryption=" keeps the canonical query string as "encryption="
        // which matches SigV4 expectations for valueless params
        let url = format!("{}/{}/?encryption=", self.endpoint, bucket);

        let xml_bytes = Self::build_encryption_xml(rule).into_bytes();

        let md5_hash = md5::compute(&xml_bytes);
        let md5_base64 =
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &md5_hash[..]);

        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/xml".to_string());
        headers.insert("content-length".to_string(), xml_bytes.len().to_string());
        headers.insert("content-md5".to_string(), md5_base64);

        let (status, body_bytes) = self
            .request(Method::PUT, &url, headers, Bytes::from(xml_bytes))
            .await?;

        if !status.is_success() {
            let message = String::from_utf8_lossy(&body_bytes).to_string();
            return Err(S3Error::S3Response { status, message });
        }

        Ok(())
    }

    /// Build the ServerSideEncryptionConfiguration XML body
    fn build_encryption_xml(rule: &EncryptionRule) -> String {
        let mut xml = String::with_capacity(384);
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
        xml.push_str(
            "<ServerSideEncryptionConfiguration xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">",
        );
        xml.push_str("<Rule><ApplyServerSideEncryptionByDefault><SSEAlgorithm>");
        Self::xml_escape_into(&mut xml, &rule.sse_algorithm);
        xml.push_str("</SSEAlgorithm><KMSMasterKeyID>");
        Self::xml_escape_into(&mut xml, &rule.kms_master_key_id);
        xml.push_str("</KMSMasterKeyID></ApplyServerSideEncryptionByDefault>");
        xml.push_str("<BucketKeyEnabled>");
        xml.push_str(if rule.bucket_key_enabled {
            "true"
        } else {
            "false"
        });
        xml.push_str("</BucketKeyEnabled></Rule>");
        xml.push_str("</ServerSideEncryptionConfiguration>");
        xml
    }

    /// Parse a ListBucketResult XML response
    ///
    /// Byte-slice tag matching avoids a String allocation per tag.
    fn parse_list_response(xml_data: &[u8]) -> Result<ListObjectsPage> {
        let mut reader = Reader::from_reader(xml_data);
        reader.config_mut().trim_text_start = true;
        reader.config_mut().trim_text_end = true;

        let mut page = ListObjectsPage::new();
        let mut in_contents = false;
        let mut current_text = String::with_capacity(256);

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    if e.local_name().as_ref() == b"Contents" {
                        in_contents = true;
                    }
                }
                Ok(Event::Text(e)) => {
                    current_text.clear();
                    current_text.push_str(&e.unescape()?);
                }
                Ok(Event::End(e)) => {
                    match e.local_name().as_ref() {
                        b"Key" => {
                            if in_contents {
                                page.keys.push(std::mem::take(&mut current_text));
                            }
                        }
                        b"Contents" => {
                            in_contents = false;
                        }
                        b"IsTruncated" => {
                            page.is_truncated = current_text == "true";
                        }
                        b"NextContinuationToken" => {
                            page.next_continuation_token = Some(std::mem::take(&mut current_text));
                        }
                        b"KeyCount" => {
                            page.key_count = current_text.parse().ok();
                        }
                        _ => {}
                    }
                    current_text.clear();
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(S3Error::XmlParse(format!("XML parse error: {}", e)));
                }
                _ => {}
            }
        }

        Ok(page)
    }

    /// Escape XML special characters into an existing buffer
    fn xml_escape_into(buf: &mut String, s: &str) {
        for ch in s.chars() {
            match ch {
                '&' => buf.push_str("&amp;"),
                '<' => buf.push_str("&lt;"),
                '>' => buf.push_str("&gt;"),
                '"' => buf.push_str("&quot;"),
                '\'' => buf.push_str("&apos;"),
                _ => buf.push(ch),
            }
        }
    }

    /// Encode a string for use in a URL query parameter value (RFC 3986)
    fn url_encode_into(buf: &mut String, s: &str) {
        static HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";
        for byte in s.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    buf.push(byte as char);
                }
                _ => {
                    buf.push('%');
                    buf.push(HEX_UPPER[(byte >> 4) as usize] as char);
                    buf.push(HEX_UPPER[(byte & 0xf) as usize] as char);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http;

    fn test_client() -> S3Client {
        S3Client::new(
            http::build_client(),
            "http://localhost:8000".to_string(),
            "access".to_string(),
            "secret".to_string(),
        )
    }

    #[test]
    fn test_build_list_url() {
        let client = test_client();
        assert_eq!(
            client.build_list_url("b1", 1000, None),
            "http://localhost:8000/b1/?list-type=2&max-keys=1000"
        );
        assert_eq!(
            client.build_list_url("b1", 42, Some("tok/en")),
            "http://localhost:8000/b1/?continuation-token=tok%2Fen&list-type=2&max-keys=42"
        );
    }

    #[test]
    fn test_build_encryption_xml() {
        let rule = EncryptionRule::sse_kms("abcd-1234");
        let xml = S3Client::build_encryption_xml(&rule);
        assert!(xml.contains("<SSEAlgorithm>aws:kms</SSEAlgorithm>"));
        assert!(xml.contains("<KMSMasterKeyID>abcd-1234</KMSMasterKeyID>"));
        assert!(xml.contains("<BucketKeyEnabled>true</BucketKeyEnabled>"));
    }

    #[test]
    fn test_parse_list_response() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>b1</Name>
  <KeyCount>2</KeyCount>
  <IsTruncated>true</IsTruncated>
  <NextContinuationToken>token123</NextContinuationToken>
  <Contents><Key>x</Key><Size>1</Size></Contents>
  <Contents><Key>y</Key><Size>2</Size></Contents>
</ListBucketResult>"#;

        let page = S3Client::parse_list_response(xml).unwrap();
        assert_eq!(page.keys, vec!["x".to_string(), "y".to_string()]);
        assert!(page.is_truncated);
        assert_eq!(page.next_continuation_token.as_deref(), Some("token123"));
        assert_eq!(page.key_count, Some(2));
    }

    #[test]
    fn test_parse_list_response_empty() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult><KeyCount>0</KeyCount><IsTruncated>false</IsTruncated></ListBucketResult>"#;

        let page = S3Client::parse_list_response(xml).unwrap();
        assert!(page.keys.is_empty());
        assert!(!page.is_truncated);
        assert!(page.next_continuation_token.is_none());
    }

    #[test]
    fn test_xml_escape() {
        let mut buf = String::new();
        S3Client::xml_escape_into(&mut buf, "a&b<c>");
        assert_eq!(buf, "a&amp;b&lt;c&gt;");
    }
}
