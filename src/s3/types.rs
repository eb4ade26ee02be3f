//! S3 response structures

use serde::{Deserialize, Serialize};

/// One page of a ListObjectsV2 response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListObjectsPage {
    /// Object keys in this page
    pub keys: Vec<String>,
    /// Whether more pages follow
    pub is_truncated: bool,
    /// Continuation token for the next request
    pub next_continuation_token: Option<String>,
    /// Key count reported by the service for this page
    pub key_count: Option<i32>,
}

impl ListObjectsPage {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            is_truncated: false,
            next_continuation_token: None,
            key_count: None,
        }
    }
}

impl Default for ListObjectsPage {
    fn default() -> Self {
        Self::new()
    }
}

/// Default server-side encryption rule applied to a bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptionRule {
    /// SSE algorithm (always `aws:kms` here)
    pub sse_algorithm: String,
    /// KMS key identifier the rule references
    pub kms_master_key_id: String,
    /// Bucket-key optimization flag
    pub bucket_key_enabled: bool,
}

impl EncryptionRule {
    /// SSE-KMS rule with bucket-key optimization enabled
    pub fn sse_kms(key_id: impl Into<String>) -> Self {
        Self {
            sse_algorithm: "aws:kms".to_string(),
            kms_master_key_id: key_id.into(),
            bucket_key_enabled: true,
        }
    }
}
