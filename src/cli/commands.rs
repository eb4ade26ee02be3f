//! Command bodies for the lister and preparer binaries

use crate::cli::split_buckets;
use crate::config::Config;
use crate::fanout::fan_out;
use crate::http;
use crate::openstack::{BarbicanClient, IdentityClient};
use crate::s3::{EncryptionRule, S3Client};
use anyhow::{bail, Result};
use rand::RngCore;
use tracing::{debug, info};
use uuid::Uuid;

/// Name prefix for Barbican secrets created by the preparer
const SECRET_PREFIX: &str = "rgw-sse-kms-test";

/// Name prefix for buckets created by the preparer
const BUCKET_PREFIX: &str = "rgw-sse-kms-test";

/// List all object keys across the named buckets as `(bucket, key)` pairs.
///
/// One listing task runs per bucket; pairs land in task completion order.
/// Any per-bucket failure aborts the whole run.
pub async fn list_buckets(config: &Config, raw_buckets: &str) -> Result<Vec<(String, String)>> {
    let buckets = split_buckets(raw_buckets);
    if buckets.is_empty() {
        bail!("no bucket names in {:?}", raw_buckets);
    }

    let client = S3Client::new(
        http::build_client(),
        config.s3.base_url.clone(),
        config.s3.access_key.clone(),
        config.s3.secret_key.clone(),
    );

    let limit = config.list_limit;
    let concurrency = buckets.len();
    debug!(buckets = concurrency, limit, "listing buckets");

    let per_bucket = fan_out(buckets, concurrency, |bucket| {
        let client = client.clone();
        async move {
            let keys = client.list_all_keys(&bucket, limit).await?;
            debug!(bucket = %bucket, keys = keys.len(), "bucket listed");
            Ok::<_, crate::s3::S3Error>(
                keys.into_iter()
                    .map(|key| (bucket.clone(), key))
                    .collect::<Vec<_>>(),
            )
        }
    })
    .await?;

    Ok(per_bucket.into_iter().flatten().collect())
}

/// List across buckets and print one JSON array of `[bucket, key]` pairs
/// to stdout.
pub async fn cmd_list(config: &Config, raw_buckets: &str) -> Result<()> {
    let pairs = list_buckets(config, raw_buckets).await?;
    println!("{}", serde_json::to_string(&pairs)?);
    Ok(())
}

/// Provision `n` buckets, each with a fresh 256-bit Barbican secret bound
/// as its default SSE-KMS key, returning the bucket names.
///
/// Tasks run with the configured concurrency; each task authenticates,
/// creates its secret, creates its bucket and applies the encryption rule.
pub async fn provision_buckets(config: &Config, n: usize) -> Result<Vec<String>> {
    let http_client = http::build_client();

    let s3 = S3Client::new(
        http_client.clone(),
        config.s3.base_url.clone(),
        config.s3.access_key.clone(),
        config.s3.secret_key.clone(),
    );
    let identity = IdentityClient::new(http_client.clone(), config.openstack.auth_url.clone());

    debug!(count = n, concurrency = config.concurrency, "provisioning buckets");

    let buckets = fan_out(0..n, config.concurrency, |_| {
        let s3 = s3.clone();
        let identity = identity.clone();
        let http_client = http_client.clone();
        let openstack = config.openstack.clone();
        async move {
            let session = identity
                .authenticate(&openstack.username, &openstack.password, &openstack.project)
                .await?;
            let barbican = BarbicanClient::new(http_client, &session);

            let mut payload = [0u8; 32];
            rand::thread_rng().fill_bytes(&mut payload);
            let secret_name = format!("{}_{}", SECRET_PREFIX, Uuid::new_v4());
            let key_id = barbican.create_secret(&secret_name, &payload).await?;

            let bucket = format!("{}-{}", BUCKET_PREFIX, Uuid::new_v4());
            s3.create_bucket(&bucket).await?;
            s3.put_bucket_encryption(&bucket, &EncryptionRule::sse_kms(&key_id))
                .await?;

            info!(bucket = %bucket, key_id = %key_id, "bucket provisioned");
            Ok::<_, anyhow::Error>(bucket)
        }
    })
    .await?;

    Ok(buckets)
}

/// Provision `n` buckets and print the names one per line to stdout.
pub async fn cmd_prepare(config: &Config, n: usize) -> Result<()> {
    let buckets = provision_buckets(config, n).await?;
    for bucket in &buckets {
        println!("{}", bucket);
    }
    Ok(())
}
