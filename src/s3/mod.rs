//! S3 client module with AWS SigV4 signing
//!
//! Covers the operations the benchmark tools consume: paginated object
//! listing, bucket creation and default-encryption configuration.

pub mod client;
pub mod signer;
pub mod types;

pub use client::{Result, S3Client, S3Error};
pub use signer::SigV4Signer;
pub use types::{EncryptionRule, ListObjectsPage};
