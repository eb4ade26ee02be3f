//! rgw-bench - benchmark tooling for S3-compatible object stores
//!
//! Two utilities built on one shared fan-out pattern:
//! - `lister`: concurrently enumerate object keys across a set of buckets
//! - `preparer`: concurrently provision SSE-KMS encrypted buckets backed by
//!   Barbican-managed keys

pub mod cli;
pub mod config;
pub mod fanout;
pub mod http;
pub mod openstack;
pub mod s3;

pub use config::Config;
