//! Storage abstraction for bucket-scoped S3 operations.
//!
//! This crate provides a platform-agnostic `StorageClient` trait for the
//! handful of S3 calls the workspace needs, and `BucketClient`, a facade
//! that binds a client to one bucket and adds path handling, existence
//! checks, typed uploads/downloads, listing and bulk deletion.
//!
//! Backends:
//!
//! - **CRT Backend** - `rusty-buckets-storage-crt`, built on the AWS SDK for Rust
//! - **Memory Backend** - [`MemoryStorageClient`], an in-process store
//!
//! # Region lookup
//!
//! [`get_bucket_region`] resolves a bucket's home region and hides the
//! underlying failure behind `StorageError::BucketInaccessible`.

mod bucket;
pub mod codec;
mod error;
mod memory;
mod region;
mod traits;
mod types;

pub use bucket::BucketClient;
pub use error::StorageError;
pub use memory::MemoryStorageClient;
pub use region::get_bucket_region;
pub use traits::{ListPage, ObjectInfo, StorageClient};
pub use types::{AwsCredentials, Existence, StorageSettings, DEFAULT_MAX_ATTEMPTS};
