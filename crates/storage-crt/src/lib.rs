//! AWS SDK S3 backend for rusty-buckets storage.
//!
//! This crate provides a `StorageClient` implementation using the AWS SDK for Rust,
//! plus [`get_bucket_region`] for resolving where a bucket lives.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rusty_buckets_storage_crt::CrtStorageClient;
//! use rusty_buckets_storage::{BucketClient, StorageSettings};
//!
//! let settings = StorageSettings::default();
//! let client = CrtStorageClient::new(settings).await?;
//!
//! let bucket = BucketClient::new(Arc::new(client), "my-bucket");
//! bucket.put_string("hello", "greetings/hello.txt").await?;
//! ```

mod client;
mod error;
mod region;

pub use client::CrtStorageClient;
pub use error::CrtError;
pub use region::get_bucket_region;
