//! Shared error types used across rusty-buckets crates.

use thiserror::Error;

/// S3 path errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Path is not a valid `s3://bucket/key` path.
    #[error("{path} is not a valid s3 path (e.g. s3://bucket/key)")]
    InvalidS3Path {
        /// The invalid path.
        path: String,
    },

    /// Path is not a valid `s3a://bucket/key` path.
    #[error("{path} is not a valid s3a path (e.g. s3a://bucket/key)")]
    InvalidS3aPath {
        /// The invalid path.
        path: String,
    },

    /// Path points into a different bucket than the client is scoped to.
    ///
    /// This indicates a programming error in the caller rather than a
    /// recoverable condition.
    #[error("bucket of S3 path {path} does not match client bucket ({bucket})")]
    BucketMismatch {
        /// The offending path.
        path: String,
        /// The client's bucket.
        bucket: String,
    },
}

impl PathError {
    /// Return the path this error refers to.
    pub fn path(&self) -> &str {
        match self {
            PathError::InvalidS3Path { path }
            | PathError::InvalidS3aPath { path }
            | PathError::BucketMismatch { path, .. } => path,
        }
    }
}
