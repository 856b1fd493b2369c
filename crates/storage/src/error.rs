//! Error types for storage operations.

use rusty_buckets_common::PathError;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    /// Object not found in S3.
    #[error("Object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// Access denied.
    #[error("Access denied to s3://{bucket}/{key}: {message}")]
    AccessDenied {
        bucket: String,
        key: String,
        message: String,
    },

    /// Network or service error.
    #[error("Network error: {message}")]
    NetworkError { message: String, retryable: bool },

    /// Local I/O error.
    #[error("I/O error for {path}: {message}")]
    IoError { path: String, message: String },

    /// Payload could not be encoded or decoded.
    #[error("Serialization error for {key}: {message}")]
    Serialization { key: String, message: String },

    /// Bucket region lookup failed.
    #[error("bucket \"{bucket}\" is not accessible or does not exist")]
    BucketInaccessible { bucket: String },

    /// Invalid or mismatched S3 path.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// An error annotated with the key, prefix or path it occurred on.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<StorageError>,
    },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl StorageError {
    /// Annotate this error with the key, prefix or path it relates to.
    ///
    /// # Arguments
    /// * `context` - Key, prefix or path involved in the failed operation
    pub fn wrap(self, context: impl Into<String>) -> Self {
        StorageError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Return the innermost error, skipping context layers.
    pub fn root(&self) -> &StorageError {
        match self {
            StorageError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self.root() {
            StorageError::NetworkError { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// Check if this error means the object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), StorageError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_prefixes_message() {
        let err: StorageError = StorageError::NetworkError {
            message: "timeout".to_string(),
            retryable: true,
        }
        .wrap("dir/file.json");
        assert_eq!(err.to_string(), "dir/file.json: Network error: timeout");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_root_skips_nested_context() {
        let err: StorageError = StorageError::NotFound {
            bucket: "b".to_string(),
            key: "k".to_string(),
        }
        .wrap("k")
        .wrap("prefix/");
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
        assert!(matches!(err.root(), StorageError::NotFound { .. }));
    }

    #[test]
    fn test_path_error_is_transparent() {
        let err: StorageError = PathError::InvalidS3Path {
            path: "nope".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "nope is not a valid s3 path (e.g. s3://bucket/key)");
    }
}
