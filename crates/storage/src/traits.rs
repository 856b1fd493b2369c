//! Storage traits/interfaces for S3 operations.

use async_trait::async_trait;

use crate::error::StorageError;

/// Information about an S3 object from list operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// S3 object key.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    /// Last modified timestamp (Unix epoch seconds).
    pub last_modified: Option<i64>,
    /// ETag (usually MD5 hash for non-multipart uploads).
    pub etag: Option<String>,
}

/// One page of a ListObjectsV2 response.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    /// Objects on this page, in the order the store returned them.
    pub objects: Vec<ObjectInfo>,
    /// Token for the next page, `None` on the last page.
    pub next_continuation_token: Option<String>,
}

/// Low-level S3 operations - implemented by each backend.
///
/// Uploads always use the fixed policy from `rusty_buckets_common`
/// (private ACL, attachment disposition, AES256 server-side encryption).
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Check if an object exists and return its size.
    /// Returns None if object doesn't exist.
    async fn head_object(&self, bucket: &str, key: &str) -> Result<Option<u64>, StorageError>;

    /// Upload bytes to S3.
    async fn put_object(&self, bucket: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Download object to bytes.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    /// List a single page of objects under a prefix.
    ///
    /// `max_keys` of `None` leaves the page size to the store.
    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: &str,
        max_keys: Option<i32>,
        continuation_token: Option<&str>,
    ) -> Result<ListPage, StorageError>;

    /// Delete a batch of keys in quiet mode.
    ///
    /// Fails if the request fails or the store reports any key it could
    /// not delete.
    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), StorageError>;

    /// Look up the home region of a bucket.
    async fn bucket_region(&self, bucket: &str) -> Result<String, StorageError>;

    /// List all objects with prefix, following continuation tokens.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectInfo>, StorageError> {
        let mut objects: Vec<ObjectInfo> = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let page: ListPage = self
                .list_objects_page(bucket, prefix, None, continuation_token.as_deref())
                .await?;
            objects.extend(page.objects);

            match page.next_continuation_token {
                Some(token) => continuation_token = Some(token),
                None => break,
            }
        }

        Ok(objects)
    }
}
