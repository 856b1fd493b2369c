//! Bucket-scoped object operations.
//!
//! `BucketClient` binds a `StorageClient` to a single bucket and offers
//! path helpers, existence checks, typed uploads and downloads, prefix
//! listing and bulk deletion on top of it. Every error is annotated with
//! the key, prefix or path involved before it is returned.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rusty_buckets_storage::{BucketClient, MemoryStorageClient};
//!
//! let store = Arc::new(MemoryStorageClient::with_bucket("my-bucket", "us-west-2"));
//! let bucket = BucketClient::new(store, "my-bucket");
//! bucket.put_json(&spec, "apis/api.json").await?;
//! assert!(bucket.object_exists(&["apis/api.json"]).await?.exists());
//! ```

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use rusty_buckets_common::{
    ensure_suffix, run_first_err, split_s3_path, to_s3_path, PathError, DELETE_PAGE_SIZE,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec;
use crate::error::StorageError;
use crate::traits::{ListPage, ObjectInfo, StorageClient};
use crate::types::Existence;

/// Object operations scoped to one bucket.
pub struct BucketClient<C: StorageClient> {
    /// The storage client for S3 operations.
    client: Arc<C>,
    /// Bucket every operation targets.
    bucket: String,
}

impl<C: StorageClient> Clone for BucketClient<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            bucket: self.bucket.clone(),
        }
    }
}

impl<C: StorageClient> BucketClient<C> {
    /// Create a client for `bucket`.
    ///
    /// # Arguments
    /// * `client` - Storage client for S3 operations
    /// * `bucket` - Bucket name
    pub fn new(client: Arc<C>, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// The bucket this client is scoped to.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The underlying storage client.
    pub fn storage(&self) -> &C {
        &self.client
    }

    // ------------------------------------------------------------------
    // Paths
    // ------------------------------------------------------------------

    /// Canonical `s3://` path of a key in this bucket.
    pub fn to_path(&self, key: &str) -> String {
        to_s3_path(&self.bucket, key)
    }

    /// Convert canonical paths into keys of this bucket.
    ///
    /// # Arguments
    /// * `paths` - `s3://bucket/key` paths
    ///
    /// # Returns
    /// The keys, in input order.
    ///
    /// # Errors
    /// Returns `PathError::InvalidS3Path` for malformed paths and
    /// `PathError::BucketMismatch` for paths into another bucket.
    pub fn extract_prefixes<S: AsRef<str>>(&self, paths: &[S]) -> Result<Vec<String>, StorageError> {
        paths
            .iter()
            .map(|path| -> Result<String, StorageError> {
                let path: &str = path.as_ref();
                let (bucket, key) = split_s3_path(path)?;
                if bucket != self.bucket {
                    return Err(PathError::BucketMismatch {
                        path: path.to_string(),
                        bucket: self.bucket.clone(),
                    }
                    .into());
                }
                Ok(key)
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Existence checks
    // ------------------------------------------------------------------

    /// Check that every key exists.
    ///
    /// Keys are checked in order with one HEAD request each. The check
    /// stops at the first missing key or the first failure.
    pub async fn object_exists<S: AsRef<str>>(&self, keys: &[S]) -> Result<Existence, StorageError> {
        for key in keys {
            let key: &str = key.as_ref();
            log::debug!("HEAD s3://{}/{}", self.bucket, key);
            let size: Option<u64> = self
                .client
                .head_object(&self.bucket, key)
                .await
                .map_err(|e| e.wrap(key))?;
            if size.is_none() {
                return Ok(Existence::Absent);
            }
        }
        Ok(Existence::Exists)
    }

    /// Check that at least one object exists under every prefix.
    ///
    /// Prefixes are checked in order with one list request each. The check
    /// stops at the first empty prefix or the first failure.
    pub async fn prefix_exists<S: AsRef<str>>(
        &self,
        prefixes: &[S],
    ) -> Result<Existence, StorageError> {
        for prefix in prefixes {
            let prefix: &str = prefix.as_ref();
            log::debug!("LIST s3://{}/{}", self.bucket, prefix);
            let page: ListPage = self
                .client
                .list_objects_page(&self.bucket, prefix, None, None)
                .await
                .map_err(|e| e.wrap(prefix))?;
            if page.objects.is_empty() {
                return Ok(Existence::Absent);
            }
        }
        Ok(Existence::Exists)
    }

    /// Check that every directory has at least one object in it.
    ///
    /// A trailing `/` is added to each directory before the prefix check.
    pub async fn dir_exists<S: AsRef<str>>(&self, dirs: &[S]) -> Result<Existence, StorageError> {
        let prefixes: Vec<String> = dirs.iter().map(|d| ensure_suffix(d.as_ref(), "/")).collect();
        self.prefix_exists(&prefixes).await
    }

    /// [`object_exists`](Self::object_exists) for canonical paths.
    pub async fn path_is_object<S: AsRef<str>>(&self, paths: &[S]) -> Result<Existence, StorageError> {
        let keys: Vec<String> = self.extract_prefixes(paths)?;
        self.object_exists(&keys).await
    }

    /// [`prefix_exists`](Self::prefix_exists) for canonical paths.
    pub async fn path_is_prefix<S: AsRef<str>>(&self, paths: &[S]) -> Result<Existence, StorageError> {
        let prefixes: Vec<String> = self.extract_prefixes(paths)?;
        self.prefix_exists(&prefixes).await
    }

    /// Directory check for canonical paths.
    ///
    /// The path is used as given; include the trailing `/` to restrict the
    /// match to a directory.
    pub async fn path_is_dir<S: AsRef<str>>(&self, paths: &[S]) -> Result<Existence, StorageError> {
        let dirs: Vec<String> = self.extract_prefixes(paths)?;
        self.prefix_exists(&dirs).await
    }

    // ------------------------------------------------------------------
    // Uploads
    // ------------------------------------------------------------------

    /// Upload bytes to a key.
    pub async fn put_bytes(&self, data: &[u8], key: &str) -> Result<(), StorageError> {
        log::debug!("PUT s3://{}/{} ({} bytes)", self.bucket, key, data.len());
        self.client
            .put_object(&self.bucket, key, data)
            .await
            .map_err(|e| e.wrap(key))
    }

    /// Upload the same bytes to several keys concurrently.
    ///
    /// Returns the first failure. Uploads still in flight at that point are
    /// abandoned, and some keys may already have been written: there is no
    /// rollback and no report of which keys succeeded.
    pub async fn put_bytes_multi<S: AsRef<str>>(
        &self,
        data: &[u8],
        keys: &[S],
    ) -> Result<(), StorageError> {
        run_first_err(keys.iter().map(|key| self.put_bytes(data, key.as_ref()))).await
    }

    /// Read a local file fully into memory and upload it.
    pub async fn put_file(&self, file_path: impl AsRef<Path>, key: &str) -> Result<(), StorageError> {
        let file_path: &Path = file_path.as_ref();
        let data: Vec<u8> = tokio::fs::read(file_path)
            .await
            .map_err(|e| StorageError::IoError {
                path: file_path.display().to_string(),
                message: e.to_string(),
            })?;
        self.put_bytes(&data, key).await
    }

    /// Upload the unread remainder of a buffer.
    pub async fn put_buffer(&self, buffer: &Cursor<Vec<u8>>, key: &str) -> Result<(), StorageError> {
        let data: &[u8] = buffer.get_ref();
        let start: usize = usize::try_from(buffer.position())
            .unwrap_or(usize::MAX)
            .min(data.len());
        self.put_bytes(&data[start..], key).await
    }

    /// Upload a string with surrounding whitespace trimmed.
    pub async fn put_string(&self, s: &str, key: &str) -> Result<(), StorageError> {
        self.put_bytes(s.trim().as_bytes(), key).await
    }

    /// Serialize a value as JSON and upload it.
    pub async fn put_json<T: Serialize + ?Sized>(&self, value: &T, key: &str) -> Result<(), StorageError> {
        let data: Vec<u8> = codec::to_json(value, key)?;
        self.put_bytes(&data, key).await
    }

    /// Serialize a value as MessagePack and upload it.
    pub async fn put_msgpack<T: Serialize + ?Sized>(
        &self,
        value: &T,
        key: &str,
    ) -> Result<(), StorageError> {
        let data: Vec<u8> = codec::to_msgpack(value, key)?;
        self.put_bytes(&data, key).await
    }

    // ------------------------------------------------------------------
    // Downloads
    // ------------------------------------------------------------------

    /// Download an object fully into memory.
    ///
    /// A missing object is an error here, unlike in the existence checks.
    pub async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        log::debug!("GET s3://{}/{}", self.bucket, key);
        self.client
            .get_object(&self.bucket, key)
            .await
            .map_err(|e| e.wrap(key))
    }

    /// Download an object as UTF-8 text.
    pub async fn get_string(&self, key: &str) -> Result<String, StorageError> {
        let data: Vec<u8> = self.get_bytes(key).await?;
        String::from_utf8(data).map_err(|e| StorageError::Serialization {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// Download an object and decode it as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<T, StorageError> {
        let data: Vec<u8> = self.get_bytes(key).await?;
        codec::from_json(&data, key)
    }

    /// Download an object and decode it as MessagePack.
    pub async fn get_msgpack<T: DeserializeOwned>(&self, key: &str) -> Result<T, StorageError> {
        let data: Vec<u8> = self.get_bytes(key).await?;
        codec::from_msgpack(&data, key)
    }

    // ------------------------------------------------------------------
    // Listing and deletion
    // ------------------------------------------------------------------

    /// List up to `max_results` objects under a prefix.
    ///
    /// Only a single page is fetched and the order is whatever the store
    /// returns.
    pub async fn list_prefix(
        &self,
        prefix: &str,
        max_results: i32,
    ) -> Result<Vec<ObjectInfo>, StorageError> {
        log::debug!("LIST s3://{}/{} (max {})", self.bucket, prefix, max_results);
        let page: ListPage = self
            .client
            .list_objects_page(&self.bucket, prefix, Some(max_results), None)
            .await
            .map_err(|e| e.wrap(prefix))?;
        Ok(page.objects)
    }

    /// Delete every object under a prefix.
    ///
    /// Objects are listed in pages of `DELETE_PAGE_SIZE` and each page is
    /// removed with one quiet batch delete. When a batch fails and
    /// `continue_on_failure` is false, deletion stops and that error is
    /// returned. Otherwise the remaining pages are still processed and the
    /// error of the last failing page is returned; earlier page failures
    /// are only logged.
    pub async fn delete_by_prefix(
        &self,
        prefix: &str,
        continue_on_failure: bool,
    ) -> Result<(), StorageError> {
        let mut delete_err: Option<StorageError> = None;
        let mut list_err: Option<StorageError> = None;
        let mut continuation_token: Option<String> = None;
        let mut deleted: usize = 0;

        loop {
            let page: ListPage = match self
                .client
                .list_objects_page(
                    &self.bucket,
                    prefix,
                    Some(DELETE_PAGE_SIZE),
                    continuation_token.as_deref(),
                )
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    list_err = Some(e);
                    break;
                }
            };

            let keys: Vec<String> = page.objects.into_iter().map(|o| o.key).collect();
            if !keys.is_empty() {
                match self.client.delete_objects(&self.bucket, &keys).await {
                    Ok(()) => deleted += keys.len(),
                    Err(e) => {
                        log::warn!(
                            "Batch delete of {} objects under s3://{}/{} failed: {}",
                            keys.len(),
                            self.bucket,
                            prefix,
                            e
                        );
                        delete_err = Some(e);
                        if !continue_on_failure {
                            break;
                        }
                    }
                }
            }

            match page.next_continuation_token {
                Some(token) => continuation_token = Some(token),
                None => break,
            }
        }

        log::debug!("Deleted {} objects under s3://{}/{}", deleted, self.bucket, prefix);

        match delete_err.or(list_err) {
            Some(e) => Err(e.wrap(prefix)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStorageClient;
    use serde::Deserialize;
    use tempfile::TempDir;

    const BUCKET: &str = "test-bucket";

    fn bucket_client() -> BucketClient<MemoryStorageClient> {
        let store = Arc::new(MemoryStorageClient::with_bucket(BUCKET, "us-west-2"));
        BucketClient::new(store, BUCKET)
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Deployment {
        id: String,
        files: Vec<String>,
    }

    #[test]
    fn test_to_path() {
        let client = bucket_client();
        assert_eq!(client.to_path("a/b.json"), "s3://test-bucket/a/b.json");
    }

    #[test]
    fn test_extract_prefixes() {
        let client = bucket_client();
        let keys: Vec<String> = client
            .extract_prefixes(&["s3://test-bucket/a", "s3://test-bucket/b/c/"])
            .unwrap();
        assert_eq!(keys, vec!["a".to_string(), "b/c/".to_string()]);
    }

    #[test]
    fn test_extract_prefixes_bucket_mismatch() {
        let client = bucket_client();
        let err = client
            .extract_prefixes(&["s3://test-bucket/a", "s3://other/b"])
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::Path(PathError::BucketMismatch { ref path, ref bucket })
                if path == "s3://other/b" && bucket == BUCKET
        ));
    }

    #[test]
    fn test_extract_prefixes_invalid_path() {
        let client = bucket_client();
        let err = client.extract_prefixes(&["test-bucket/a"]).unwrap_err();
        assert!(matches!(err, StorageError::Path(PathError::InvalidS3Path { .. })));
    }

    #[tokio::test]
    async fn test_object_exists() {
        let client = bucket_client();
        client.put_bytes(b"1", "k1").await.unwrap();
        client.put_bytes(b"2", "k2").await.unwrap();

        assert_eq!(client.object_exists(&["k1", "k2"]).await.unwrap(), Existence::Exists);
        assert_eq!(client.object_exists(&["k1", "k3"]).await.unwrap(), Existence::Absent);
    }

    #[tokio::test]
    async fn test_object_exists_empty_input() {
        let client = bucket_client();
        let keys: [&str; 0] = [];
        assert_eq!(client.object_exists(&keys).await.unwrap(), Existence::Exists);
    }

    #[tokio::test]
    async fn test_prefix_and_dir_exists() {
        let client = bucket_client();
        client.put_string("x", "models/v1/weights.bin").await.unwrap();

        assert!(client.prefix_exists(&["models/v"]).await.unwrap().exists());
        assert!(client.dir_exists(&["models", "models/v1/"]).await.unwrap().exists());
        assert!(!client.dir_exists(&["models/v"]).await.unwrap().exists());
        assert!(!client.prefix_exists(&["models", "data"]).await.unwrap().exists());
    }

    #[tokio::test]
    async fn test_path_checks() {
        let client = bucket_client();
        client.put_string("x", "dir/file.txt").await.unwrap();

        assert!(client
            .path_is_object(&["s3://test-bucket/dir/file.txt"])
            .await
            .unwrap()
            .exists());
        assert!(!client
            .path_is_object(&["s3://test-bucket/dir/other.txt"])
            .await
            .unwrap()
            .exists());
        assert!(client
            .path_is_prefix(&["s3://test-bucket/dir/fi"])
            .await
            .unwrap()
            .exists());
        assert!(client
            .path_is_dir(&["s3://test-bucket/dir/"])
            .await
            .unwrap()
            .exists());

        let err = client.path_is_object(&["s3://other/dir/file.txt"]).await.unwrap_err();
        assert!(matches!(err, StorageError::Path(PathError::BucketMismatch { .. })));
    }

    #[tokio::test]
    async fn test_put_string_trims_whitespace() {
        let client = bucket_client();
        client.put_string("  hello world \n", "greeting.txt").await.unwrap();
        assert_eq!(client.get_string("greeting.txt").await.unwrap(), "hello world");
    }

    #[tokio::test]
    async fn test_put_buffer_uploads_unread_part() {
        let client = bucket_client();
        let mut buffer: Cursor<Vec<u8>> = Cursor::new(b"headerbody".to_vec());
        buffer.set_position(6);
        client.put_buffer(&buffer, "buf").await.unwrap();
        assert_eq!(client.get_bytes("buf").await.unwrap(), b"body");
    }

    #[tokio::test]
    async fn test_put_file() {
        let temp_dir: TempDir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("upload.txt");
        std::fs::write(&file_path, "file contents").unwrap();

        let client = bucket_client();
        client.put_file(&file_path, "uploads/upload.txt").await.unwrap();
        assert_eq!(
            client.get_string("uploads/upload.txt").await.unwrap(),
            "file contents"
        );
    }

    #[tokio::test]
    async fn test_put_file_missing() {
        let temp_dir: TempDir = TempDir::new().unwrap();
        let client = bucket_client();
        let err = client
            .put_file(temp_dir.path().join("missing.txt"), "k")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::IoError { ref path, .. } if path.ends_with("missing.txt")));
        assert!(!client.object_exists(&["k"]).await.unwrap().exists());
    }

    #[tokio::test]
    async fn test_json_round_trip() {
        let client = bucket_client();
        let deployment = Deployment {
            id: "m1".to_string(),
            files: vec!["a".to_string(), "b".to_string()],
        };
        client.put_json(&deployment, "deployment.json").await.unwrap();
        let read: Deployment = client.get_json("deployment.json").await.unwrap();
        assert_eq!(read, deployment);
    }

    #[tokio::test]
    async fn test_msgpack_round_trip() {
        let client = bucket_client();
        let deployment = Deployment {
            id: "m2".to_string(),
            files: vec![],
        };
        client.put_msgpack(&deployment, "deployment.msgpack").await.unwrap();
        let read: Deployment = client.get_msgpack("deployment.msgpack").await.unwrap();
        assert_eq!(read, deployment);
    }

    #[tokio::test]
    async fn test_get_json_decode_error_carries_key() {
        let client = bucket_client();
        client.put_string("not json", "bad.json").await.unwrap();
        let err = client.get_json::<Deployment>("bad.json").await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization { ref key, .. } if key == "bad.json"));
    }

    /// Serializes to an error in every format.
    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("value cannot be encoded"))
        }
    }

    #[tokio::test]
    async fn test_put_json_encode_error_uploads_nothing() {
        let client = bucket_client();
        // JSON object keys must be strings.
        let value: std::collections::HashMap<(i32, i32), i32> =
            std::collections::HashMap::from([((1, 2), 3)]);

        let err = client.put_json(&value, "grid.json").await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization { ref key, .. } if key == "grid.json"));
        assert!(client.storage().keys(BUCKET).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_msgpack_encode_error_uploads_nothing() {
        let client = bucket_client();

        let err = client.put_msgpack(&Unencodable, "blob.msgpack").await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization { ref key, .. } if key == "blob.msgpack"));
        assert!(client.storage().keys(BUCKET).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_is_error_with_key() {
        let client = bucket_client();
        let err = client.get_bytes("missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("missing: "));
    }

    #[tokio::test]
    async fn test_get_string_rejects_invalid_utf8() {
        let client = bucket_client();
        client.put_bytes(&[0xff, 0xfe], "binary").await.unwrap();
        let err = client.get_string("binary").await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization { .. }));
    }

    #[tokio::test]
    async fn test_put_bytes_multi() {
        let client = bucket_client();
        client
            .put_bytes_multi(b"same", &["a", "b", "c"])
            .await
            .unwrap();
        for key in ["a", "b", "c"] {
            assert_eq!(client.get_bytes(key).await.unwrap(), b"same");
        }
    }

    #[tokio::test]
    async fn test_list_prefix_caps_results() {
        let client = bucket_client();
        for i in 0..5 {
            client.put_string("x", &format!("logs/{}", i)).await.unwrap();
        }
        client.put_string("x", "other/0").await.unwrap();

        let objects: Vec<ObjectInfo> = client.list_prefix("logs/", 3).await.unwrap();
        assert_eq!(objects.len(), 3);
        assert!(objects.iter().all(|o| o.key.starts_with("logs/")));
    }

    #[tokio::test]
    async fn test_delete_by_prefix_across_pages() {
        let client = bucket_client();
        for i in 0..2100 {
            client.put_bytes(b"", &format!("tmp/{:04}", i)).await.unwrap();
        }
        client.put_bytes(b"", "keep/me").await.unwrap();

        client.delete_by_prefix("tmp/", false).await.unwrap();

        assert!(!client.prefix_exists(&["tmp/"]).await.unwrap().exists());
        assert!(client.object_exists(&["keep/me"]).await.unwrap().exists());
    }

    #[tokio::test]
    async fn test_delete_by_prefix_empty() {
        let client = bucket_client();
        client.delete_by_prefix("nothing/", false).await.unwrap();
    }

    #[test]
    fn test_bucket_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BucketClient<MemoryStorageClient>>();
    }
}
