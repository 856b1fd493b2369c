//! In-memory storage backend.
//!
//! Buckets are created explicitly and objects are kept in key order, so
//! listings behave like S3's lexicographic ListObjectsV2.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::error::StorageError;
use crate::traits::{ListPage, ObjectInfo, StorageClient};

/// Page size used when the caller does not set one (matches S3).
const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    last_modified: i64,
}

#[derive(Debug, Default)]
struct MemoryBucket {
    region: String,
    objects: BTreeMap<String, StoredObject>,
}

impl MemoryBucket {
    fn new(region: &str) -> Self {
        Self {
            region: region.to_string(),
            objects: BTreeMap::new(),
        }
    }
}

/// `StorageClient` that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorageClient {
    buckets: RwLock<HashMap<String, MemoryBucket>>,
}

impl MemoryStorageClient {
    /// Create an empty store with no buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with one bucket already present.
    pub fn with_bucket(bucket: &str, region: &str) -> Self {
        let buckets: HashMap<String, MemoryBucket> =
            HashMap::from([(bucket.to_string(), MemoryBucket::new(region))]);
        Self {
            buckets: RwLock::new(buckets),
        }
    }

    /// Create a bucket. Existing buckets keep their objects.
    pub fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), StorageError> {
        let mut buckets = self.buckets.write().map_err(|_| poisoned())?;
        buckets
            .entry(bucket.to_string())
            .or_insert_with(|| MemoryBucket::new(region));
        Ok(())
    }

    /// Keys currently stored in a bucket, in order.
    pub fn keys(&self, bucket: &str) -> Result<Vec<String>, StorageError> {
        let buckets = self.buckets.read().map_err(|_| poisoned())?;
        let stored: &MemoryBucket = buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        Ok(stored.objects.keys().cloned().collect())
    }
}

#[async_trait]
impl StorageClient for MemoryStorageClient {
    async fn head_object(&self, bucket: &str, key: &str) -> Result<Option<u64>, StorageError> {
        let buckets = self.buckets.read().map_err(|_| poisoned())?;
        // HEAD on a missing bucket is a plain 404 in S3 as well.
        Ok(buckets
            .get(bucket)
            .and_then(|b| b.objects.get(key))
            .map(|o| o.data.len() as u64))
    }

    async fn put_object(&self, bucket: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let mut buckets = self.buckets.write().map_err(|_| poisoned())?;
        let stored: &mut MemoryBucket = buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(bucket))?;
        stored.objects.insert(
            key.to_string(),
            StoredObject {
                data: data.to_vec(),
                last_modified: current_epoch_seconds(),
            },
        );
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let buckets = self.buckets.read().map_err(|_| poisoned())?;
        let stored: &MemoryBucket = buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        stored
            .objects
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: &str,
        max_keys: Option<i32>,
        continuation_token: Option<&str>,
    ) -> Result<ListPage, StorageError> {
        let buckets = self.buckets.read().map_err(|_| poisoned())?;
        let stored: &MemoryBucket = buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;

        let page_size: usize = match max_keys {
            Some(n) => usize::try_from(n).unwrap_or(0),
            None => DEFAULT_PAGE_SIZE,
        };

        // The continuation token is the last key of the previous page.
        let lower: Bound<&str> = match continuation_token {
            Some(token) => Bound::Excluded(token),
            None => Bound::Unbounded,
        };

        let mut matching = stored
            .objects
            .range::<str, _>((lower, Bound::Unbounded))
            .filter(|(key, _)| key.starts_with(prefix));

        let objects: Vec<ObjectInfo> = matching
            .by_ref()
            .take(page_size)
            .map(|(key, object)| ObjectInfo {
                key: key.clone(),
                size: object.data.len() as u64,
                last_modified: Some(object.last_modified),
                etag: None,
            })
            .collect();

        let next_continuation_token: Option<String> = if page_size > 0 && matching.next().is_some()
        {
            objects.last().map(|o| o.key.clone())
        } else {
            None
        };

        Ok(ListPage {
            objects,
            next_continuation_token,
        })
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), StorageError> {
        let mut buckets = self.buckets.write().map_err(|_| poisoned())?;
        let stored: &mut MemoryBucket = buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(bucket))?;
        for key in keys {
            stored.objects.remove(key);
        }
        Ok(())
    }

    async fn bucket_region(&self, bucket: &str) -> Result<String, StorageError> {
        let buckets = self.buckets.read().map_err(|_| poisoned())?;
        buckets
            .get(bucket)
            .map(|b| b.region.clone())
            .ok_or_else(|| no_such_bucket(bucket))
    }
}

fn no_such_bucket(bucket: &str) -> StorageError {
    StorageError::NetworkError {
        message: format!("NoSuchBucket: {}", bucket),
        retryable: false,
    }
}

fn poisoned() -> StorageError {
    StorageError::Other {
        message: "memory store lock poisoned".to_string(),
    }
}

fn current_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
