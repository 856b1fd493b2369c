//! Bucket region lookup.

use crate::error::StorageError;
use crate::traits::StorageClient;

/// Look up the home region of a bucket.
///
/// Any failure is reported as `StorageError::BucketInaccessible`; the
/// underlying cause is logged at debug level but not returned, since the
/// caller can only act on "this bucket cannot be reached".
///
/// # Arguments
/// * `client` - Storage client to probe with
/// * `bucket` - Bucket name
pub async fn get_bucket_region<C: StorageClient + ?Sized>(
    client: &C,
    bucket: &str,
) -> Result<String, StorageError> {
    client.bucket_region(bucket).await.map_err(|err| {
        log::debug!("Bucket region lookup for {} failed: {}", bucket, err);
        StorageError::BucketInaccessible {
            bucket: bucket.to_string(),
        }
    })
}
