//! SDK-backed bucket region lookup.

use rusty_buckets_common::DEFAULT_S3_REGION;
use rusty_buckets_storage::{StorageError, StorageSettings};

use crate::client::CrtStorageClient;

/// Look up the home region of a bucket using the default credential chain.
///
/// The probe is sent from `DEFAULT_S3_REGION`. Every failure, including
/// failing to set up the client, is reported as
/// `StorageError::BucketInaccessible`.
pub async fn get_bucket_region(bucket: &str) -> Result<String, StorageError> {
    let settings: StorageSettings = StorageSettings::default().with_region(DEFAULT_S3_REGION);
    let client: CrtStorageClient = CrtStorageClient::new(settings).await.map_err(|err| {
        log::debug!("Could not build region probe client: {}", err);
        StorageError::BucketInaccessible {
            bucket: bucket.to_string(),
        }
    })?;
    rusty_buckets_storage::get_bucket_region(&client, bucket).await
}
