//! AWS SDK S3 client implementation.

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    Delete, Object, ObjectCannedAcl, ObjectIdentifier, ServerSideEncryption,
};
use aws_sdk_s3::Client as S3Client;

use rusty_buckets_common::{UPLOAD_ACL, UPLOAD_CONTENT_DISPOSITION, UPLOAD_SERVER_SIDE_ENCRYPTION};
use rusty_buckets_storage::{ListPage, ObjectInfo, StorageClient, StorageError, StorageSettings};

use crate::error::CrtError;

/// Response header S3 uses to report a bucket's region.
const BUCKET_REGION_HEADER: &str = "x-amz-bucket-region";

/// StorageClient implementation using AWS SDK for Rust.
///
/// Retries, connection pooling and timeouts are handled by the SDK and
/// configured through `StorageSettings`.
pub struct CrtStorageClient {
    /// The underlying S3 client.
    s3_client: S3Client,
    /// Expected bucket owner for security validation.
    expected_bucket_owner: Option<String>,
}

impl CrtStorageClient {
    /// Create a new CRT storage client.
    ///
    /// # Arguments
    /// * `settings` - Storage settings including region and optional credentials
    ///
    /// # Errors
    /// Returns `StorageError::InvalidConfig` if the settings are unusable.
    pub async fn new(settings: StorageSettings) -> Result<Self, StorageError> {
        if settings.max_attempts == 0 {
            return Err(CrtError::ConfigError("max_attempts must be at least 1".into()).into());
        }

        let mut config_loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(settings.region.clone()))
            .retry_config(RetryConfig::standard().with_max_attempts(settings.max_attempts));

        if let Some(ref creds) = settings.credentials {
            let credentials = Credentials::new(
                &creds.access_key_id,
                &creds.secret_access_key,
                creds.session_token.clone(),
                None,
                "rusty-buckets",
            );
            config_loader = config_loader.credentials_provider(credentials);
        }

        if let Some(ref endpoint_url) = settings.endpoint_url {
            config_loader = config_loader.endpoint_url(endpoint_url);
        }

        let sdk_config = config_loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(settings.force_path_style)
            .build();

        log::debug!(
            "S3 client initialized (region {}, endpoint {:?})",
            settings.region,
            settings.endpoint_url
        );

        Ok(Self {
            s3_client: S3Client::from_conf(s3_config),
            expected_bucket_owner: settings.expected_bucket_owner,
        })
    }

    /// Create a client from an existing S3Client (for testing).
    ///
    /// # Arguments
    /// * `s3_client` - Pre-configured S3 client
    /// * `expected_bucket_owner` - Optional expected bucket owner
    pub fn from_client(s3_client: S3Client, expected_bucket_owner: Option<String>) -> Self {
        Self {
            s3_client,
            expected_bucket_owner,
        }
    }
}

#[async_trait]
impl StorageClient for CrtStorageClient {
    async fn head_object(&self, bucket: &str, key: &str) -> Result<Option<u64>, StorageError> {
        let request = self
            .s3_client
            .head_object()
            .bucket(bucket)
            .key(key)
            .set_expected_bucket_owner(self.expected_bucket_owner.clone());

        match request.send().await {
            Ok(output) => Ok(Some(output.content_length().unwrap_or(0).max(0) as u64)),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(None)
                } else {
                    Err(classify(bucket, key, &service_err, false))
                }
            }
        }
    }

    async fn put_object(&self, bucket: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let body = ByteStream::from(data.to_vec());

        self.s3_client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .acl(ObjectCannedAcl::from(UPLOAD_ACL))
            .content_disposition(UPLOAD_CONTENT_DISPOSITION)
            .server_side_encryption(ServerSideEncryption::from(UPLOAD_SERVER_SIDE_ENCRYPTION))
            .set_expected_bucket_owner(self.expected_bucket_owner.clone())
            .send()
            .await
            .map_err(|err| classify(bucket, key, &err.into_service_error(), true))?;

        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let response = self
            .s3_client
            .get_object()
            .bucket(bucket)
            .key(key)
            .set_expected_bucket_owner(self.expected_bucket_owner.clone())
            .send()
            .await
            .map_err(|err| {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    StorageError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    classify(bucket, key, &service_err, true)
                }
            })?;

        let data: Vec<u8> = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::NetworkError {
                message: e.to_string(),
                retryable: true,
            })?
            .into_bytes()
            .to_vec();

        Ok(data)
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: &str,
        max_keys: Option<i32>,
        continuation_token: Option<&str>,
    ) -> Result<ListPage, StorageError> {
        let response = self
            .s3_client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .set_max_keys(max_keys)
            .set_continuation_token(continuation_token.map(str::to_string))
            .set_expected_bucket_owner(self.expected_bucket_owner.clone())
            .send()
            .await
            .map_err(|err| classify(bucket, prefix, &err.into_service_error(), true))?;

        let objects: Vec<ObjectInfo> = response.contents().iter().map(object_info).collect();

        let next_continuation_token: Option<String> = if response.is_truncated() == Some(true) {
            response.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ListPage {
            objects,
            next_continuation_token,
        })
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), StorageError> {
        let identifiers: Vec<ObjectIdentifier> = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<_, _>>()
            .map_err(|e| CrtError::ConfigError(format!("invalid delete request: {}", e)))?;

        let delete: Delete = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(true)
            .build()
            .map_err(|e| CrtError::ConfigError(format!("invalid delete request: {}", e)))?;

        let response = self
            .s3_client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .set_expected_bucket_owner(self.expected_bucket_owner.clone())
            .send()
            .await
            .map_err(|err| {
                let service_err = err.into_service_error();
                CrtError::SdkError {
                    message: service_err.to_string(),
                    retryable: true,
                }
            })?;

        // Quiet mode only reports the keys that could not be deleted.
        match delete_failure_message(response.errors()) {
            Some(message) => Err(StorageError::Other { message }),
            None => Ok(()),
        }
    }

    async fn bucket_region(&self, bucket: &str) -> Result<String, StorageError> {
        match self.s3_client.head_bucket().bucket(bucket).send().await {
            Ok(output) => output.bucket_region().map(str::to_string).ok_or_else(|| {
                StorageError::Other {
                    message: format!("no region reported for bucket {}", bucket),
                }
            }),
            Err(err) => {
                // A bucket in another region answers with a redirect that
                // still names its region.
                let region: Option<String> = err
                    .raw_response()
                    .and_then(|response| response.headers().get(BUCKET_REGION_HEADER))
                    .map(str::to_string);
                match region {
                    Some(region) => Ok(region),
                    None => Err(CrtError::SdkError {
                        message: err.into_service_error().to_string(),
                        retryable: false,
                    }
                    .into()),
                }
            }
        }
    }
}

/// Map a service error to a `StorageError`, singling out access denials.
fn classify<E>(bucket: &str, key: &str, err: &E, retryable: bool) -> StorageError
where
    E: ProvideErrorMetadata + std::fmt::Display,
{
    if err.code() == Some("AccessDenied") {
        return StorageError::AccessDenied {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: err.message().unwrap_or_default().to_string(),
        };
    }
    CrtError::SdkError {
        message: err.to_string(),
        retryable,
    }
    .into()
}

fn object_info(obj: &Object) -> ObjectInfo {
    let last_modified: Option<i64> = obj
        .last_modified()
        .and_then(|dt| dt.to_millis().ok())
        .map(|ms| ms / 1000);

    ObjectInfo {
        key: obj.key().unwrap_or_default().to_string(),
        size: obj.size().map(|s| s.max(0) as u64).unwrap_or(0),
        last_modified,
        etag: obj.e_tag().map(|s| s.to_string()),
    }
}

fn delete_failure_message(errors: &[aws_sdk_s3::types::Error]) -> Option<String> {
    let first = errors.first()?;
    Some(format!(
        "failed to delete {} object(s); first failure {}: {} ({})",
        errors.len(),
        first.key().unwrap_or_default(),
        first.code().unwrap_or("unknown"),
        first.message().unwrap_or_default()
    ))
}
