//! Shared data structures for storage operations.

use rusty_buckets_common::DEFAULT_S3_REGION;

/// Default number of attempts the SDK makes per request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Configuration settings for storage clients.
#[derive(Debug, Clone)]
pub struct StorageSettings {
    /// AWS region.
    pub region: String,
    /// AWS credentials. `None` uses the default credential chain.
    pub credentials: Option<AwsCredentials>,
    /// Custom endpoint (e.g. MinIO or LocalStack).
    pub endpoint_url: Option<String>,
    /// Use path-style addressing instead of virtual-hosted buckets.
    pub force_path_style: bool,
    /// Expected bucket owner for security validation.
    pub expected_bucket_owner: Option<String>,
    /// Maximum attempts per request, including the first one.
    pub max_attempts: u32,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            region: DEFAULT_S3_REGION.into(),
            credentials: None,
            endpoint_url: None,
            force_path_style: false,
            expected_bucket_owner: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl StorageSettings {
    /// Create settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set static credentials.
    pub fn with_credentials(mut self, credentials: AwsCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set a custom endpoint, enabling path-style addressing.
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self.force_path_style = true;
        self
    }

    /// Set the expected bucket owner.
    pub fn with_expected_bucket_owner(mut self, owner: impl Into<String>) -> Self {
        self.expected_bucket_owner = Some(owner.into());
        self
    }

    /// Set the maximum attempts per request.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// AWS credentials.
#[derive(Debug, Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

/// Outcome of an existence check.
///
/// Failures other than "not found" are reported through the `Err` arm of
/// the surrounding `Result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existence {
    /// Every checked key or prefix exists.
    Exists,
    /// At least one checked key or prefix is missing.
    Absent,
}

impl Existence {
    /// `true` for [`Existence::Exists`].
    pub fn exists(self) -> bool {
        matches!(self, Existence::Exists)
    }
}
