//! Shared constants used across rusty-buckets crates.

/// Canonical S3 path scheme.
pub const S3_SCHEME: &str = "s3://";

/// Alternate (Hadoop-style) S3 path scheme.
pub const S3A_SCHEME: &str = "s3a://";

/// Region used when no region is configured and for bucket region probes.
pub const DEFAULT_S3_REGION: &str = "us-west-2";

/// Canned ACL applied to every upload.
pub const UPLOAD_ACL: &str = "private";

/// Content-Disposition applied to every upload.
pub const UPLOAD_CONTENT_DISPOSITION: &str = "attachment";

/// Server-side encryption applied to every upload.
pub const UPLOAD_SERVER_SIDE_ENCRYPTION: &str = "AES256";

/// Page size used when paging through a prefix for deletion.
/// Also the S3 limit on keys per DeleteObjects request.
pub const DELETE_PAGE_SIZE: i32 = 1000;
