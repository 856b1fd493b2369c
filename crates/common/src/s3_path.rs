//! S3 path utilities.
//!
//! Paths at the external boundary have the form `s3://bucket/key...`, with
//! `s3a://bucket/key...` accepted as an alternate spelling. Everything in this
//! module is pure string handling and never touches the network.

use crate::constants::{S3A_SCHEME, S3_SCHEME};
use crate::error::PathError;

/// Build the canonical S3 path for a key inside a bucket.
///
/// The bucket and key are joined lexically: empty and `.` segments are
/// dropped, `..` is resolved, and a trailing `/` is not preserved.
///
/// # Arguments
/// * `bucket` - Bucket name
/// * `key` - Bucket-relative object key
///
/// # Returns
/// A path such as `s3://bucket/key`.
pub fn to_s3_path(bucket: &str, key: &str) -> String {
    format!("{}{}", S3_SCHEME, lexical_join(&[bucket, key]))
}

/// Join a canonical S3 path with further path components.
///
/// The scheme is stripped from the first element, every element is joined
/// with `/` and cleaned, and the scheme is added back.
///
/// # Arguments
/// * `paths` - A canonical S3 path followed by zero or more components
///
/// # Returns
/// The joined path, or an empty string when `paths` is empty.
pub fn join_s3_paths<S: AsRef<str>>(paths: &[S]) -> String {
    let Some((first, rest)) = paths.split_first() else {
        return String::new();
    };

    let first: &str = first.as_ref();
    let mut parts: Vec<&str> = Vec::with_capacity(paths.len());
    parts.push(first.strip_prefix(S3_SCHEME).unwrap_or(first));
    parts.extend(rest.iter().map(|p| p.as_ref()));

    format!("{}{}", S3_SCHEME, lexical_join(&parts))
}

/// Check whether a string is a valid `s3://bucket/key` path.
///
/// Valid means: the `s3://` prefix is present and the remainder has at least
/// two `/`-separated segments whose first (bucket) and second (key) segments
/// are both non-empty.
pub fn is_valid_s3_path(path: &str) -> bool {
    has_bucket_and_key(path, S3_SCHEME)
}

/// Check whether a string is a valid `s3a://bucket/key` path.
pub fn is_valid_s3a_path(path: &str) -> bool {
    has_bucket_and_key(path, S3A_SCHEME)
}

/// Split an `s3://bucket/key` path into its bucket and key.
///
/// # Arguments
/// * `path` - Canonical S3 path
///
/// # Returns
/// `(bucket, key)` where the key is everything after the first `/`
/// following the bucket.
///
/// # Errors
/// Returns `PathError::InvalidS3Path` if the path fails validation.
pub fn split_s3_path(path: &str) -> Result<(String, String), PathError> {
    if !is_valid_s3_path(path) {
        return Err(PathError::InvalidS3Path {
            path: path.to_string(),
        });
    }
    Ok(split_after_scheme(&path[S3_SCHEME.len()..]))
}

/// Split an `s3a://bucket/key` path into its bucket and key.
///
/// # Errors
/// Returns `PathError::InvalidS3aPath` if the path fails validation.
pub fn split_s3a_path(path: &str) -> Result<(String, String), PathError> {
    if !is_valid_s3a_path(path) {
        return Err(PathError::InvalidS3aPath {
            path: path.to_string(),
        });
    }
    Ok(split_after_scheme(&path[S3A_SCHEME.len()..]))
}

/// Append `suffix` to `s` unless it already ends with it.
pub fn ensure_suffix(s: &str, suffix: &str) -> String {
    if s.ends_with(suffix) {
        s.to_string()
    } else {
        format!("{}{}", s, suffix)
    }
}

fn has_bucket_and_key(path: &str, scheme: &str) -> bool {
    let Some(rest) = path.strip_prefix(scheme) else {
        return false;
    };
    let mut segments = rest.split('/');
    matches!(
        (segments.next(), segments.next()),
        (Some(bucket), Some(key)) if !bucket.is_empty() && !key.is_empty()
    )
}

// Only called on validated input, which always contains a `/`.
fn split_after_scheme(full_path: &str) -> (String, String) {
    match full_path.split_once('/') {
        Some((bucket, key)) => (bucket.to_string(), key.to_string()),
        None => (full_path.to_string(), String::new()),
    }
}

/// Join components with `/` and clean the result lexically.
fn lexical_join(parts: &[&str]) -> String {
    let rooted: bool = parts
        .iter()
        .find(|p| !p.is_empty())
        .is_some_and(|p| p.starts_with('/'));

    let mut segments: Vec<&str> = Vec::new();
    for segment in parts.iter().flat_map(|p| p.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                // Pop if we can and it's not a ParentDir
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push(segment);
                }
            }
            _ => segments.push(segment),
        }
    }

    let joined: String = segments.join("/");
    if rooted {
        format!("/{}", joined)
    } else {
        joined
    }
}
