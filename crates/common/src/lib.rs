//! Shared types and utilities for rusty-buckets.
//!
//! This crate provides functionality used across all rusty-buckets crates:
//! - S3 path parsing, validation and joining
//! - Shared constants (schemes, upload policy, page sizes)
//! - Path error types
//! - A first-error fan-out helper for concurrent work
//! - The process-wide set of known S3 regions

pub mod constants;
pub mod error;
pub mod parallel;
pub mod regions;
pub mod s3_path;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::PathError;
pub use parallel::run_first_err;
pub use regions::{init_s3_regions, is_valid_s3_region, s3_regions};
pub use s3_path::{
    ensure_suffix, is_valid_s3_path, is_valid_s3a_path, join_s3_paths, split_s3_path,
    split_s3a_path, to_s3_path,
};
