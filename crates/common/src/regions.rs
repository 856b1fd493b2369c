//! Known S3 regions.
//!
//! The set is derived from the partition table below and only covers the
//! commercial (`aws`) and China (`aws-cn`) partitions. It is built once by
//! [`init_s3_regions`] during start-up and is read-only afterwards.

use std::collections::HashSet;
use std::sync::OnceLock;

/// Partition identifier for the commercial AWS partition.
pub const AWS_PARTITION_ID: &str = "aws";

/// Partition identifier for the AWS China partition.
pub const AWS_CN_PARTITION_ID: &str = "aws-cn";

/// A named group of regions sharing an endpoint namespace.
#[derive(Debug, Clone, Copy)]
pub struct Partition {
    /// Partition identifier (e.g. "aws").
    pub id: &'static str,
    /// Region identifiers in this partition.
    pub regions: &'static [&'static str],
}

/// Partition metadata the region set is computed from.
pub const PARTITIONS: &[Partition] = &[
    Partition {
        id: AWS_PARTITION_ID,
        regions: &[
            "af-south-1",
            "ap-east-1",
            "ap-northeast-1",
            "ap-northeast-2",
            "ap-northeast-3",
            "ap-south-1",
            "ap-south-2",
            "ap-southeast-1",
            "ap-southeast-2",
            "ap-southeast-3",
            "ap-southeast-4",
            "ap-southeast-5",
            "ap-southeast-7",
            "ca-central-1",
            "ca-west-1",
            "eu-central-1",
            "eu-central-2",
            "eu-north-1",
            "eu-south-1",
            "eu-south-2",
            "eu-west-1",
            "eu-west-2",
            "eu-west-3",
            "il-central-1",
            "me-central-1",
            "me-south-1",
            "mx-central-1",
            "sa-east-1",
            "us-east-1",
            "us-east-2",
            "us-west-1",
            "us-west-2",
        ],
    },
    Partition {
        id: AWS_CN_PARTITION_ID,
        regions: &["cn-north-1", "cn-northwest-1"],
    },
    Partition {
        id: "aws-us-gov",
        regions: &["us-gov-east-1", "us-gov-west-1"],
    },
    Partition {
        id: "aws-iso",
        regions: &["us-iso-east-1", "us-iso-west-1"],
    },
];

static S3_REGIONS: OnceLock<HashSet<String>> = OnceLock::new();

/// Build the process-wide S3 region set.
///
/// Call once during start-up. Repeated calls are cheap and return the set
/// built by the first call.
pub fn init_s3_regions() -> &'static HashSet<String> {
    S3_REGIONS.get_or_init(|| regions_for_partitions(PARTITIONS))
}

/// Read-only access to the S3 region set.
///
/// Builds the set on first use if [`init_s3_regions`] was never called.
pub fn s3_regions() -> &'static HashSet<String> {
    init_s3_regions()
}

/// Check whether `region` is a known S3 region.
pub fn is_valid_s3_region(region: &str) -> bool {
    s3_regions().contains(region)
}

fn regions_for_partitions(partitions: &[Partition]) -> HashSet<String> {
    partitions
        .iter()
        .filter(|p| p.id == AWS_PARTITION_ID || p.id == AWS_CN_PARTITION_ID)
        .flat_map(|p| p.regions.iter().map(|r| r.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_S3_REGION;

    #[test]
    fn test_regions_include_commercial_and_china() {
        let regions: &HashSet<String> = init_s3_regions();
        assert!(regions.contains("us-east-1"));
        assert!(regions.contains(DEFAULT_S3_REGION));
        assert!(regions.contains("cn-north-1"));
    }

    #[test]
    fn test_regions_exclude_other_partitions() {
        assert!(!is_valid_s3_region("us-gov-west-1"));
        assert!(!is_valid_s3_region("us-iso-east-1"));
        assert!(!is_valid_s3_region("not-a-region"));
    }

    #[test]
    fn test_init_is_idempotent() {
        let first: *const HashSet<String> = init_s3_regions();
        let second: *const HashSet<String> = s3_regions();
        assert_eq!(first, second);
    }

    #[test]
    fn test_regions_for_partitions_filters_by_id() {
        let partitions: [Partition; 2] = [
            Partition {
                id: AWS_PARTITION_ID,
                regions: &["r1"],
            },
            Partition {
                id: "other",
                regions: &["r2"],
            },
        ];
        let regions: HashSet<String> = regions_for_partitions(&partitions);
        assert_eq!(regions.len(), 1);
        assert!(regions.contains("r1"));
    }
}
