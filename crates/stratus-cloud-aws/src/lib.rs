//! AWS provider for Stratus
//!
//! Applies the stack declaration through the AWS SDK: S3 for the bucket and
//! asset upload, CloudFront for the access identity, the distribution, and
//! cache invalidation, STS for the credential check. All remote validation
//! (name collisions, permissions, quota) stays with AWS and is surfaced
//! as-is; nothing here retries.

pub mod cloudfront;
pub mod error;
pub mod provider;
pub mod s3;
pub mod sync;

// Re-exports
pub use cloudfront::{AccessIdentityInfo, CloudFront, DistributionInfo};
pub use error::{AwsError, Result};
pub use provider::AwsProvider;
pub use s3::S3;
pub use sync::{DeploymentOutcome, deploy_assets};
