//! AWS provider error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("Access identity not found: {0}")]
    IdentityNotFound(String),

    #[error("Distribution not found: {0}")]
    DistributionNotFound(String),

    #[error(
        "Distribution {0} is not fully disabled yet; re-run destroy once it reaches Deployed"
    )]
    DistributionNotDisabled(String),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Deployment source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Invalid deployment source: {0}")]
    InvalidSource(String),

    #[error("S3 API error: {0}")]
    S3(String),

    #[error("CloudFront API error: {0}")]
    CloudFront(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cloud error: {0}")]
    Cloud(#[from] stratus_cloud::CloudError),
}

impl From<AwsError> for stratus_cloud::CloudError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::Cloud(inner) => inner,
            other => stratus_cloud::CloudError::ApiError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;
