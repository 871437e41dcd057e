//! Resource declaration model
//!
//! One module per resource family, mirroring the shape of the stack itself:
//! bucket, access identity, distribution, deployment, plus the shared tag map.

pub mod bucket;
pub mod deployment;
pub mod distribution;
pub mod identity;
pub mod tags;

pub use bucket::{BlockPublicAccess, BucketEncryption, BucketSpec, PolicyStatement, RemovalPolicy};
pub use deployment::DeploymentSpec;
pub use distribution::{
    CachePolicy, DistributionSpec, ErrorResponse, Origin, ViewerProtocolPolicy,
};
pub use identity::AccessIdentitySpec;
pub use tags::TagMap;
