//! Object storage bucket declaration

use serde::{Deserialize, Serialize};

/// Private object storage bucket serving as the distribution's origin and
/// as the destination of the asset deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketSpec {
    /// Bucket name. Must be globally unique within the provider; collisions
    /// are reported by the provider at apply time, not checked here.
    pub bucket_name: String,

    /// Public access guards. The website bucket blocks everything; reads go
    /// through the distribution's access identity only.
    pub block_public_access: BlockPublicAccess,

    /// Whether the bucket's data is destroyed or preserved when the stack
    /// is torn down.
    pub removal_policy: RemovalPolicy,

    /// Attach a bucket policy denying any request made over plain HTTP.
    pub enforce_ssl: bool,

    /// Server-side encryption mode.
    pub encryption: BucketEncryption,

    /// Cache the encryption key at the bucket level to cut key-service
    /// round trips per object.
    pub bucket_key_enabled: bool,

    /// Additional bucket policy statements (access grants).
    pub policy_statements: Vec<PolicyStatement>,
}

impl BucketSpec {
    /// A private, encrypted bucket with every public access guard on.
    pub fn private(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            block_public_access: BlockPublicAccess::ALL,
            removal_policy: RemovalPolicy::Retain,
            enforce_ssl: true,
            encryption: BucketEncryption::S3Managed,
            bucket_key_enabled: true,
            policy_statements: Vec::new(),
        }
    }

    /// Grant `s3:GetObject` on every object in the bucket to a canonical
    /// user. The principal may be an `${access-identity:<id>:canonical-user}`
    /// reference, resolved when the stack is applied.
    pub fn grant_read(&mut self, canonical_user: impl Into<String>) {
        self.policy_statements.push(PolicyStatement {
            sid: Some("AllowOriginIdentityRead".to_string()),
            actions: vec!["s3:GetObject".to_string()],
            resources: vec![format!("arn:aws:s3:::{}/*", self.bucket_name)],
            canonical_user: canonical_user.into(),
        });
    }
}

/// Public access guard configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPublicAccess {
    pub block_public_acls: bool,
    pub block_public_policy: bool,
    pub ignore_public_acls: bool,
    pub restrict_public_buckets: bool,
}

impl BlockPublicAccess {
    /// Every guard on: no ACL, policy, or cross-account path can make the
    /// bucket readable from the outside.
    pub const ALL: Self = Self {
        block_public_acls: true,
        block_public_policy: true,
        ignore_public_acls: true,
        restrict_public_buckets: true,
    };

    pub fn blocks_everything(&self) -> bool {
        self.block_public_acls
            && self.block_public_policy
            && self.ignore_public_acls
            && self.restrict_public_buckets
    }
}

/// What happens to the bucket's data when its declaration is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Empty and delete the bucket on teardown.
    Destroy,
    /// Leave the bucket in place on teardown.
    Retain,
}

impl std::fmt::Display for RemovalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemovalPolicy::Destroy => write!(f, "destroy"),
            RemovalPolicy::Retain => write!(f, "retain"),
        }
    }
}

/// Server-side encryption mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketEncryption {
    /// Provider-managed keys (SSE-S3).
    S3Managed,
    /// No server-side encryption configured.
    Unencrypted,
}

/// A bucket policy statement granting object access to a canonical user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStatement {
    pub sid: Option<String>,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
    pub canonical_user: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_bucket_blocks_all_public_access() {
        let bucket = BucketSpec::private("example");
        assert!(bucket.block_public_access.blocks_everything());
        assert!(bucket.enforce_ssl);
        assert_eq!(bucket.encryption, BucketEncryption::S3Managed);
    }

    #[test]
    fn grant_read_targets_every_object() {
        let mut bucket = BucketSpec::private("example");
        bucket.grant_read("${access-identity:website:canonical-user}");

        let statement = &bucket.policy_statements[0];
        assert_eq!(statement.actions, ["s3:GetObject"]);
        assert_eq!(statement.resources, ["arn:aws:s3:::example/*"]);
    }
}
