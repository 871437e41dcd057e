//! aws-sdk-s3 wrapper
//!
//! Wraps the S3 calls the provider needs: bucket provisioning with its full
//! configuration, object upload, and teardown.

use crate::error::{AwsError, Result};
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{BuildError, DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, Delete, ObjectIdentifier,
    PublicAccessBlockConfiguration, ServerSideEncryption, ServerSideEncryptionByDefault,
    ServerSideEncryptionConfiguration, ServerSideEncryptionRule, Tag, Tagging,
};
use serde_json::json;
use std::path::Path;
use stratus_core::model::{BucketEncryption, BucketSpec, PolicyStatement, TagMap};

/// aws-sdk-s3 wrapper
pub struct S3 {
    client: Client,
    region: String,
}

impl S3 {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        let region = config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "us-east-1".to_string());
        Self {
            client: Client::new(config),
            region,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Regional domain name the bucket's objects are served from.
    pub fn regional_domain_name(&self, bucket: &str) -> String {
        format!("{bucket}.s3.{}.amazonaws.com", self.region)
    }

    pub async fn bucket_exists(&self, name: &str) -> Result<bool> {
        match self.client.head_bucket().bucket(name).send().await {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(ctx)) if ctx.err().is_not_found() => Ok(false),
            Err(e) => Err(api_error(e)),
        }
    }

    /// Create the bucket and apply the spec's full configuration: public
    /// access block, encryption, tags, and the bucket policy. Grant
    /// principals must already be resolved to canonical user ids.
    pub async fn create_bucket(
        &self,
        spec: &BucketSpec,
        tags: &TagMap,
        statements: &[PolicyStatement],
    ) -> Result<()> {
        let name = &spec.bucket_name;
        tracing::info!("Creating bucket: {}", name);

        let mut request = self.client.create_bucket().bucket(name);
        // us-east-1 is the default location and must not be sent as a
        // constraint.
        if self.region != "us-east-1" {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }
        request.send().await.map_err(api_error)?;

        self.client
            .put_public_access_block()
            .bucket(name)
            .public_access_block_configuration(
                PublicAccessBlockConfiguration::builder()
                    .block_public_acls(spec.block_public_access.block_public_acls)
                    .block_public_policy(spec.block_public_access.block_public_policy)
                    .ignore_public_acls(spec.block_public_access.ignore_public_acls)
                    .restrict_public_buckets(spec.block_public_access.restrict_public_buckets)
                    .build(),
            )
            .send()
            .await
            .map_err(api_error)?;

        if spec.encryption == BucketEncryption::S3Managed {
            self.client
                .put_bucket_encryption()
                .bucket(name)
                .server_side_encryption_configuration(
                    ServerSideEncryptionConfiguration::builder()
                        .rules(
                            ServerSideEncryptionRule::builder()
                                .apply_server_side_encryption_by_default(
                                    ServerSideEncryptionByDefault::builder()
                                        .sse_algorithm(ServerSideEncryption::Aes256)
                                        .build()
                                        .map_err(build_error)?,
                                )
                                .bucket_key_enabled(spec.bucket_key_enabled)
                                .build(),
                        )
                        .build()
                        .map_err(build_error)?,
                )
                .send()
                .await
                .map_err(api_error)?;
        }

        if !tags.is_empty() {
            let mut tagging = Tagging::builder();
            for (key, value) in tags.iter() {
                tagging = tagging.tag_set(
                    Tag::builder()
                        .key(key)
                        .value(value)
                        .build()
                        .map_err(build_error)?,
                );
            }
            self.client
                .put_bucket_tagging()
                .bucket(name)
                .tagging(tagging.build().map_err(build_error)?)
                .send()
                .await
                .map_err(api_error)?;
        }

        if let Some(policy) = bucket_policy_document(spec, statements) {
            self.client
                .put_bucket_policy()
                .bucket(name)
                .policy(policy.to_string())
                .send()
                .await
                .map_err(api_error)?;
        }

        Ok(())
    }

    pub async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<()> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| AwsError::S3(format!("{}: {e}", path.display())))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(api_error)?;

        tracing::debug!("Uploaded s3://{}/{}", bucket, key);
        Ok(())
    }

    /// Delete every object in the bucket. Returns the number removed.
    pub async fn empty_bucket(&self, name: &str) -> Result<usize> {
        let mut removed = 0;
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(name)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(api_error)?;
            let keys: Vec<String> = page
                .contents()
                .iter()
                .filter_map(|object| object.key().map(str::to_string))
                .collect();
            if keys.is_empty() {
                continue;
            }

            let mut delete = Delete::builder();
            for key in &keys {
                delete = delete.objects(
                    ObjectIdentifier::builder()
                        .key(key)
                        .build()
                        .map_err(build_error)?,
                );
            }
            self.client
                .delete_objects()
                .bucket(name)
                .delete(delete.build().map_err(build_error)?)
                .send()
                .await
                .map_err(api_error)?;
            removed += keys.len();
        }

        tracing::debug!("Removed {} objects from {}", removed, name);
        Ok(removed)
    }

    pub async fn delete_bucket(&self, name: &str) -> Result<()> {
        self.client
            .delete_bucket()
            .bucket(name)
            .send()
            .await
            .map_err(api_error)?;
        tracing::info!("Deleted bucket: {}", name);
        Ok(())
    }
}

/// Bucket policy combining the TLS-only rule with any resolved grants.
/// `None` when the spec asks for neither.
fn bucket_policy_document(
    spec: &BucketSpec,
    statements: &[PolicyStatement],
) -> Option<serde_json::Value> {
    let mut policy_statements = Vec::new();

    if spec.enforce_ssl {
        policy_statements.push(json!({
            "Sid": "EnforceTLS",
            "Effect": "Deny",
            "Principal": "*",
            "Action": "s3:*",
            "Resource": [
                format!("arn:aws:s3:::{}", spec.bucket_name),
                format!("arn:aws:s3:::{}/*", spec.bucket_name),
            ],
            "Condition": { "Bool": { "aws:SecureTransport": "false" } },
        }));
    }

    for statement in statements {
        let mut body = json!({
            "Effect": "Allow",
            "Principal": { "CanonicalUser": statement.canonical_user },
            "Action": statement.actions,
            "Resource": statement.resources,
        });
        if let Some(sid) = &statement.sid {
            body["Sid"] = json!(sid);
        }
        policy_statements.push(body);
    }

    if policy_statements.is_empty() {
        return None;
    }

    Some(json!({
        "Version": "2012-10-17",
        "Statement": policy_statements,
    }))
}

fn api_error<E>(err: SdkError<E>) -> AwsError
where
    E: std::error::Error + Send + Sync + 'static,
{
    AwsError::S3(DisplayErrorContext(&err).to_string())
}

fn build_error(err: BuildError) -> AwsError {
    AwsError::S3(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_document_denies_plain_http() {
        let spec = BucketSpec::private("example");
        let policy = bucket_policy_document(&spec, &[]).unwrap();

        let statements = policy["Statement"].as_array().unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0]["Effect"], "Deny");
        assert_eq!(
            statements[0]["Condition"]["Bool"]["aws:SecureTransport"],
            "false"
        );
    }

    #[test]
    fn policy_document_includes_resolved_grants() {
        let mut spec = BucketSpec::private("example");
        spec.grant_read("canonical-user-id");

        let policy = bucket_policy_document(&spec, &spec.policy_statements.clone()).unwrap();
        let statements = policy["Statement"].as_array().unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(
            statements[1]["Principal"]["CanonicalUser"],
            "canonical-user-id"
        );
        assert_eq!(statements[1]["Sid"], "AllowOriginIdentityRead");
    }

    #[test]
    fn no_policy_without_ssl_enforcement_or_grants() {
        let mut spec = BucketSpec::private("example");
        spec.enforce_ssl = false;
        assert!(bucket_policy_document(&spec, &[]).is_none());
    }
}
