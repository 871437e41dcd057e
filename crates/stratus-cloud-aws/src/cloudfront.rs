//! aws-sdk-cloudfront wrapper
//!
//! Wraps the CloudFront calls the provider needs: origin access identities,
//! the distribution itself, and cache invalidations.

use crate::error::{AwsError, Result};
use aws_sdk_cloudfront::Client;
use aws_sdk_cloudfront::error::{BuildError, DisplayErrorContext, SdkError};
use aws_sdk_cloudfront::types::{
    CloudFrontOriginAccessIdentityConfig, CustomErrorResponse, CustomErrorResponses,
    DefaultCacheBehavior, DistributionConfig, DistributionConfigWithTags, InvalidationBatch,
    Origin, Origins, Paths, S3OriginConfig, Tag, Tags,
};
use chrono::Utc;
use stratus_core::model::{DistributionSpec, TagMap, ViewerProtocolPolicy};

/// aws-sdk-cloudfront wrapper
pub struct CloudFront {
    client: Client,
}

/// Provider-side identity of a distribution.
#[derive(Debug, Clone)]
pub struct DistributionInfo {
    pub id: String,
    pub domain_name: String,
}

/// Provider-side identity of an origin access identity.
#[derive(Debug, Clone)]
pub struct AccessIdentityInfo {
    pub id: String,
    pub canonical_user: String,
}

impl CloudFront {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    pub async fn create_access_identity(&self, comment: &str) -> Result<AccessIdentityInfo> {
        let output = self
            .client
            .create_cloud_front_origin_access_identity()
            .cloud_front_origin_access_identity_config(
                CloudFrontOriginAccessIdentityConfig::builder()
                    .caller_reference(caller_reference("oai"))
                    .comment(comment)
                    .build()
                    .map_err(build_error)?,
            )
            .send()
            .await
            .map_err(api_error)?;

        let identity = output.cloud_front_origin_access_identity().ok_or_else(|| {
            AwsError::CloudFront("identity missing from create response".to_string())
        })?;

        tracing::info!("Created origin access identity: {}", identity.id());
        Ok(AccessIdentityInfo {
            id: identity.id().to_string(),
            canonical_user: identity.s3_canonical_user_id().to_string(),
        })
    }

    /// Identities carry no name, so the comment is the lookup key.
    pub async fn find_access_identity_by_comment(
        &self,
        comment: &str,
    ) -> Result<Option<AccessIdentityInfo>> {
        let output = self
            .client
            .list_cloud_front_origin_access_identities()
            .send()
            .await
            .map_err(api_error)?;

        let Some(list) = output.cloud_front_origin_access_identity_list() else {
            return Ok(None);
        };
        for summary in list.items() {
            if summary.comment() == comment {
                return Ok(Some(AccessIdentityInfo {
                    id: summary.id().to_string(),
                    canonical_user: summary.s3_canonical_user_id().to_string(),
                }));
            }
        }
        Ok(None)
    }

    pub async fn find_distribution_by_comment(
        &self,
        comment: &str,
    ) -> Result<Option<DistributionInfo>> {
        let output = self
            .client
            .list_distributions()
            .send()
            .await
            .map_err(api_error)?;

        let Some(list) = output.distribution_list() else {
            return Ok(None);
        };
        for summary in list.items() {
            if summary.comment() == comment {
                return Ok(Some(DistributionInfo {
                    id: summary.id().to_string(),
                    domain_name: summary.domain_name().to_string(),
                }));
            }
        }
        Ok(None)
    }

    /// Create the distribution with its single bucket origin, tagged at
    /// creation time.
    pub async fn create_distribution(
        &self,
        spec: &DistributionSpec,
        origin_domain: &str,
        access_identity_id: &str,
        tags: &TagMap,
    ) -> Result<DistributionInfo> {
        const ORIGIN_ID: &str = "bucket-origin";

        let origin = Origin::builder()
            .id(ORIGIN_ID)
            .domain_name(origin_domain)
            .s3_origin_config(
                S3OriginConfig::builder()
                    .origin_access_identity(format!(
                        "origin-access-identity/cloudfront/{access_identity_id}"
                    ))
                    .build(),
            )
            .build()
            .map_err(build_error)?;

        let behavior = DefaultCacheBehavior::builder()
            .target_origin_id(ORIGIN_ID)
            .viewer_protocol_policy(viewer_protocol_policy(spec.viewer_protocol_policy))
            .cache_policy_id(spec.cache_policy.managed_policy_id())
            .build()
            .map_err(build_error)?;

        let mut custom_errors =
            CustomErrorResponses::builder().quantity(spec.error_responses.len() as i32);
        for rewrite in &spec.error_responses {
            custom_errors = custom_errors.items(
                CustomErrorResponse::builder()
                    .error_code(i32::from(rewrite.http_status))
                    .response_code(rewrite.response_http_status.to_string())
                    .response_page_path(&rewrite.response_page_path)
                    // The API takes seconds; the declaration speaks minutes.
                    .error_caching_min_ttl((rewrite.ttl_minutes * 60) as i64)
                    .build()
                    .map_err(build_error)?,
            );
        }

        let config = DistributionConfig::builder()
            .caller_reference(caller_reference("distribution"))
            .comment(&spec.comment)
            .default_root_object(&spec.default_root_object)
            .enabled(true)
            .origins(
                Origins::builder()
                    .quantity(1)
                    .items(origin)
                    .build()
                    .map_err(build_error)?,
            )
            .default_cache_behavior(behavior)
            .custom_error_responses(custom_errors.build().map_err(build_error)?)
            .build()
            .map_err(build_error)?;

        let mut tag_items = Tags::builder();
        for (key, value) in tags.iter() {
            tag_items = tag_items.items(
                Tag::builder()
                    .key(key)
                    .value(value)
                    .build()
                    .map_err(build_error)?,
            );
        }

        let output = self
            .client
            .create_distribution_with_tags()
            .distribution_config_with_tags(
                DistributionConfigWithTags::builder()
                    .distribution_config(config)
                    .tags(tag_items.build())
                    .build(),
            )
            .send()
            .await
            .map_err(api_error)?;

        let distribution = output.distribution().ok_or_else(|| {
            AwsError::CloudFront("distribution missing from create response".to_string())
        })?;

        tracing::info!("Created distribution: {}", distribution.id());
        Ok(DistributionInfo {
            id: distribution.id().to_string(),
            domain_name: distribution.domain_name().to_string(),
        })
    }

    /// Invalidate the given paths. Returns the invalidation id.
    pub async fn create_invalidation(
        &self,
        distribution_id: &str,
        paths: &[String],
    ) -> Result<String> {
        let mut path_items = Paths::builder().quantity(paths.len() as i32);
        for path in paths {
            path_items = path_items.items(path);
        }

        let output = self
            .client
            .create_invalidation()
            .distribution_id(distribution_id)
            .invalidation_batch(
                InvalidationBatch::builder()
                    .paths(path_items.build().map_err(build_error)?)
                    .caller_reference(caller_reference("invalidation"))
                    .build()
                    .map_err(build_error)?,
            )
            .send()
            .await
            .map_err(api_error)?;

        let invalidation_id = output
            .invalidation()
            .map(|i| i.id().to_string())
            .unwrap_or_default();
        tracing::info!(
            "Created invalidation {} on {}",
            invalidation_id,
            distribution_id
        );
        Ok(invalidation_id)
    }

    /// Flip the distribution to disabled so it becomes deletable. A no-op
    /// if it is disabled already.
    pub async fn disable_distribution(&self, id: &str) -> Result<()> {
        let current = self
            .client
            .get_distribution_config()
            .id(id)
            .send()
            .await
            .map_err(api_error)?;
        let etag = current.e_tag().unwrap_or_default().to_string();
        let Some(mut config) = current.distribution_config else {
            return Err(AwsError::CloudFront(format!(
                "distribution {id} has no config"
            )));
        };

        if !config.enabled {
            return Ok(());
        }
        config.enabled = false;

        self.client
            .update_distribution()
            .id(id)
            .if_match(etag)
            .distribution_config(config)
            .send()
            .await
            .map_err(api_error)?;
        tracing::info!("Disabled distribution: {}", id);
        Ok(())
    }

    /// Delete a disabled distribution. While the disable is still
    /// propagating the provider refuses; that case is surfaced as its own
    /// error so the caller can re-run destroy later.
    pub async fn delete_distribution(&self, id: &str) -> Result<()> {
        let current = self
            .client
            .get_distribution()
            .id(id)
            .send()
            .await
            .map_err(api_error)?;
        let etag = current.e_tag().unwrap_or_default().to_string();

        match self
            .client
            .delete_distribution()
            .id(id)
            .if_match(etag)
            .send()
            .await
        {
            Ok(_) => {
                tracing::info!("Deleted distribution: {}", id);
                Ok(())
            }
            Err(SdkError::ServiceError(ctx)) if ctx.err().is_distribution_not_disabled() => {
                Err(AwsError::DistributionNotDisabled(id.to_string()))
            }
            Err(e) => Err(api_error(e)),
        }
    }

    pub async fn delete_access_identity(&self, id: &str) -> Result<()> {
        let current = self
            .client
            .get_cloud_front_origin_access_identity()
            .id(id)
            .send()
            .await
            .map_err(api_error)?;
        let etag = current.e_tag().unwrap_or_default().to_string();

        self.client
            .delete_cloud_front_origin_access_identity()
            .id(id)
            .if_match(etag)
            .send()
            .await
            .map_err(api_error)?;
        tracing::info!("Deleted origin access identity: {}", id);
        Ok(())
    }
}

/// Unique caller reference for create calls. Uniqueness is what the API
/// cares about; the value never appears in the rendered declaration.
fn caller_reference(prefix: &str) -> String {
    format!("stratus-{prefix}-{}", Utc::now().timestamp_millis())
}

fn viewer_protocol_policy(
    policy: ViewerProtocolPolicy,
) -> aws_sdk_cloudfront::types::ViewerProtocolPolicy {
    use aws_sdk_cloudfront::types::ViewerProtocolPolicy as Sdk;
    match policy {
        ViewerProtocolPolicy::RedirectToHttps => Sdk::RedirectToHttps,
        ViewerProtocolPolicy::HttpsOnly => Sdk::HttpsOnly,
        ViewerProtocolPolicy::AllowAll => Sdk::AllowAll,
    }
}

fn api_error<E>(err: SdkError<E>) -> AwsError
where
    E: std::error::Error + Send + Sync + 'static,
{
    AwsError::CloudFront(DisplayErrorContext(&err).to_string())
}

fn build_error(err: BuildError) -> AwsError {
    AwsError::CloudFront(err.to_string())
}
