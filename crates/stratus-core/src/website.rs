//! The website stack
//!
//! Single zero-parameter constructor wiring the whole frontend stack
//! together: private bucket, origin access identity, distribution, asset
//! deployment, two fixed tags on everything, two outputs. Every value is a
//! literal; the provider owns all remaining validation.

use crate::model::{
    AccessIdentitySpec, BlockPublicAccess, BucketEncryption, BucketSpec, CachePolicy,
    DeploymentSpec, DistributionSpec, ErrorResponse, Origin, RemovalPolicy, TagMap,
    ViewerProtocolPolicy,
};
use crate::stack::{Output, ResourceSpec, Stack};
use std::path::PathBuf;

pub const STACK_NAME: &str = "aws-dev-2-2";

const BUCKET_NAME: &str = "aws-dev-shymanouski";
const ROOT_OBJECT: &str = "index.html";

/// Declare the frontend stack.
pub fn website_stack() -> Stack {
    let mut stack = Stack::new(STACK_NAME, "Task #5: Frontend Stack with Import service");

    let tags = TagMap::from_pairs(&[("task", "5"), ("owner", "ashymanouski")]);

    let bucket = BucketSpec {
        bucket_name: BUCKET_NAME.to_string(),
        block_public_access: BlockPublicAccess::ALL,
        removal_policy: RemovalPolicy::Destroy,
        enforce_ssl: true,
        encryption: BucketEncryption::S3Managed,
        bucket_key_enabled: true,
        policy_statements: Vec::new(),
    };

    // TODO: decide between re-enabling this grant and moving the origin to
    // origin access control. The distribution currently relies on the origin
    // identity attachment alone.
    // bucket.grant_read("${access-identity:website:canonical-user}");

    stack.add_resource("website", ResourceSpec::Bucket(bucket));

    stack.add_resource(
        "website",
        ResourceSpec::AccessIdentity(AccessIdentitySpec {
            comment: "OAI for website bucket".to_string(),
        }),
    );

    stack.add_resource(
        "website",
        ResourceSpec::Distribution(DistributionSpec {
            comment: "aws-dev-2-2: automated deployment".to_string(),
            default_root_object: ROOT_OBJECT.to_string(),
            viewer_protocol_policy: ViewerProtocolPolicy::RedirectToHttps,
            cache_policy: CachePolicy::CachingOptimized,
            origin: Origin {
                bucket: "website".to_string(),
                access_identity: "website".to_string(),
            },
            // 403 and 404 both rewrite to the root object so client-side
            // routes resolve on hard reloads.
            error_responses: vec![
                ErrorResponse {
                    http_status: 403,
                    response_http_status: 200,
                    response_page_path: format!("/{ROOT_OBJECT}"),
                    ttl_minutes: 0,
                },
                ErrorResponse {
                    http_status: 404,
                    response_http_status: 200,
                    response_page_path: format!("/{ROOT_OBJECT}"),
                    ttl_minutes: 0,
                },
            ],
        }),
    );

    stack.add_resource(
        "website",
        ResourceSpec::Deployment(DeploymentSpec {
            source: PathBuf::from("../dist"),
            destination_bucket: "website".to_string(),
            distribution: "website".to_string(),
            distribution_paths: vec!["/*".to_string()],
        }),
    );

    stack.apply_tags(&tags);

    stack.add_output(Output {
        name: "CloudFrontURL".to_string(),
        value: "https://${distribution:website:domain-name}".to_string(),
        description: "CloudFront Distribution URL".to_string(),
    });
    stack.add_output(Output {
        name: "BucketName".to_string(),
        value: "${bucket:website:regional-domain-name}".to_string(),
        description: "S3 Bucket URL".to_string(),
    });

    stack
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::ResourceKind;

    #[test]
    fn declares_exactly_one_resource_of_each_kind() {
        let stack = website_stack();
        assert_eq!(stack.resources.len(), 4);
        for kind in [
            ResourceKind::Bucket,
            ResourceKind::AccessIdentity,
            ResourceKind::Distribution,
            ResourceKind::Deployment,
        ] {
            assert_eq!(stack.resources_of(kind).count(), 1, "{kind}");
        }
    }

    #[test]
    fn bucket_is_private_and_destroyed_on_teardown() {
        let stack = website_stack();
        let resource = stack.resource(ResourceKind::Bucket, "website").unwrap();
        let ResourceSpec::Bucket(bucket) = &resource.spec else {
            panic!("not a bucket");
        };

        assert!(bucket.block_public_access.blocks_everything());
        assert_eq!(bucket.removal_policy, RemovalPolicy::Destroy);
        assert!(bucket.enforce_ssl);
        assert_eq!(bucket.encryption, BucketEncryption::S3Managed);
        assert!(bucket.bucket_key_enabled);
        // The read grant stays disabled until the access-control question
        // is settled.
        assert!(bucket.policy_statements.is_empty());
    }

    #[test]
    fn error_responses_are_exactly_the_two_spa_rewrites() {
        let stack = website_stack();
        let resource = stack
            .resource(ResourceKind::Distribution, "website")
            .unwrap();
        let ResourceSpec::Distribution(distribution) = &resource.spec else {
            panic!("not a distribution");
        };

        assert_eq!(distribution.error_responses.len(), 2);
        let statuses: Vec<u16> = distribution
            .error_responses
            .iter()
            .map(|e| e.http_status)
            .collect();
        assert_eq!(statuses, [403, 404]);
        for rewrite in &distribution.error_responses {
            assert_eq!(rewrite.response_http_status, 200);
            assert_eq!(rewrite.response_page_path, "/index.html");
            assert_eq!(rewrite.ttl_minutes, 0);
        }
    }

    #[test]
    fn deployment_invalidates_every_path() {
        let stack = website_stack();
        let resource = stack.resource(ResourceKind::Deployment, "website").unwrap();
        let ResourceSpec::Deployment(deployment) = &resource.spec else {
            panic!("not a deployment");
        };

        assert_eq!(deployment.distribution_paths, ["/*"]);
        assert_eq!(deployment.source, PathBuf::from("../dist"));
    }

    #[test]
    fn both_tags_are_on_every_resource_and_the_stack() {
        let stack = website_stack();

        assert!(stack.tags.contains("task", "5"));
        assert!(stack.tags.contains("owner", "ashymanouski"));
        for resource in &stack.resources {
            assert!(resource.tags.contains("task", "5"), "{}", resource.key());
            assert!(
                resource.tags.contains("owner", "ashymanouski"),
                "{}",
                resource.key()
            );
        }
    }

    #[test]
    fn outputs_surface_both_urls() {
        let stack = website_stack();
        let names: Vec<&str> = stack.outputs.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["CloudFrontURL", "BucketName"]);
        assert!(stack.outputs[0].value.starts_with("https://"));
    }

    #[test]
    fn declaration_is_internally_consistent() {
        assert!(website_stack().validate().is_ok());
    }
}
