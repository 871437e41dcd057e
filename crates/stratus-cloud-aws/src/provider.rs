//! AWS provider implementation

use crate::cloudfront::CloudFront;
use crate::error::{AwsError, Result};
use crate::s3::S3;
use crate::sync;
use async_trait::async_trait;
use serde_json::json;
use std::path::Path;
use std::time::Instant;
use stratus_cloud::{
    Action, ActionType, ApplyResult, AuthStatus, Plan, ResourceRecord, ResourceStatus,
    StackProvider, StackState, StateManager, attr,
};
use stratus_core::model::{PolicyStatement, RemovalPolicy};
use stratus_core::{Resource, ResourceKind, ResourceSpec, Stack};

/// AWS provider
pub struct AwsProvider {
    s3: S3,
    cloudfront: CloudFront,
    sts: aws_sdk_sts::Client,
    state: StateManager,
}

impl AwsProvider {
    /// Load shared AWS configuration from the environment and wire up the
    /// service clients. Applied-resource state is recorded under
    /// `project_root`.
    pub async fn connect(project_root: &Path) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        Self {
            s3: S3::new(&config),
            cloudfront: CloudFront::new(&config),
            sts: aws_sdk_sts::Client::new(&config),
            state: StateManager::new(project_root),
        }
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Apply a single resource and record its attributes. For `NoOp`
    /// actions the live resource is looked up instead of created, so
    /// outputs resolve even when nothing changed.
    async fn apply_one(
        &self,
        stack: &Stack,
        resource: &Resource,
        action_type: ActionType,
        state: &mut StackState,
    ) -> Result<String> {
        match &resource.spec {
            ResourceSpec::Bucket(spec) => {
                if action_type == ActionType::Create {
                    let statements = resolve_statements(&spec.policy_statements, state)?;
                    self.s3.create_bucket(spec, &resource.tags, &statements).await?;
                }
                state.set_resource(
                    ResourceKind::Bucket,
                    &resource.id,
                    ResourceRecord::new(&spec.bucket_name, ResourceKind::Bucket)
                        .with_status(ResourceStatus::Created)
                        .with_attribute(
                            attr::REGIONAL_DOMAIN_NAME,
                            json!(self.s3.regional_domain_name(&spec.bucket_name)),
                        ),
                );
                Ok(match action_type {
                    ActionType::Create => format!("created bucket {}", spec.bucket_name),
                    _ => format!("bucket {} unchanged", spec.bucket_name),
                })
            }
            ResourceSpec::AccessIdentity(spec) => {
                let identity = if action_type == ActionType::Create {
                    self.cloudfront.create_access_identity(&spec.comment).await?
                } else {
                    self.cloudfront
                        .find_access_identity_by_comment(&spec.comment)
                        .await?
                        .ok_or_else(|| AwsError::IdentityNotFound(spec.comment.clone()))?
                };
                state.set_resource(
                    ResourceKind::AccessIdentity,
                    &resource.id,
                    ResourceRecord::new(&identity.id, ResourceKind::AccessIdentity)
                        .with_status(ResourceStatus::Created)
                        .with_attribute(attr::CANONICAL_USER, json!(identity.canonical_user)),
                );
                Ok(match action_type {
                    ActionType::Create => format!("created origin access identity {}", identity.id),
                    _ => format!("origin access identity {} unchanged", identity.id),
                })
            }
            ResourceSpec::Distribution(spec) => {
                let info = if action_type == ActionType::Create {
                    let origin_domain = match stack
                        .resource(ResourceKind::Bucket, &spec.origin.bucket)
                        .map(|r| &r.spec)
                    {
                        Some(ResourceSpec::Bucket(bucket)) => {
                            self.s3.regional_domain_name(&bucket.bucket_name)
                        }
                        _ => {
                            return Err(AwsError::MissingDependency(format!(
                                "bucket:{} is not declared",
                                spec.origin.bucket
                            )));
                        }
                    };
                    let identity = state
                        .get_resource(ResourceKind::AccessIdentity, &spec.origin.access_identity)
                        .ok_or_else(|| {
                            AwsError::MissingDependency(format!(
                                "access-identity:{} must be applied before the distribution",
                                spec.origin.access_identity
                            ))
                        })?;
                    self.cloudfront
                        .create_distribution(spec, &origin_domain, &identity.id, &resource.tags)
                        .await?
                } else {
                    self.cloudfront
                        .find_distribution_by_comment(&spec.comment)
                        .await?
                        .ok_or_else(|| AwsError::DistributionNotFound(spec.comment.clone()))?
                };
                state.set_resource(
                    ResourceKind::Distribution,
                    &resource.id,
                    ResourceRecord::new(&info.id, ResourceKind::Distribution)
                        .with_status(ResourceStatus::Created)
                        .with_attribute(attr::DOMAIN_NAME, json!(info.domain_name)),
                );
                Ok(match action_type {
                    ActionType::Create => {
                        format!("created distribution {} at {}", info.id, info.domain_name)
                    }
                    _ => format!("distribution {} unchanged", info.id),
                })
            }
            ResourceSpec::Deployment(spec) => {
                let bucket_name = state
                    .get_resource(ResourceKind::Bucket, &spec.destination_bucket)
                    .map(|record| record.id.clone())
                    .ok_or_else(|| {
                        AwsError::MissingDependency(format!(
                            "bucket:{} must be applied before the deployment",
                            spec.destination_bucket
                        ))
                    })?;
                let distribution_id = state
                    .get_resource(ResourceKind::Distribution, &spec.distribution)
                    .map(|record| record.id.clone())
                    .ok_or_else(|| {
                        AwsError::MissingDependency(format!(
                            "distribution:{} must be applied before the deployment",
                            spec.distribution
                        ))
                    })?;

                let outcome = sync::deploy_assets(
                    &self.s3,
                    &self.cloudfront,
                    spec,
                    &bucket_name,
                    &distribution_id,
                )
                .await?;

                state.set_resource(
                    ResourceKind::Deployment,
                    &resource.id,
                    ResourceRecord::new(&outcome.invalidation_id, ResourceKind::Deployment)
                        .with_status(ResourceStatus::Created)
                        .with_attribute(attr::INVALIDATION_ID, json!(outcome.invalidation_id))
                        .with_attribute(attr::UPLOADED_OBJECTS, json!(outcome.uploaded)),
                );
                Ok(format!(
                    "uploaded {} files, invalidation {}",
                    outcome.uploaded, outcome.invalidation_id
                ))
            }
        }
    }

    async fn destroy_one(&self, resource: &Resource, state: &mut StackState) -> Result<String> {
        match &resource.spec {
            ResourceSpec::Deployment(_) => {
                // Uploaded objects are removed with the bucket.
                state.remove_resource(ResourceKind::Deployment, &resource.id);
                Ok("deployment record removed".to_string())
            }
            ResourceSpec::Distribution(spec) => {
                let id = match state.get_resource(ResourceKind::Distribution, &resource.id) {
                    Some(record) => Some(record.id.clone()),
                    None => self
                        .cloudfront
                        .find_distribution_by_comment(&spec.comment)
                        .await?
                        .map(|d| d.id),
                };
                let Some(id) = id else {
                    return Ok("distribution already gone".to_string());
                };
                self.cloudfront.disable_distribution(&id).await?;
                self.cloudfront.delete_distribution(&id).await?;
                state.remove_resource(ResourceKind::Distribution, &resource.id);
                Ok(format!("deleted distribution {id}"))
            }
            ResourceSpec::AccessIdentity(spec) => {
                let id = match state.get_resource(ResourceKind::AccessIdentity, &resource.id) {
                    Some(record) => Some(record.id.clone()),
                    None => self
                        .cloudfront
                        .find_access_identity_by_comment(&spec.comment)
                        .await?
                        .map(|i| i.id),
                };
                let Some(id) = id else {
                    return Ok("access identity already gone".to_string());
                };
                self.cloudfront.delete_access_identity(&id).await?;
                state.remove_resource(ResourceKind::AccessIdentity, &resource.id);
                Ok(format!("deleted access identity {id}"))
            }
            ResourceSpec::Bucket(spec) => {
                if spec.removal_policy == RemovalPolicy::Retain {
                    return Ok(format!("bucket {} retained by policy", spec.bucket_name));
                }
                if !self.s3.bucket_exists(&spec.bucket_name).await? {
                    state.remove_resource(ResourceKind::Bucket, &resource.id);
                    return Ok("bucket already gone".to_string());
                }
                let removed = self.s3.empty_bucket(&spec.bucket_name).await?;
                self.s3.delete_bucket(&spec.bucket_name).await?;
                state.remove_resource(ResourceKind::Bucket, &resource.id);
                Ok(format!(
                    "emptied ({removed} objects) and deleted bucket {}",
                    spec.bucket_name
                ))
            }
        }
    }
}

#[async_trait]
impl StackProvider for AwsProvider {
    fn name(&self) -> &str {
        "aws"
    }

    fn display_name(&self) -> &str {
        "Amazon Web Services"
    }

    async fn check_auth(&self) -> stratus_cloud::Result<AuthStatus> {
        match self.sts.get_caller_identity().send().await {
            Ok(identity) => {
                let account = identity.account().unwrap_or("unknown account");
                let arn = identity.arn().unwrap_or("unknown identity");
                Ok(AuthStatus::ok(format!("{account} ({arn})")))
            }
            Err(e) => Ok(AuthStatus::failed(
                aws_sdk_sts::error::DisplayErrorContext(&e).to_string(),
            )),
        }
    }

    async fn plan(&self, stack: &Stack) -> stratus_cloud::Result<Plan> {
        stack.validate().map_err(stratus_cloud::CloudError::from)?;

        let mut actions = Vec::new();
        for resource in &stack.resources {
            let action = match &resource.spec {
                ResourceSpec::Bucket(spec) => {
                    if self.s3.bucket_exists(&spec.bucket_name).await? {
                        Action::new(
                            ActionType::NoOp,
                            ResourceKind::Bucket,
                            &resource.id,
                            format!("bucket {} already exists", spec.bucket_name),
                        )
                    } else {
                        Action::new(
                            ActionType::Create,
                            ResourceKind::Bucket,
                            &resource.id,
                            format!("create bucket {}", spec.bucket_name),
                        )
                    }
                }
                ResourceSpec::AccessIdentity(spec) => {
                    if self
                        .cloudfront
                        .find_access_identity_by_comment(&spec.comment)
                        .await?
                        .is_some()
                    {
                        Action::new(
                            ActionType::NoOp,
                            ResourceKind::AccessIdentity,
                            &resource.id,
                            "origin access identity already exists",
                        )
                    } else {
                        Action::new(
                            ActionType::Create,
                            ResourceKind::AccessIdentity,
                            &resource.id,
                            "create origin access identity",
                        )
                    }
                }
                ResourceSpec::Distribution(spec) => {
                    if self
                        .cloudfront
                        .find_distribution_by_comment(&spec.comment)
                        .await?
                        .is_some()
                    {
                        Action::new(
                            ActionType::NoOp,
                            ResourceKind::Distribution,
                            &resource.id,
                            "distribution already exists",
                        )
                    } else {
                        Action::new(
                            ActionType::Create,
                            ResourceKind::Distribution,
                            &resource.id,
                            "create distribution",
                        )
                    }
                }
                // The deployment runs on every apply: upload, then a full
                // invalidation, unconditionally.
                ResourceSpec::Deployment(spec) => Action::new(
                    ActionType::Create,
                    ResourceKind::Deployment,
                    &resource.id,
                    format!(
                        "upload {} and invalidate {}",
                        spec.source.display(),
                        spec.distribution_paths.join(", ")
                    ),
                ),
            };
            actions.push(action);
        }
        Ok(Plan::new(actions))
    }

    async fn apply(&self, stack: &Stack, plan: &Plan) -> stratus_cloud::Result<ApplyResult> {
        let lock = self.state.acquire_lock().await?;
        let mut state = self.state.load().await?;
        let mut result = ApplyResult::new();
        let start = Instant::now();

        for action in &plan.actions {
            let Some(resource) = stack.resource(action.kind, &action.resource_id) else {
                result.add_failure(action.key(), "action targets an undeclared resource");
                break;
            };

            match self
                .apply_one(stack, resource, action.action_type, &mut state)
                .await
            {
                Ok(message) => result.add_success(action.key(), message),
                Err(e) => {
                    tracing::error!("{} failed: {}", action.key(), e);
                    result.add_failure(action.key(), e.to_string());
                    // Linear apply: nothing after the failure is attempted.
                    break;
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        self.state.save(&state).await?;
        lock.release().await?;
        Ok(result)
    }

    async fn destroy(&self, stack: &Stack) -> stratus_cloud::Result<ApplyResult> {
        let lock = self.state.acquire_lock().await?;
        let mut state = self.state.load().await?;
        let mut result = ApplyResult::new();
        let start = Instant::now();

        for resource in stack.resources.iter().rev() {
            let key = resource.key();
            match self.destroy_one(resource, &mut state).await {
                Ok(message) => result.add_success(key, message),
                Err(e) => {
                    tracing::error!("{} teardown failed: {}", key, e);
                    result.add_failure(key, e.to_string());
                    break;
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        self.state.save(&state).await?;
        lock.release().await?;
        Ok(result)
    }
}

/// Resolve `${...}` references in grant principals against applied state.
fn resolve_statements(
    statements: &[PolicyStatement],
    state: &StackState,
) -> Result<Vec<PolicyStatement>> {
    statements
        .iter()
        .map(|statement| {
            let canonical_user = state.resolve(&statement.canonical_user)?;
            Ok(PolicyStatement {
                canonical_user,
                ..statement.clone()
            })
        })
        .collect()
}
