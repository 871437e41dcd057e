//! Stack declaration
//!
//! A stack is an ordered list of resource declarations plus stack-level
//! tags and outputs. Order is significant: resources are applied in the
//! order they were declared, and torn down in reverse.

use crate::error::{CoreError, Result};
use crate::model::{AccessIdentitySpec, BucketSpec, DeploymentSpec, DistributionSpec, TagMap};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Kinds of resources a stack can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Bucket,
    AccessIdentity,
    Distribution,
    Deployment,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Bucket => write!(f, "bucket"),
            ResourceKind::AccessIdentity => write!(f, "access-identity"),
            ResourceKind::Distribution => write!(f, "distribution"),
            ResourceKind::Deployment => write!(f, "deployment"),
        }
    }
}

/// Typed configuration of a single resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ResourceSpec {
    Bucket(BucketSpec),
    AccessIdentity(AccessIdentitySpec),
    Distribution(DistributionSpec),
    Deployment(DeploymentSpec),
}

impl ResourceSpec {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceSpec::Bucket(_) => ResourceKind::Bucket,
            ResourceSpec::AccessIdentity(_) => ResourceKind::AccessIdentity,
            ResourceSpec::Distribution(_) => ResourceKind::Distribution,
            ResourceSpec::Deployment(_) => ResourceKind::Deployment,
        }
    }
}

/// A declared resource: logical id, tags, and the typed spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub tags: TagMap,
    #[serde(flatten)]
    pub spec: ResourceSpec,
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        self.spec.kind()
    }

    /// Full resource key (`kind:id`), unique within a stack.
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind(), self.id)
    }
}

/// A declared stack output: a name, a value that may carry
/// `${kind:id:attribute}` references, and a description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub name: String,
    pub value: String,
    pub description: String,
}

/// The complete stack declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stack {
    pub name: String,
    pub description: String,
    pub tags: TagMap,
    pub resources: Vec<Resource>,
    pub outputs: Vec<Output>,
}

impl Stack {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            tags: TagMap::new(),
            resources: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Declare a resource. Declaration order is preserved.
    pub fn add_resource(&mut self, id: impl Into<String>, spec: ResourceSpec) {
        self.resources.push(Resource {
            id: id.into(),
            tags: TagMap::new(),
            spec,
        });
    }

    pub fn add_output(&mut self, output: Output) {
        self.outputs.push(output);
    }

    /// Look up a declared resource by kind and logical id.
    pub fn resource(&self, kind: ResourceKind, id: &str) -> Option<&Resource> {
        self.resources
            .iter()
            .find(|r| r.kind() == kind && r.id == id)
    }

    pub fn resources_of(&self, kind: ResourceKind) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(move |r| r.kind() == kind)
    }

    /// Apply the same tag map to every declared resource and to the stack
    /// itself. One shared pass, no per-resource override.
    pub fn apply_tags(&mut self, tags: &TagMap) {
        for resource in &mut self.resources {
            resource.tags.extend(tags);
        }
        self.tags.extend(tags);
    }

    /// Check internal consistency: unique resource keys and resolvable
    /// cross-resource references. Everything else (name collisions, quota,
    /// malformed values) is the provider's to report.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for resource in &self.resources {
            if !seen.insert(resource.key()) {
                return Err(CoreError::DuplicateResource(resource.key()));
            }
        }

        for resource in &self.resources {
            match &resource.spec {
                ResourceSpec::Distribution(spec) => {
                    self.require(ResourceKind::Bucket, &spec.origin.bucket, resource)?;
                    self.require(
                        ResourceKind::AccessIdentity,
                        &spec.origin.access_identity,
                        resource,
                    )?;
                }
                ResourceSpec::Deployment(spec) => {
                    self.require(ResourceKind::Bucket, &spec.destination_bucket, resource)?;
                    self.require(ResourceKind::Distribution, &spec.distribution, resource)?;
                }
                ResourceSpec::Bucket(_) | ResourceSpec::AccessIdentity(_) => {}
            }
        }

        Ok(())
    }

    fn require(&self, kind: ResourceKind, id: &str, referrer: &Resource) -> Result<()> {
        if self.resource(kind, id).is_none() {
            return Err(CoreError::UnresolvedReference(format!(
                "{} references {}:{}, which is not declared",
                referrer.key(),
                kind,
                id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeploymentSpec, Origin};
    use std::path::PathBuf;

    fn identity() -> ResourceSpec {
        ResourceSpec::AccessIdentity(AccessIdentitySpec {
            comment: "test".to_string(),
        })
    }

    #[test]
    fn apply_tags_reaches_every_resource_and_the_stack() {
        let mut stack = Stack::new("test", "test stack");
        stack.add_resource("a", identity());
        stack.add_resource("b", identity());

        stack.apply_tags(&TagMap::from_pairs(&[("team", "web")]));

        assert!(stack.tags.contains("team", "web"));
        for resource in &stack.resources {
            assert!(resource.tags.contains("team", "web"));
        }
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let mut stack = Stack::new("test", "test stack");
        stack.add_resource("same", identity());
        stack.add_resource("same", identity());

        assert!(matches!(
            stack.validate(),
            Err(CoreError::DuplicateResource(_))
        ));
    }

    #[test]
    fn same_id_under_different_kinds_is_fine() {
        let mut stack = Stack::new("test", "test stack");
        stack.add_resource("website", identity());
        stack.add_resource(
            "website",
            ResourceSpec::Bucket(BucketSpec::private("example")),
        );

        assert!(stack.validate().is_ok());
    }

    #[test]
    fn dangling_deployment_reference_is_rejected() {
        let mut stack = Stack::new("test", "test stack");
        stack.add_resource(
            "site",
            ResourceSpec::Deployment(DeploymentSpec {
                source: PathBuf::from("dist"),
                destination_bucket: "missing".to_string(),
                distribution: "missing".to_string(),
                distribution_paths: vec!["/*".to_string()],
            }),
        );

        assert!(matches!(
            stack.validate(),
            Err(CoreError::UnresolvedReference(_))
        ));
    }

    #[test]
    fn dangling_origin_reference_is_rejected() {
        let mut stack = Stack::new("test", "test stack");
        stack.add_resource(
            "site",
            ResourceSpec::Distribution(DistributionSpec {
                comment: "test".to_string(),
                default_root_object: "index.html".to_string(),
                viewer_protocol_policy: crate::model::ViewerProtocolPolicy::RedirectToHttps,
                cache_policy: crate::model::CachePolicy::CachingOptimized,
                origin: Origin {
                    bucket: "missing".to_string(),
                    access_identity: "missing".to_string(),
                },
                error_responses: Vec::new(),
            }),
        );

        assert!(matches!(
            stack.validate(),
            Err(CoreError::UnresolvedReference(_))
        ));
    }
}
