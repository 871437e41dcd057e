//! Planned actions over a stack declaration

use serde::{Deserialize, Serialize};
use stratus_core::ResourceKind;

/// A single planned step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub action_type: ActionType,
    pub kind: ResourceKind,
    pub resource_id: String,
    pub description: String,
}

impl Action {
    pub fn new(
        action_type: ActionType,
        kind: ResourceKind,
        resource_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            kind,
            resource_id: resource_id.into(),
            description: description.into(),
        }
    }

    /// Full resource key (`kind:id`) the action targets.
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind, self.resource_id)
    }
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Create,
    Update,
    Delete,
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Ordered list of actions; declaration order is preserved so the bucket is
/// always created before the distribution and the deployment runs last.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    pub actions: Vec<Action>,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    pub fn has_changes(&self) -> bool {
        self.actions.iter().any(|a| a.action_type != ActionType::NoOp)
    }

    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            update: self.actions_by_type(ActionType::Update).len(),
            delete: self.actions_by_type(ActionType::Delete).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to delete, {} unchanged",
            self.create, self.update, self.delete, self.no_change
        )
    }
}

/// Result of applying a plan. Apply is linear and stops at the first
/// failure, so `failed` holds at most one entry and everything after it was
/// never attempted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyResult {
    pub succeeded: Vec<ActionResult>,
    pub failed: Vec<ActionResult>,
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.succeeded.push(ActionResult {
            key: key.into(),
            message: message.into(),
            error: None,
        });
    }

    pub fn add_failure(&mut self, key: impl Into<String>, error: impl Into<String>) {
        self.failed.push(ActionResult {
            key: key.into(),
            message: String::new(),
            error: Some(error.into()),
        });
    }
}

/// Result of a single action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub key: String,
    pub message: String,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(kind: ResourceKind) -> Action {
        Action::new(ActionType::Create, kind, "website", "create it")
    }

    #[test]
    fn summary_counts_by_type() {
        let plan = Plan::new(vec![
            create(ResourceKind::Bucket),
            Action::new(ActionType::NoOp, ResourceKind::Distribution, "website", ""),
            create(ResourceKind::Deployment),
        ]);

        let summary = plan.summary();
        assert_eq!(summary.create, 2);
        assert_eq!(summary.no_change, 1);
        assert_eq!(summary.to_string(), "2 to create, 0 to update, 0 to delete, 1 unchanged");
    }

    #[test]
    fn noop_only_plan_has_no_changes() {
        let plan = Plan::new(vec![Action::new(
            ActionType::NoOp,
            ResourceKind::Bucket,
            "website",
            "",
        )]);
        assert!(!plan.has_changes());
        assert!(Plan::default().actions.is_empty());
    }

    #[test]
    fn apply_result_tracks_failures() {
        let mut result = ApplyResult::new();
        result.add_success("bucket:website", "created");
        assert!(result.is_success());

        result.add_failure("distribution:website", "boom");
        assert!(!result.is_success());
        assert_eq!(result.failed[0].error.as_deref(), Some("boom"));
    }
}
