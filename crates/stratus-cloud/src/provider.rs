//! Stack provider trait definition

use crate::action::{ApplyResult, Plan};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stratus_core::Stack;

/// A cloud provider a stack declaration is applied through.
///
/// The provider owns every remote call and every validation the declaration
/// delegates: name collisions, permission checks, quota. Stratus itself
/// codes no retries and no partial-failure recovery on top of it.
#[async_trait]
pub trait StackProvider: Send + Sync {
    /// Provider name (e.g. "aws")
    fn name(&self) -> &str;

    /// Provider display name for UI
    fn display_name(&self) -> &str;

    /// Check if the provider is configured and authenticated
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Diff the declaration against live resources.
    async fn plan(&self, stack: &Stack) -> Result<Plan>;

    /// Execute the plan in declaration order. Stops at the first failure;
    /// nothing is retried.
    async fn apply(&self, stack: &Stack, plan: &Plan) -> Result<ApplyResult>;

    /// Tear down the stack's resources in reverse declaration order,
    /// honoring each resource's removal policy.
    async fn destroy(&self, stack: &Stack) -> Result<ApplyResult>;
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}
