//! Origin access identity declaration

use serde::{Deserialize, Serialize};

/// Provider-managed principal the distribution reads the private bucket
/// through. Carries nothing but a descriptive comment; the principal's
/// actual credentials are minted by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessIdentitySpec {
    pub comment: String,
}
