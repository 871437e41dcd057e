//! Asset deployment declaration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Upload of a local asset directory into a declared bucket, followed by a
/// cache invalidation on a declared distribution.
///
/// Depends on both referenced resources already existing; the deployment is
/// always the last step of an apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSpec {
    /// Local directory whose contents become the site. Building it is an
    /// external precondition; it is not checked at declaration time.
    pub source: PathBuf,

    /// Logical id of the destination bucket resource.
    pub destination_bucket: String,

    /// Logical id of the distribution to invalidate.
    pub distribution: String,

    /// Paths invalidated after every upload.
    pub distribution_paths: Vec<String>,
}
