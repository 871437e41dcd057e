//! CDN distribution declaration

use serde::{Deserialize, Serialize};

/// Edge distribution with a single bucket origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionSpec {
    pub comment: String,

    /// Object served for requests to the distribution root.
    pub default_root_object: String,

    pub viewer_protocol_policy: ViewerProtocolPolicy,

    pub cache_policy: CachePolicy,

    /// The distribution's only origin.
    pub origin: Origin,

    /// Error-page rewrites, applied in order.
    pub error_responses: Vec<ErrorResponse>,
}

/// The authoritative backend the distribution fetches uncached content from:
/// a declared bucket, read through a declared access identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    /// Logical id of the bucket resource.
    pub bucket: String,
    /// Logical id of the access identity resource.
    pub access_identity: String,
}

/// How viewer requests over plain HTTP are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewerProtocolPolicy {
    RedirectToHttps,
    HttpsOnly,
    AllowAll,
}

/// Provider-managed cache policy preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CachePolicy {
    CachingOptimized,
    CachingDisabled,
}

impl CachePolicy {
    /// Id of the provider's managed cache policy this preset maps to.
    pub fn managed_policy_id(&self) -> &'static str {
        match self {
            CachePolicy::CachingOptimized => "658327ea-f89d-4fab-a63d-7e88639e58f6",
            CachePolicy::CachingDisabled => "4135ea2d-6df8-44a3-9df3-4b5a84be39ad",
        }
    }
}

/// Rewrite of an origin error status to a fixed page.
///
/// A zero TTL means the edge re-checks the origin on every request for the
/// error path, which keeps client-side routes of a single-page application
/// working without caching stale rewrites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Origin status code to intercept.
    pub http_status: u16,
    /// Status code returned to the viewer.
    pub response_http_status: u16,
    /// Page served in place of the error.
    pub response_page_path: String,
    /// How long the edge caches the rewrite, in whole minutes.
    pub ttl_minutes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn managed_policy_ids_are_distinct() {
        assert_ne!(
            CachePolicy::CachingOptimized.managed_policy_id(),
            CachePolicy::CachingDisabled.managed_policy_id()
        );
    }
}
