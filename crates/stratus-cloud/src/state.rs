//! Local record of applied resources
//!
//! Manages the `.stratus/state.json` file recording what `deploy` created:
//! provider-side ids and the attributes stack outputs resolve against.
//! The record is a convenience for `outputs` and `destroy`, not a source of
//! truth; `plan` always diffs against the live provider.

use crate::error::{CloudError, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use stratus_core::ResourceKind;
use tokio::fs;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".stratus";
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";
const LOCK_FILE: &str = "lock.json";

/// Attribute names recorded per resource and referenced from outputs as
/// `${kind:id:attribute}`.
pub mod attr {
    /// Distribution domain name.
    pub const DOMAIN_NAME: &str = "domain-name";
    /// Bucket regional domain name.
    pub const REGIONAL_DOMAIN_NAME: &str = "regional-domain-name";
    /// Access identity canonical user id.
    pub const CANONICAL_USER: &str = "canonical-user";
    /// Invalidation id of the last deployment.
    pub const INVALIDATION_ID: &str = "invalidation-id";
    /// Number of objects the last deployment uploaded.
    pub const UPLOADED_OBJECTS: &str = "uploaded-objects";
}

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([a-z-]+):([A-Za-z0-9_-]+):([a-z-]+)\}").expect("valid reference pattern")
});

/// Recorded state of a whole stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackState {
    /// State file version
    pub version: u32,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    /// Records indexed by `kind:id`
    pub resources: HashMap<String, ResourceRecord>,
}

impl Default for StackState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            resources: HashMap::new(),
        }
    }
}

impl StackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_for(kind: ResourceKind, id: &str) -> String {
        format!("{kind}:{id}")
    }

    pub fn set_resource(&mut self, kind: ResourceKind, id: &str, record: ResourceRecord) {
        self.resources.insert(Self::key_for(kind, id), record);
        self.updated_at = Utc::now();
    }

    pub fn remove_resource(&mut self, kind: ResourceKind, id: &str) -> Option<ResourceRecord> {
        let removed = self.resources.remove(&Self::key_for(kind, id));
        if removed.is_some() {
            self.updated_at = Utc::now();
        }
        removed
    }

    pub fn get_resource(&self, kind: ResourceKind, id: &str) -> Option<&ResourceRecord> {
        self.resources.get(&Self::key_for(kind, id))
    }

    /// Resolve every `${kind:id:attribute}` reference in `value` against the
    /// recorded resources. The pseudo-attribute `id` resolves to the
    /// provider-side resource id.
    pub fn resolve(&self, value: &str) -> Result<String> {
        let mut resolved = String::with_capacity(value.len());
        let mut last = 0;

        for captures in REFERENCE.captures_iter(value) {
            let whole = captures.get(0).expect("capture 0 always present");
            let key = format!("{}:{}", &captures[1], &captures[2]);
            let attribute = &captures[3];

            let record = self
                .resources
                .get(&key)
                .ok_or_else(|| CloudError::UnresolvedOutput(format!("{key} has no record")))?;

            let text = if attribute == "id" {
                record.id.clone()
            } else {
                match record.attributes.get(attribute) {
                    Some(serde_json::Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => {
                        return Err(CloudError::UnresolvedOutput(format!(
                            "{key} has no attribute {attribute}"
                        )));
                    }
                }
            };

            resolved.push_str(&value[last..whole.start()]);
            resolved.push_str(&text);
            last = whole.end();
        }

        resolved.push_str(&value[last..]);
        Ok(resolved)
    }
}

/// Recorded state of a single resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Provider-side resource id (bucket name, distribution id, ...)
    pub id: String,

    pub kind: ResourceKind,

    pub status: ResourceStatus,

    /// Attributes outputs resolve against (domain names, ...)
    pub attributes: HashMap<String, serde_json::Value>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl ResourceRecord {
    pub fn new(id: impl Into<String>, kind: ResourceKind) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            kind,
            status: ResourceStatus::Unknown,
            attributes: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn get_attribute<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Status of a recorded resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    Created,
    Deleted,
    Error,
    Unknown,
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceStatus::Created => write!(f, "created"),
            ResourceStatus::Deleted => write!(f, "deleted"),
            ResourceStatus::Error => write!(f, "error"),
            ResourceStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// State manager for reading/writing state files
pub struct StateManager {
    project_root: PathBuf,
}

impl StateManager {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    fn state_dir(&self) -> PathBuf {
        self.project_root.join(STATE_DIR)
    }

    fn state_path(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.state_dir().join(STATE_BACKUP)
    }

    fn lock_path(&self) -> PathBuf {
        self.state_dir().join(LOCK_FILE)
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load the current state. A missing file is an empty state.
    pub async fn load(&self) -> Result<StackState> {
        let path = self.state_path();
        if !path.exists() {
            tracing::debug!("State file not found, returning empty state");
            return Ok(StackState::new());
        }

        let content = fs::read_to_string(&path).await?;
        let state: StackState = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(CloudError::StateError(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!("Loaded state with {} resources", state.resources.len());
        Ok(state)
    }

    /// Save the state, keeping the previous file as a backup.
    pub async fn save(&self, state: &StackState) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        let backup = self.backup_path();

        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
            tracing::debug!("Created state backup");
        }

        let content = serde_json::to_string_pretty(state)?;
        fs::write(&path, content).await?;

        tracing::debug!("Saved state with {} resources", state.resources.len());
        Ok(())
    }

    /// Acquire a lock for exclusive access
    pub async fn acquire_lock(&self) -> Result<StateLock> {
        self.ensure_state_dir().await?;

        let lock_path = self.lock_path();

        if lock_path.exists() {
            let content = fs::read_to_string(&lock_path).await?;
            let lock_info: LockInfo = serde_json::from_str(&content)?;

            // A lock older than an hour is assumed abandoned.
            let age = Utc::now().signed_duration_since(lock_info.acquired_at);
            if age.num_hours() < 1 {
                return Err(CloudError::LockError(format!(
                    "State is locked by {} since {}",
                    lock_info.holder, lock_info.acquired_at
                )));
            }

            tracing::warn!("Removing stale lock from {}", lock_info.holder);
        }

        let lock_info = LockInfo {
            holder: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("HOST"))
                .unwrap_or_else(|_| "unknown".to_string()),
            acquired_at: Utc::now(),
        };

        let content = serde_json::to_string_pretty(&lock_info)?;
        fs::write(&lock_path, content).await?;

        tracing::debug!("Acquired state lock");
        Ok(StateLock {
            lock_path,
            released: false,
        })
    }
}

/// Lock information
#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    acquired_at: DateTime<Utc>,
}

/// RAII guard for state lock
pub struct StateLock {
    lock_path: PathBuf,
    released: bool,
}

impl StateLock {
    /// Release the lock
    pub async fn release(mut self) -> Result<()> {
        if !self.released {
            if self.lock_path.exists() {
                fs::remove_file(&self.lock_path).await?;
                tracing::debug!("Released state lock");
            }
            self.released = true;
        }
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.released && self.lock_path.exists() {
            // Synchronous cleanup in drop - not ideal but necessary
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn state_round_trips_through_disk() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let mut state = StackState::new();
        state.set_resource(
            ResourceKind::Distribution,
            "website",
            ResourceRecord::new("E2EXAMPLE", ResourceKind::Distribution)
                .with_status(ResourceStatus::Created)
                .with_attribute(attr::DOMAIN_NAME, serde_json::json!("d123.cloudfront.net")),
        );

        manager.save(&state).await.unwrap();

        let loaded = manager.load().await.unwrap();
        assert_eq!(loaded.resources.len(), 1);
        let record = loaded
            .get_resource(ResourceKind::Distribution, "website")
            .unwrap();
        assert_eq!(record.id, "E2EXAMPLE");
        assert_eq!(
            record.get_attribute::<String>(attr::DOMAIN_NAME).as_deref(),
            Some("d123.cloudfront.net")
        );
    }

    #[tokio::test]
    async fn missing_state_file_is_empty_state() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let state = manager.load().await.unwrap();
        assert!(state.resources.is_empty());
    }

    #[tokio::test]
    async fn save_keeps_a_backup_of_the_previous_state() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        manager.save(&StackState::new()).await.unwrap();
        manager.save(&StackState::new()).await.unwrap();

        assert!(temp_dir.path().join(".stratus/state.json").exists());
        assert!(temp_dir.path().join(".stratus/state.json.backup").exists());
    }

    #[tokio::test]
    async fn second_lock_acquisition_fails() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let lock = manager.acquire_lock().await.unwrap();
        assert!(matches!(
            manager.acquire_lock().await,
            Err(CloudError::LockError(_))
        ));
        lock.release().await.unwrap();

        let reacquired = manager.acquire_lock().await.unwrap();
        reacquired.release().await.unwrap();
    }

    #[test]
    fn resolve_substitutes_recorded_attributes() {
        let mut state = StackState::new();
        state.set_resource(
            ResourceKind::Distribution,
            "website",
            ResourceRecord::new("E2EXAMPLE", ResourceKind::Distribution)
                .with_attribute(attr::DOMAIN_NAME, serde_json::json!("d123.cloudfront.net")),
        );

        let resolved = state
            .resolve("https://${distribution:website:domain-name}")
            .unwrap();
        assert_eq!(resolved, "https://d123.cloudfront.net");

        let by_id = state.resolve("${distribution:website:id}").unwrap();
        assert_eq!(by_id, "E2EXAMPLE");
    }

    #[test]
    fn resolve_reports_missing_records_and_attributes() {
        let state = StackState::new();
        assert!(matches!(
            state.resolve("${bucket:website:regional-domain-name}"),
            Err(CloudError::UnresolvedOutput(_))
        ));

        let mut state = StackState::new();
        state.set_resource(
            ResourceKind::Bucket,
            "website",
            ResourceRecord::new("a-bucket", ResourceKind::Bucket),
        );
        assert!(matches!(
            state.resolve("${bucket:website:regional-domain-name}"),
            Err(CloudError::UnresolvedOutput(_))
        ));
    }
}
