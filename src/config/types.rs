use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub persist: PersistConfig,
}

/// Settings of the persisted state layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistConfig {
    /// Root identifier of the snapshot in storage (stored as `persist:<key>`).
    #[serde(default = "default_key")]
    pub key: String,
    /// Snapshot format version. Stored snapshots with another version are discarded.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Slice keys written to storage. Everything else stays in memory.
    #[serde(default = "default_whitelist")]
    pub whitelist: Vec<String>,
    /// Directory for file storage (default: `<data dir>/stockroom`).
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
}

fn default_key() -> String {
    "root".to_string()
}

fn default_version() -> u32 {
    1
}

fn default_whitelist() -> Vec<String> {
    vec!["user".to_string()]
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            key: default_key(),
            version: default_version(),
            whitelist: default_whitelist(),
            storage_dir: None,
        }
    }
}

impl PersistConfig {
    /// Key under which the snapshot is stored.
    pub fn storage_key(&self) -> String {
        format!("persist:{}", self.key)
    }

    /// Directory used by file storage.
    ///
    /// Falls back to `dirs::data_dir()/stockroom`, or the current directory
    /// if the platform has no data dir.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("stockroom")
        })
    }

    pub fn is_whitelisted(&self, key: &str) -> bool {
        self.whitelist.iter().any(|allowed| allowed == key)
    }
}
