use super::ConfigError;
use crate::shared::fs_atomic::atomic_write_file;
use crate::shared::ids::WorkspaceName;
use crate::shared::serde_ext::never_or_timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceStatus {
    Active,
    Inactive,
}

impl WorkspaceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for WorkspaceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-workspace registry entry. Holds the lifecycle status and timestamps;
/// the declarative app list lives in the definition file at `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub name: WorkspaceName,
    pub path: PathBuf,
    pub status: WorkspaceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    pub created: String,
    pub last_updated: String,
    #[serde(default, with = "never_or_timestamp")]
    pub last_used: Option<String>,
}

impl WorkspaceConfig {
    pub fn is_active(&self) -> bool {
        self.status == WorkspaceStatus::Active
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRegistry {
    #[serde(skip)]
    path: PathBuf,
    #[serde(default)]
    workspaces: BTreeMap<WorkspaceName, WorkspaceConfig>,
}

impl WorkspaceRegistry {
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            workspaces: BTreeMap::new(),
        }
    }

    /// Loads the registry at `path`; a missing file is an empty registry.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::empty(path));
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(Self::empty(path));
        }
        let mut registry: Self =
            serde_json::from_str(&raw).map_err(|source| ConfigError::ParseRegistry {
                path: path.display().to_string(),
                source,
            })?;
        registry.path = path.to_path_buf();
        Ok(registry)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let body =
            serde_json::to_vec_pretty(self).map_err(|source| ConfigError::EncodeRegistry {
                path: self.path.display().to_string(),
                source,
            })?;
        atomic_write_file(&self.path, &body).map_err(|source| ConfigError::Write {
            path: self.path.display().to_string(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, name: &str) -> Option<&WorkspaceConfig> {
        self.workspaces.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.workspaces.contains_key(name)
    }

    pub fn upsert(&mut self, config: WorkspaceConfig) {
        self.workspaces.insert(config.name.clone(), config);
    }

    pub fn remove(&mut self, name: &str) -> Option<WorkspaceConfig> {
        self.workspaces.remove(name)
    }

    pub fn names(&self) -> Vec<WorkspaceName> {
        self.workspaces.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkspaceConfig> {
        self.workspaces.values()
    }

    pub fn active_names(&self) -> Vec<WorkspaceName> {
        self.iter()
            .filter(|config| config.is_active())
            .map(|config| config.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(name: &str, status: WorkspaceStatus) -> WorkspaceConfig {
        WorkspaceConfig {
            name: WorkspaceName::parse(name).expect("name"),
            path: PathBuf::from(format!("/defs/{name}.yaml")),
            status,
            workspace_dir: None,
            template: None,
            created: "2026-01-02T03:04:05.000000001Z".to_string(),
            last_updated: "2026-01-02T03:04:05.000000001Z".to_string(),
            last_used: None,
        }
    }

    #[test]
    fn missing_registry_loads_empty_and_save_creates_it() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("state/workspaces.json");

        let mut registry = WorkspaceRegistry::load(&path).expect("load");
        assert!(registry.is_empty());

        registry.upsert(entry("beta", WorkspaceStatus::Active));
        registry.upsert(entry("alpha", WorkspaceStatus::Inactive));
        registry.save().expect("save");

        let reloaded = WorkspaceRegistry::load(&path).expect("reload");
        assert_eq!(reloaded, registry);
        let names: Vec<_> = reloaded.names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(
            reloaded
                .active_names()
                .iter()
                .map(|n| n.as_str())
                .collect::<Vec<_>>(),
            vec!["beta"]
        );
    }

    #[test]
    fn never_used_workspace_serializes_as_never() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("workspaces.json");
        let mut registry = WorkspaceRegistry::empty(&path);
        registry.upsert(entry("dev", WorkspaceStatus::Inactive));
        registry.save().expect("save");

        let raw = fs::read_to_string(&path).expect("read");
        let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(json["workspaces"]["dev"]["last_used"], "never");
        assert_eq!(json["workspaces"]["dev"]["status"], "inactive");
    }

    #[test]
    fn corrupt_registry_is_a_parse_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("workspaces.json");
        fs::write(&path, "{\"workspaces\": {\"bad name\": {}}}").expect("write");
        assert!(matches!(
            WorkspaceRegistry::load(&path),
            Err(ConfigError::ParseRegistry { .. })
        ));
    }

    #[test]
    fn remove_returns_the_entry() {
        let mut registry = WorkspaceRegistry::empty("/tmp/unused.json");
        registry.upsert(entry("dev", WorkspaceStatus::Inactive));
        let removed = registry.remove("dev").expect("removed");
        assert_eq!(removed.name.as_str(), "dev");
        assert!(!registry.contains("dev"));
        assert!(registry.remove("dev").is_none());
    }
}
