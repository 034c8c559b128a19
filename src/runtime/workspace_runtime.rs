use super::{atomic_write_file, RuntimeError, StatePaths};
use crate::launch::Plan;
use crate::shared::ids::WorkspaceName;
use crate::shared::time::{now_rfc3339, parse_rfc3339};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// What a running workspace looks like on disk: one PID group per app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub started_at: String,
    #[serde(default)]
    pub app_count: usize,
    #[serde(default)]
    pub pids: Vec<Vec<u32>>,
    #[serde(default)]
    pub processes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<u16>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub browser_urls: Vec<String>,
    #[serde(default)]
    pub is_detached: bool,
}

impl RuntimeRecord {
    pub fn all_pids(&self) -> Vec<u32> {
        self.pids.iter().flatten().copied().collect()
    }

    pub fn started_at_time(&self) -> Option<DateTime<Utc>> {
        parse_rfc3339(&self.started_at)
    }

    pub fn is_recorded(&self) -> bool {
        !self.started_at.is_empty()
    }
}

/// Runtime record of one workspace plus the file it persists to. Every
/// operation holds the internal lock for its full duration.
#[derive(Debug)]
pub struct WorkspaceRuntime {
    path: Option<PathBuf>,
    record: Mutex<RuntimeRecord>,
}

impl WorkspaceRuntime {
    pub fn new(paths: &StatePaths, name: &WorkspaceName) -> Self {
        Self::at(paths.runtime_path(name.as_str()), name)
    }

    pub fn at(path: impl Into<PathBuf>, name: &WorkspaceName) -> Self {
        Self {
            path: Some(path.into()),
            record: Mutex::new(RuntimeRecord {
                name: name.to_string(),
                ..RuntimeRecord::default()
            }),
        }
    }

    /// A runtime with no backing file; persistence calls fail with `PathUnset`.
    pub fn unbound(name: &WorkspaceName) -> Self {
        Self {
            path: None,
            record: Mutex::new(RuntimeRecord {
                name: name.to_string(),
                ..RuntimeRecord::default()
            }),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, RuntimeRecord> {
        self.record.lock().unwrap_or_else(|err| err.into_inner())
    }

    fn require_path(&self, record: &RuntimeRecord) -> Result<&Path, RuntimeError> {
        self.path.as_deref().ok_or_else(|| RuntimeError::PathUnset {
            workspace: record.name.clone(),
        })
    }

    /// Replaces the in-memory record with the file's contents. A missing file
    /// leaves the record untouched.
    pub fn load(&self) -> Result<(), RuntimeError> {
        let mut record = self.lock();
        let path = self.require_path(&record)?;
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(RuntimeError::ReadState {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        *record = serde_json::from_str(&raw).map_err(|source| RuntimeError::ParseState {
            path: path.display().to_string(),
            source,
        })?;
        Ok(())
    }

    pub fn save(&self) -> Result<(), RuntimeError> {
        let record = self.lock();
        let path = self.require_path(&record)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| RuntimeError::CreateDir {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let body =
            serde_json::to_vec_pretty(&*record).map_err(|source| RuntimeError::EncodeState {
                path: path.display().to_string(),
                source,
            })?;
        atomic_write_file(path, &body).map_err(|source| RuntimeError::WriteState {
            path: path.display().to_string(),
            source,
        })
    }

    /// Removes the backing file. A missing file is reported, not ignored;
    /// callers that tolerate it check [`RuntimeError::is_not_found`].
    pub fn delete(&self) -> Result<(), RuntimeError> {
        let record = self.lock();
        let path = self.require_path(&record)?;
        fs::remove_file(path).map_err(|source| RuntimeError::DeleteState {
            path: path.display().to_string(),
            source,
        })
    }

    /// Captures a started plan: a fresh timestamp, one PID group per app, and
    /// every browser URL.
    pub fn update(&self, plan: &Plan) {
        let mut record = self.lock();
        record.started_at = now_rfc3339();
        record.app_count = plan.len();
        record.pids = plan
            .pids()
            .into_iter()
            .map(|group| group.into_iter().collect())
            .collect();
        record.processes = plan.process_names();
        record.browser_urls = plan.browser_urls();
    }

    pub fn set_detached(&self, detached: bool) {
        self.lock().is_detached = detached;
    }

    pub fn snapshot(&self) -> RuntimeRecord {
        self.lock().clone()
    }
}
