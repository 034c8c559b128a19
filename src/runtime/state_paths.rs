use super::RuntimeError;
use crate::config::{
    DEFINITION_FILE_EXTENSION, GLOBAL_SETTINGS_FILE_NAME, GLOBAL_STATE_DIR, REGISTRY_FILE_NAME,
    RUNTIME_FILE_EXTENSION,
};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    pub root: PathBuf,
}

impl StatePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn required_directories(&self) -> Vec<PathBuf> {
        vec![
            self.definitions_dir(),
            self.state_dir(),
            self.runtime_dir(),
            self.root.join("logs"),
        ]
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join(GLOBAL_SETTINGS_FILE_NAME)
    }

    pub fn definitions_dir(&self) -> PathBuf {
        self.root.join("workspaces")
    }

    pub fn definition_path(&self, name: &str) -> PathBuf {
        self.definitions_dir()
            .join(format!("{name}.{DEFINITION_FILE_EXTENSION}"))
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join("state")
    }

    pub fn registry_path(&self) -> PathBuf {
        self.state_dir().join(REGISTRY_FILE_NAME)
    }

    pub fn runtime_dir(&self) -> PathBuf {
        self.state_dir().join("workspaces")
    }

    pub fn runtime_path(&self, name: &str) -> PathBuf {
        self.runtime_dir()
            .join(format!("{name}.{RUNTIME_FILE_EXTENSION}"))
    }

    /// Presence of this file asks every running `status --watch` to stop.
    pub fn watch_stop_path(&self) -> PathBuf {
        self.state_dir().join("watch.stop")
    }

    pub fn runtime_log_path(&self) -> PathBuf {
        self.root.join("logs/runtime.log")
    }
}

pub const DEFAULT_STATE_ROOT_DIR: &str = GLOBAL_STATE_DIR;

pub fn default_state_root_path() -> Result<PathBuf, RuntimeError> {
    let home = std::env::var_os("HOME").ok_or(RuntimeError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(DEFAULT_STATE_ROOT_DIR))
}

pub fn bootstrap_state_root(paths: &StatePaths) -> Result<(), RuntimeError> {
    for path in paths.required_directories() {
        fs::create_dir_all(&path).map_err(|source| RuntimeError::CreateDir {
            path: path.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn layout_is_rooted_under_the_state_root() {
        let paths = StatePaths::new("/home/me/.hearth");
        assert_eq!(paths.settings_file(), PathBuf::from("/home/me/.hearth/config.yaml"));
        assert_eq!(
            paths.definition_path("dev"),
            PathBuf::from("/home/me/.hearth/workspaces/dev.yaml")
        );
        assert_eq!(
            paths.registry_path(),
            PathBuf::from("/home/me/.hearth/state/workspaces.json")
        );
        assert_eq!(
            paths.runtime_path("dev"),
            PathBuf::from("/home/me/.hearth/state/workspaces/dev.json")
        );
        assert_eq!(
            paths.watch_stop_path(),
            PathBuf::from("/home/me/.hearth/state/watch.stop")
        );
    }

    #[test]
    fn bootstrap_creates_every_required_directory() {
        let dir = tempdir().expect("tempdir");
        let paths = StatePaths::new(dir.path().join("root"));
        bootstrap_state_root(&paths).expect("bootstrap");
        bootstrap_state_root(&paths).expect("idempotent");
        for required in paths.required_directories() {
            assert!(required.is_dir(), "{}", required.display());
        }
    }
}
