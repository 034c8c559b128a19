use super::ConfigError;
use crate::shared::fs_atomic::atomic_write_file;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const STARTER_HEADER: &str = "\
# hearth workspace definition
#
# Apps are grouped by kind and start in the order they appear here.
# Supported kinds: custom, browser, editor, terminal, viewer.
# A custom app's PID is found by its command's file name; set `process`
# when the command is a wrapper that starts something else.
#
# apps:
#   custom:
#     - name: api
#       cmd: ./scripts/run-api.sh
#       args: [\"--port\", \"8080\"]
#     - name: web
#       cmd: ./scripts/start-web.sh
#       process: node
#   browser:
#     - tabs: [\"http://localhost:8080\"]
#   editor:
#     - path: .
#   terminal:
#     - tabs: [\"cargo watch -x test\"]
#   viewer:
#     - files: [docs/design.pdf]
";

/// On-disk shape of `workspaces/<name>.yaml`. Apps stay as a raw mapping so
/// their declaration order survives until the launch plan is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default)]
    pub apps: serde_yaml::Mapping,
}

impl WorkspaceDefinition {
    pub fn starter(name: &str, workspace_dir: Option<PathBuf>, template: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            workspace_dir,
            template,
            apps: serde_yaml::Mapping::new(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw, path)
    }

    pub fn parse(raw: &str, source: &Path) -> Result<Self, ConfigError> {
        if is_blank_document(raw) {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|err| ConfigError::Parse {
            path: source.display().to_string(),
            source: err,
        })
    }

    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        let body = serde_yaml::to_string(self).map_err(|source| ConfigError::Encode {
            path: path.display().to_string(),
            source,
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let content = format!("{STARTER_HEADER}\n{body}");
        atomic_write_file(path, content.as_bytes()).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
    }
}

fn is_blank_document(raw: &str) -> bool {
    raw.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}
