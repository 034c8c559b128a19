use super::{AppKind, AppSpec, LaunchError, Launcher};
use crate::config::{ConfigError, WorkspaceDefinition};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Ordered list of apps for one workspace, built from its definition file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub name: String,
    pub working_dir: Option<PathBuf>,
    pub apps: Vec<AppSpec>,
}

impl Plan {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let definition = WorkspaceDefinition::from_path(path)?;
        Self::from_definition(&definition, path)
    }

    pub fn parse(raw: &str, source: &Path) -> Result<Self, ConfigError> {
        let definition = WorkspaceDefinition::parse(raw, source)?;
        Self::from_definition(&definition, source)
    }

    /// Kinds are taken in document order, then entries in list order.
    pub fn from_definition(
        definition: &WorkspaceDefinition,
        source: &Path,
    ) -> Result<Self, ConfigError> {
        let path = source.display().to_string();
        let mut apps = Vec::new();
        for (key, entries) in &definition.apps {
            let raw_kind = key.as_str().ok_or_else(|| ConfigError::UnknownAppKind {
                path: path.clone(),
                kind: yaml_scalar_text(key),
            })?;
            let kind = AppKind::parse(raw_kind).ok_or_else(|| ConfigError::UnknownAppKind {
                path: path.clone(),
                kind: raw_kind.to_string(),
            })?;
            let entries = match entries {
                serde_yaml::Value::Null => Vec::new(),
                serde_yaml::Value::Sequence(entries) => entries.clone(),
                _ => {
                    return Err(ConfigError::InvalidApp {
                        path: path.clone(),
                        kind: raw_kind.to_string(),
                        index: 0,
                        reason: "expected a list of apps".to_string(),
                    })
                }
            };
            for (index, entry) in entries.into_iter().enumerate() {
                let app =
                    AppSpec::from_yaml(kind, entry).map_err(|reason| ConfigError::InvalidApp {
                        path: path.clone(),
                        kind: raw_kind.to_string(),
                        index,
                        reason,
                    })?;
                apps.push(app);
            }
        }

        let mut plan = Self {
            name: definition.name.clone(),
            working_dir: definition.workspace_dir.clone(),
            apps,
        };
        if let Some(dir) = plan.working_dir.clone() {
            plan.set_working_dir(&dir);
        }
        Ok(plan)
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn set_working_dir(&mut self, dir: &Path) {
        self.working_dir = Some(dir.to_path_buf());
        for app in &mut self.apps {
            app.set_working_dir(dir);
        }
    }

    pub fn apply_env(&mut self, env: &BTreeMap<String, String>) {
        for app in &mut self.apps {
            app.set_env(env);
        }
    }

    /// Starts apps in order and stops at the first failure. Apps that already
    /// started keep running and keep their recorded PIDs.
    pub fn start(&mut self, launcher: &Launcher<'_>) -> Result<(), LaunchError> {
        self.start_with(launcher, |_| {})
    }

    pub fn start_with(
        &mut self,
        launcher: &Launcher<'_>,
        mut on_started: impl FnMut(&AppSpec),
    ) -> Result<(), LaunchError> {
        for app in &mut self.apps {
            app.start(launcher)?;
            on_started(app);
        }
        Ok(())
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "Workspace: {}",
            if self.name.is_empty() {
                "(unnamed)"
            } else {
                self.name.as_str()
            }
        )];
        if let Some(dir) = &self.working_dir {
            lines.push(format!("Directory: {}", dir.display()));
        }
        lines.push(format!("Apps: {}", self.apps.len()));
        for (index, app) in self.apps.iter().enumerate() {
            lines.push(format!("{}. {}", index + 1, app.summary()));
        }
        lines.join("\n")
    }

    pub fn pids(&self) -> Vec<BTreeSet<u32>> {
        self.apps.iter().map(|app| app.pids().clone()).collect()
    }

    pub fn process_names(&self) -> Vec<String> {
        self.apps.iter().map(AppSpec::process_name).collect()
    }

    pub fn browser_urls(&self) -> Vec<String> {
        self.apps
            .iter()
            .flat_map(|app| app.browser_urls().iter().cloned())
            .collect()
    }
}

fn yaml_scalar_text(value: &serde_yaml::Value) -> String {
    serde_yaml::to_string(value)
        .map(|text| text.trim().to_string())
        .unwrap_or_else(|_| "<non-scalar>".to_string())
}
