use super::{append_runtime_log, RuntimeError, RuntimeRecord, StatePaths, WorkspaceRuntime};
use crate::config::{
    ConfigError, Settings, WorkspaceConfig, WorkspaceDefinition, WorkspaceRegistry,
    WorkspaceStatus,
};
use crate::launch::{LaunchError, Launcher, Plan};
use crate::process::{kill, ProcessTable};
use crate::shared::fs_atomic::remove_file_if_exists;
use crate::shared::ids::WorkspaceName;
use crate::shared::time::{now_rfc3339, parse_rfc3339};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("workspace `{name}` does not exist")]
    NotFound { name: String },
    #[error("workspace `{name}` is already active")]
    AlreadyActive { name: String },
    #[error("workspace `{name}` is already inactive")]
    AlreadyInactive { name: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

fn parse_name(raw: &str) -> Result<WorkspaceName, ConfigError> {
    WorkspaceName::parse(raw).map_err(|reason| ConfigError::InvalidWorkspaceName {
        name: raw.to_string(),
        reason,
    })
}

fn load_registry(paths: &StatePaths) -> Result<WorkspaceRegistry, ConfigError> {
    WorkspaceRegistry::load(&paths.registry_path())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitOptions {
    pub workspace_dir: Option<PathBuf>,
    pub template: Option<String>,
    pub force: bool,
}

/// Writes a starter definition and registers the workspace as inactive.
pub fn init_workspace(
    paths: &StatePaths,
    name: &str,
    options: &InitOptions,
) -> Result<WorkspaceConfig, WorkspaceError> {
    let name = parse_name(name)?;
    let mut registry = load_registry(paths)?;
    let definition_path = paths.definition_path(name.as_str());

    if let Some(existing) = registry.get(name.as_str()) {
        if existing.is_active() {
            return Err(WorkspaceError::AlreadyActive {
                name: name.to_string(),
            });
        }
    }
    if !options.force && (registry.contains(name.as_str()) || definition_path.exists()) {
        return Err(ConfigError::WorkspaceExists {
            name: name.to_string(),
        }
        .into());
    }

    WorkspaceDefinition::starter(
        name.as_str(),
        options.workspace_dir.clone(),
        options.template.clone(),
    )
    .write(&definition_path)?;

    let now = now_rfc3339();
    let config = WorkspaceConfig {
        name: name.clone(),
        path: definition_path,
        status: WorkspaceStatus::Inactive,
        workspace_dir: options.workspace_dir.clone(),
        template: options.template.clone(),
        created: now.clone(),
        last_updated: now,
        last_used: None,
    };
    registry.upsert(config.clone());
    registry.save()?;

    append_runtime_log(
        paths,
        "info",
        "workspace.init",
        &format!("workspace={name} path={}", config.path.display()),
    );
    Ok(config)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    pub env: BTreeMap<String, String>,
    pub detach: bool,
    pub dry_run: bool,
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    DryRun { summary: String },
    Launched { record: RuntimeRecord },
}

/// Builds the plan from the definition file and starts it. The runtime
/// record and registry are only written once every app has started.
pub fn launch_workspace(
    paths: &StatePaths,
    settings: &Settings,
    processes: &dyn ProcessTable,
    name: &str,
    options: &LaunchOptions,
) -> Result<LaunchOutcome, WorkspaceError> {
    let name = parse_name(name)?;
    let mut registry = load_registry(paths)?;
    let mut config = registry
        .get(name.as_str())
        .cloned()
        .ok_or_else(|| WorkspaceError::NotFound {
            name: name.to_string(),
        })?;
    if config.is_active() && !options.force {
        return Err(WorkspaceError::AlreadyActive {
            name: name.to_string(),
        });
    }

    let mut plan = Plan::load(&config.path)?;
    if plan.name.is_empty() {
        plan.name = name.to_string();
    }
    if plan.working_dir.is_none() {
        if let Some(dir) = config.workspace_dir.clone() {
            plan.set_working_dir(&dir);
        }
    }
    plan.apply_env(&options.env);

    if options.dry_run {
        return Ok(LaunchOutcome::DryRun {
            summary: plan.summary(),
        });
    }

    if config.is_active() {
        append_runtime_log(
            paths,
            "info",
            "workspace.launch.restarting",
            &format!("workspace={name}"),
        );
        close_registered(paths, &mut registry, &name)?;
        config = registry
            .get(name.as_str())
            .cloned()
            .ok_or_else(|| WorkspaceError::NotFound {
                name: name.to_string(),
            })?;
    }

    append_runtime_log(
        paths,
        "info",
        "workspace.launch.started",
        &format!("workspace={name} apps={}", plan.len()),
    );
    let launcher = Launcher::new(processes, settings.detection_policy());
    let started = plan.start_with(&launcher, |app| {
        append_runtime_log(
            paths,
            "info",
            "workspace.launch.app_started",
            &format!(
                "workspace={name} app={} process={} pids={:?}",
                app.name(),
                app.process_name(),
                app.pids()
            ),
        );
    });
    if let Err(err) = started {
        append_runtime_log(
            paths,
            "error",
            "workspace.launch.failed",
            &format!("workspace={name} app={} error={err}", err.app()),
        );
        return Err(err.into());
    }

    let runtime = WorkspaceRuntime::new(paths, &name);
    runtime.update(&plan);
    runtime.set_detached(options.detach);
    runtime.save()?;

    config.status = WorkspaceStatus::Active;
    config.last_updated = now_rfc3339();
    registry.upsert(config);
    registry.save()?;

    let record = runtime.snapshot();
    append_runtime_log(
        paths,
        "info",
        "workspace.launch.completed",
        &format!(
            "workspace={name} apps={} pids={}",
            record.app_count,
            record.all_pids().len()
        ),
    );
    Ok(LaunchOutcome::Launched { record })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseReport {
    pub name: String,
    pub killed: Vec<u32>,
    pub failures: Vec<(u32, String)>,
}

pub fn close_workspace(paths: &StatePaths, name: &str) -> Result<CloseReport, WorkspaceError> {
    let name = parse_name(name)?;
    let mut registry = load_registry(paths)?;
    close_registered(paths, &mut registry, &name)
}

/// Kills every recorded PID, removes the runtime file, and marks the
/// workspace inactive. Kill failures are collected rather than fatal.
fn close_registered(
    paths: &StatePaths,
    registry: &mut WorkspaceRegistry,
    name: &WorkspaceName,
) -> Result<CloseReport, WorkspaceError> {
    let mut config = registry
        .get(name.as_str())
        .cloned()
        .ok_or_else(|| WorkspaceError::NotFound {
            name: name.to_string(),
        })?;
    if !config.is_active() {
        return Err(WorkspaceError::AlreadyInactive {
            name: name.to_string(),
        });
    }

    let runtime = WorkspaceRuntime::new(paths, name);
    runtime.load()?;
    let mut report = CloseReport {
        name: name.to_string(),
        killed: Vec::new(),
        failures: Vec::new(),
    };
    for pid in runtime.snapshot().all_pids() {
        match kill(pid) {
            Ok(()) => report.killed.push(pid),
            Err(err) => {
                append_runtime_log(
                    paths,
                    "warn",
                    "workspace.close.kill_failed",
                    &format!("workspace={name} pid={pid} error={err}"),
                );
                report.failures.push((pid, err.to_string()));
            }
        }
    }

    match runtime.delete() {
        Ok(()) => {}
        Err(err) if err.is_not_found() => {}
        Err(err) => return Err(err.into()),
    }

    let now = now_rfc3339();
    config.status = WorkspaceStatus::Inactive;
    config.last_used = Some(now.clone());
    config.last_updated = now;
    registry.upsert(config);
    registry.save()?;

    append_runtime_log(
        paths,
        "info",
        "workspace.close.completed",
        &format!(
            "workspace={name} killed={} failed={}",
            report.killed.len(),
            report.failures.len()
        ),
    );
    Ok(report)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseAllReport {
    pub closed: Vec<CloseReport>,
    pub errors: Vec<(String, String)>,
}

/// Closes every active workspace, continuing past individual failures.
pub fn close_all_workspaces(paths: &StatePaths) -> Result<CloseAllReport, WorkspaceError> {
    let mut registry = load_registry(paths)?;
    let mut report = CloseAllReport::default();
    for name in registry.active_names() {
        match close_registered(paths, &mut registry, &name) {
            Ok(closed) => report.closed.push(closed),
            Err(err) => report.errors.push((name.to_string(), err.to_string())),
        }
    }
    Ok(report)
}

/// Removes a workspace's registry entry and definition file. An active
/// workspace is only deleted with `force`, after closing it.
pub fn delete_workspace(
    paths: &StatePaths,
    name: &str,
    force: bool,
) -> Result<Option<CloseReport>, WorkspaceError> {
    let name = parse_name(name)?;
    let mut registry = load_registry(paths)?;
    let config = registry
        .get(name.as_str())
        .cloned()
        .ok_or_else(|| WorkspaceError::NotFound {
            name: name.to_string(),
        })?;

    let closed = if config.is_active() {
        if !force {
            return Err(WorkspaceError::AlreadyActive {
                name: name.to_string(),
            });
        }
        Some(close_registered(paths, &mut registry, &name)?)
    } else {
        None
    };

    registry.remove(name.as_str());
    registry.save()?;
    remove_file_if_exists(&config.path).map_err(|source| ConfigError::Remove {
        path: config.path.display().to_string(),
        source,
    })?;

    append_runtime_log(
        paths,
        "info",
        "workspace.delete.completed",
        &format!("workspace={name}"),
    );
    Ok(closed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl ListFilter {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(format!(
                "invalid filter `{other}` (expected all, active or inactive)"
            )),
        }
    }

    fn matches(self, config: &WorkspaceConfig) -> bool {
        match self {
            Self::All => true,
            Self::Active => config.status == WorkspaceStatus::Active,
            Self::Inactive => config.status == WorkspaceStatus::Inactive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListSort {
    #[default]
    Name,
    LastUsed,
    Status,
}

impl ListSort {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "name" => Ok(Self::Name),
            "last_used" | "last-used" => Ok(Self::LastUsed),
            "status" => Ok(Self::Status),
            other => Err(format!(
                "invalid sort `{other}` (expected name, last_used or status)"
            )),
        }
    }
}

/// Registry entries filtered by status. Never-used workspaces sort after
/// used ones; ties fall back to name order.
pub fn list_workspaces(
    paths: &StatePaths,
    filter: ListFilter,
    sort: ListSort,
) -> Result<Vec<WorkspaceConfig>, WorkspaceError> {
    let registry = load_registry(paths)?;
    let mut configs: Vec<WorkspaceConfig> = registry
        .iter()
        .filter(|config| filter.matches(config))
        .cloned()
        .collect();
    match sort {
        ListSort::Name => {}
        ListSort::LastUsed => configs.sort_by_cached_key(|config| {
            let used = config.last_used.as_deref().and_then(parse_rfc3339);
            (used.is_none(), used)
        }),
        ListSort::Status => configs.sort_by_key(|config| config.status.as_str()),
    }
    Ok(configs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessError;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::tempdir;

    struct NoProcesses;

    impl ProcessTable for NoProcesses {
        fn list_pids(&self, _name: &str) -> Result<BTreeSet<u32>, ProcessError> {
            Ok(BTreeSet::new())
        }
    }

    fn setup() -> (tempfile::TempDir, StatePaths) {
        let dir = tempdir().expect("tempdir");
        let paths = StatePaths::new(dir.path().join(".hearth"));
        crate::runtime::bootstrap_state_root(&paths).expect("bootstrap");
        (dir, paths)
    }

    fn launch(paths: &StatePaths, name: &str) -> Result<LaunchOutcome, WorkspaceError> {
        launch_workspace(
            paths,
            &Settings::default(),
            &NoProcesses,
            name,
            &LaunchOptions::default(),
        )
    }

    #[test]
    fn init_registers_an_inactive_never_used_workspace() {
        let (_dir, paths) = setup();
        let config = init_workspace(&paths, "dev", &InitOptions::default()).expect("init");
        assert_eq!(config.status, WorkspaceStatus::Inactive);
        assert!(config.last_used.is_none());
        assert!(paths.definition_path("dev").is_file());

        let err = init_workspace(&paths, "dev", &InitOptions::default()).expect_err("exists");
        assert!(err.to_string().contains("already exists"));

        init_workspace(
            &paths,
            "dev",
            &InitOptions {
                force: true,
                ..InitOptions::default()
            },
        )
        .expect("forced re-init");
    }

    #[test]
    fn init_rejects_invalid_names() {
        let (_dir, paths) = setup();
        let err = init_workspace(&paths, "../evil", &InitOptions::default()).expect_err("invalid");
        assert!(matches!(
            err,
            WorkspaceError::Config(ConfigError::InvalidWorkspaceName { .. })
        ));
    }

    #[test]
    fn launch_then_close_round_trip() {
        let (_dir, paths) = setup();
        let created = init_workspace(&paths, "dev", &InitOptions::default()).expect("init");

        let outcome = launch(&paths, "dev").expect("launch");
        let LaunchOutcome::Launched { record } = outcome else {
            panic!("expected a real launch");
        };
        assert_eq!(record.name, "dev");
        assert_eq!(record.app_count, 0);
        assert!(paths.runtime_path("dev").is_file());
        assert!(matches!(
            launch(&paths, "dev"),
            Err(WorkspaceError::AlreadyActive { .. })
        ));

        let report = close_workspace(&paths, "dev").expect("close");
        assert!(report.killed.is_empty());
        assert!(!paths.runtime_path("dev").exists());

        let registry = WorkspaceRegistry::load(&paths.registry_path()).expect("registry");
        let config = registry.get("dev").expect("entry");
        assert_eq!(config.status, WorkspaceStatus::Inactive);
        let last_used = config.last_used.as_deref().and_then(parse_rfc3339).expect("last used");
        assert!(last_used > parse_rfc3339(&created.created).expect("created"));
        let closed = config.clone();

        assert!(matches!(
            close_workspace(&paths, "dev"),
            Err(WorkspaceError::AlreadyInactive { .. })
        ));
        let registry = WorkspaceRegistry::load(&paths.registry_path()).expect("registry");
        let after = registry.get("dev").expect("entry");
        assert_eq!(after.last_used, closed.last_used);
        assert_eq!(after.last_updated, closed.last_updated);
        assert_eq!(after, &closed);
    }

    #[test]
    fn close_tolerates_a_missing_runtime_file() {
        let (_dir, paths) = setup();
        init_workspace(&paths, "dev", &InitOptions::default()).expect("init");
        launch(&paths, "dev").expect("launch");
        fs::remove_file(paths.runtime_path("dev")).expect("remove runtime");

        close_workspace(&paths, "dev").expect("close without runtime");
    }

    #[test]
    fn dry_run_has_no_side_effects() {
        let (_dir, paths) = setup();
        init_workspace(&paths, "dev", &InitOptions::default()).expect("init");
        fs::write(
            paths.definition_path("dev"),
            "apps:\n  custom:\n    - name: api\n      cmd: /bin/api\n",
        )
        .expect("definition");

        let outcome = launch_workspace(
            &paths,
            &Settings::default(),
            &NoProcesses,
            "dev",
            &LaunchOptions {
                dry_run: true,
                ..LaunchOptions::default()
            },
        )
        .expect("dry run");
        match outcome {
            LaunchOutcome::DryRun { summary } => assert!(summary.contains("Custom app: api")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!paths.runtime_path("dev").exists());
        let registry = WorkspaceRegistry::load(&paths.registry_path()).expect("registry");
        assert!(!registry.get("dev").expect("entry").is_active());
    }

    #[test]
    fn failed_launch_leaves_the_workspace_inactive() {
        let (_dir, paths) = setup();
        init_workspace(&paths, "dev", &InitOptions::default()).expect("init");
        fs::write(
            paths.definition_path("dev"),
            "apps:\n  custom:\n    - name: ghost\n      cmd: /definitely/missing/hearth-app\n",
        )
        .expect("definition");

        let err = launch(&paths, "dev").expect_err("spawn fails");
        assert!(matches!(err, WorkspaceError::Launch(LaunchError::Spawn { .. })));
        assert!(!paths.runtime_path("dev").exists());
        let log = fs::read_to_string(paths.runtime_log_path()).expect("log");
        assert!(log.contains("workspace.launch.failed"));
    }

    #[test]
    fn close_all_only_touches_active_workspaces() {
        let (_dir, paths) = setup();
        for name in ["a", "b", "c"] {
            init_workspace(&paths, name, &InitOptions::default()).expect("init");
        }
        launch(&paths, "a").expect("launch a");
        launch(&paths, "c").expect("launch c");

        let report = close_all_workspaces(&paths).expect("close all");
        let closed: Vec<_> = report.closed.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(closed, vec!["a", "c"]);
        assert!(report.errors.is_empty());

        let registry = WorkspaceRegistry::load(&paths.registry_path()).expect("registry");
        assert!(registry.get("b").expect("b").last_used.is_none());
        assert!(registry.iter().all(|config| !config.is_active()));
    }

    #[test]
    fn delete_requires_force_for_active_workspaces() {
        let (_dir, paths) = setup();
        init_workspace(&paths, "dev", &InitOptions::default()).expect("init");
        launch(&paths, "dev").expect("launch");

        assert!(matches!(
            delete_workspace(&paths, "dev", false),
            Err(WorkspaceError::AlreadyActive { .. })
        ));
        let closed = delete_workspace(&paths, "dev", true).expect("forced delete");
        assert!(closed.is_some());
        assert!(!paths.definition_path("dev").exists());
        assert!(matches!(
            delete_workspace(&paths, "dev", false),
            Err(WorkspaceError::NotFound { .. })
        ));
    }

    #[test]
    fn list_filters_and_sorts() {
        let (_dir, paths) = setup();
        for name in ["zeta", "alpha", "mid"] {
            init_workspace(&paths, name, &InitOptions::default()).expect("init");
        }
        launch(&paths, "mid").expect("launch");
        close_workspace(&paths, "mid").expect("close");
        launch(&paths, "zeta").expect("launch");

        let names = |configs: Vec<WorkspaceConfig>| -> Vec<String> {
            configs.into_iter().map(|c| c.name.to_string()).collect()
        };
        assert_eq!(
            names(list_workspaces(&paths, ListFilter::All, ListSort::Name).expect("list")),
            vec!["alpha", "mid", "zeta"]
        );
        assert_eq!(
            names(list_workspaces(&paths, ListFilter::Active, ListSort::Name).expect("list")),
            vec!["zeta"]
        );
        assert_eq!(
            names(list_workspaces(&paths, ListFilter::All, ListSort::LastUsed).expect("list"))[0],
            "mid"
        );
        assert_eq!(
            names(list_workspaces(&paths, ListFilter::All, ListSort::Status).expect("list"))[0],
            "zeta"
        );
        assert!(ListFilter::parse("sleeping").is_err());
        assert_eq!(ListSort::parse("last-used"), Ok(ListSort::LastUsed));
    }
}
