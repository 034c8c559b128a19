use super::LaunchError;
use crate::process::{wait_for_new_pids, DetectionPolicy, ProcessTable};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            _ => Self::Other,
        }
    }

    pub fn is_windows(self) -> bool {
        self == Self::Windows
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::Linux => "linux",
            Self::Other => std::env::consts::OS,
        })
    }
}

/// One program to spawn. Built purely from app parameters so it can be
/// inspected without starting anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.current_dir = dir;
        self
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Mutable state every app carries: its environment overlay, working
/// directory, and the PIDs attributed to it once started.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchState {
    env: BTreeMap<String, String>,
    working_dir: Option<PathBuf>,
    pids: BTreeSet<u32>,
    started: bool,
}

impl LaunchState {
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn working_dir(&self) -> Option<&PathBuf> {
        self.working_dir.as_ref()
    }

    pub fn pids(&self) -> &BTreeSet<u32> {
        &self.pids
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Merges `env` into the overlay. Ignored once the app has started.
    pub fn set_env(&mut self, env: &BTreeMap<String, String>) {
        if self.started {
            return;
        }
        self.env
            .extend(env.iter().map(|(key, value)| (key.clone(), value.clone())));
    }

    pub fn set_working_dir(&mut self, dir: PathBuf) {
        self.working_dir = Some(dir);
    }

    pub(crate) fn record_started(&mut self, pids: BTreeSet<u32>) {
        self.pids.extend(pids);
        self.started = true;
    }
}

pub struct Launcher<'a> {
    processes: &'a dyn ProcessTable,
    detection: DetectionPolicy,
    platform: Platform,
}

impl<'a> Launcher<'a> {
    pub fn new(processes: &'a dyn ProcessTable, detection: DetectionPolicy) -> Self {
        Self {
            processes,
            detection,
            platform: Platform::current(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Snapshots `process`, spawns every invocation, then waits for the new
    /// PIDs those spawns produced.
    pub fn launch(
        &self,
        app: &str,
        process: &str,
        invocations: &[Invocation],
        env: &BTreeMap<String, String>,
    ) -> Result<BTreeSet<u32>, LaunchError> {
        if invocations.is_empty() {
            return Ok(BTreeSet::new());
        }
        let before = self
            .processes
            .list_pids(process)
            .map_err(|source| LaunchError::Process {
                app: app.to_string(),
                source,
            })?;
        for invocation in invocations {
            spawn_detached(app, invocation, env)?;
        }
        wait_for_new_pids(self.processes, process, &before, self.detection).map_err(|source| {
            LaunchError::Process {
                app: app.to_string(),
                source,
            }
        })
    }
}

fn spawn_detached(
    app: &str,
    invocation: &Invocation,
    env: &BTreeMap<String, String>,
) -> Result<u32, LaunchError> {
    let mut command = Command::new(&invocation.program);
    command
        .args(&invocation.args)
        .envs(env)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    if let Some(dir) = &invocation.current_dir {
        command.current_dir(dir);
    }
    let child = command.spawn().map_err(|source| LaunchError::Spawn {
        app: app.to_string(),
        program: invocation.program.clone(),
        source,
    })?;
    Ok(child.id())
}
