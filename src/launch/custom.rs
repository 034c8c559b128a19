use super::{binary_process_name, AppLauncher, Invocation, LaunchState, Platform};
use crate::process::normalize_process_name;
use serde::Deserialize;

/// An arbitrary command. `process` overrides the executable name used for
/// PID detection when the command is a wrapper script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomApp {
    #[serde(default)]
    pub name: String,
    pub cmd: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub process: Option<String>,
    #[serde(skip)]
    state: LaunchState,
}

impl CustomApp {
    pub fn new(name: &str, cmd: &str) -> Self {
        Self {
            name: name.to_string(),
            cmd: cmd.to_string(),
            ..Self::default()
        }
    }
}

impl AppLauncher for CustomApp {
    fn state(&self) -> &LaunchState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut LaunchState {
        &mut self.state
    }

    fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            return self.process_name();
        }
        self.name.clone()
    }

    fn process_name(&self) -> String {
        match &self.process {
            Some(process) if !process.trim().is_empty() => normalize_process_name(process),
            _ => binary_process_name(&self.cmd),
        }
    }

    fn invocations(&self, _platform: Platform) -> Vec<Invocation> {
        vec![Invocation::new(&self.cmd)
            .args(self.args.iter().cloned())
            .current_dir(self.state.working_dir().cloned())]
    }

    fn summary(&self) -> String {
        format!(
            "Custom app: {}\n  Command: {}\n  Args: {}",
            self.display_name(),
            self.cmd,
            super::format_list(&self.args)
        )
    }

    fn validate(&self) -> Result<(), String> {
        if self.cmd.trim().is_empty() {
            return Err("`cmd` must be non-empty".to_string());
        }
        Ok(())
    }
}
