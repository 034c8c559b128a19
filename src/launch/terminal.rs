use super::{binary_process_name, format_list, AppLauncher, Invocation, LaunchState, Platform};
use serde::Deserialize;

const WINDOWS_SHELL: &str = "powershell";
const UNIX_SHELL: &str = "bash";

/// Terminal tabs. On Windows each tab is a Windows Terminal tab running a
/// PowerShell; elsewhere each tab is a tmux window running the shell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TerminalApp {
    #[serde(default)]
    pub tabs: Vec<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub shell: Option<String>,
    #[serde(skip)]
    state: LaunchState,
}

impl TerminalApp {
    fn shell(&self, platform: Platform) -> &str {
        match self.shell.as_deref().filter(|shell| !shell.trim().is_empty()) {
            Some(shell) => shell,
            None if platform.is_windows() => WINDOWS_SHELL,
            None => UNIX_SHELL,
        }
    }

    /// A terminal with no tab commands still opens one interactive tab.
    fn tab_commands(&self) -> Vec<Option<&str>> {
        if self.tabs.is_empty() {
            return vec![None];
        }
        self.tabs.iter().map(|tab| Some(tab.as_str())).collect()
    }

    fn windows_invocations(&self) -> Vec<Invocation> {
        let shell = self.shell(Platform::Windows);
        let program = if shell.to_ascii_lowercase().ends_with(".exe") {
            shell.to_string()
        } else {
            format!("{shell}.exe")
        };
        self.tab_commands()
            .into_iter()
            .map(|tab| {
                let mut args = vec!["-w".to_string(), "new-tab".to_string()];
                if let Some(dir) = self.state.working_dir() {
                    args.push("--startingDirectory".to_string());
                    args.push(dir.display().to_string());
                }
                args.push(program.clone());
                args.extend(self.args.iter().cloned());
                if let Some(tab) = tab {
                    args.push("-Command".to_string());
                    args.push(tab.to_string());
                }
                Invocation::new("wt").args(args)
            })
            .collect()
    }

    pub(crate) fn tmux_invocations(&self, platform: Platform, inside_tmux: bool) -> Vec<Invocation> {
        let shell = self.shell(platform);
        self.tab_commands()
            .into_iter()
            .map(|tab| {
                let mut args: Vec<String> = if inside_tmux {
                    vec!["new-window".to_string()]
                } else {
                    vec!["new-session".to_string(), "-d".to_string()]
                };
                if let Some(dir) = self.state.working_dir() {
                    args.push("-c".to_string());
                    args.push(dir.display().to_string());
                }
                args.push(shell.to_string());
                args.extend(self.args.iter().cloned());
                if let Some(tab) = tab {
                    // Drop back into an interactive shell so the window outlives the command.
                    args.push("-c".to_string());
                    args.push(format!("{tab}; exec {shell}"));
                }
                Invocation::new("tmux").args(args)
            })
            .collect()
    }
}

impl AppLauncher for TerminalApp {
    fn state(&self) -> &LaunchState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut LaunchState {
        &mut self.state
    }

    fn display_name(&self) -> String {
        "terminal".to_string()
    }

    fn process_name(&self) -> String {
        binary_process_name(self.shell(Platform::current()))
    }

    fn invocations(&self, platform: Platform) -> Vec<Invocation> {
        if platform.is_windows() {
            return self.windows_invocations();
        }
        self.tmux_invocations(platform, std::env::var_os("TMUX").is_some())
    }

    fn summary(&self) -> String {
        format!(
            "Terminal: {}\n  Tabs: {}",
            self.shell(Platform::current()),
            format_list(&self.tabs)
        )
    }
}
