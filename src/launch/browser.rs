use super::{binary_process_name, format_list, AppLauncher, Invocation, LaunchState, Platform};
use serde::Deserialize;

pub const DEFAULT_BROWSER: &str = "brave";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrowserApp {
    #[serde(default)]
    pub tabs: Vec<String>,
    #[serde(default)]
    pub profile_dir: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub binary: Option<String>,
    #[serde(skip)]
    state: LaunchState,
}

impl BrowserApp {
    fn binary(&self) -> &str {
        self.binary
            .as_deref()
            .filter(|binary| !binary.trim().is_empty())
            .unwrap_or(DEFAULT_BROWSER)
    }

    fn browser_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(profile) = self.profile_dir.as_deref().filter(|p| !p.is_empty()) {
            args.push(format!("--user-data-dir={profile}"));
        }
        args.extend(self.args.iter().cloned());
        args.extend(self.tabs.iter().cloned());
        args
    }
}

impl AppLauncher for BrowserApp {
    fn state(&self) -> &LaunchState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut LaunchState {
        &mut self.state
    }

    fn display_name(&self) -> String {
        self.process_name()
    }

    fn process_name(&self) -> String {
        binary_process_name(self.binary())
    }

    fn invocations(&self, platform: Platform) -> Vec<Invocation> {
        let dir = self.state.working_dir().cloned();
        if platform.is_windows() {
            // `start` hands off to the registered app path; the empty string is the window title.
            let binary = self.binary();
            let program = if binary.to_ascii_lowercase().ends_with(".exe") {
                binary.to_string()
            } else {
                format!("{binary}.exe")
            };
            return vec![Invocation::new("cmd")
                .args(["/C", "start", "", program.as_str()])
                .args(self.browser_args())
                .current_dir(dir)];
        }
        vec![Invocation::new(self.binary())
            .args(self.browser_args())
            .current_dir(dir)]
    }

    fn summary(&self) -> String {
        format!(
            "Browser: {}\n  Tabs: {}\n  Profile: {}",
            self.display_name(),
            format_list(&self.tabs),
            self.profile_dir.as_deref().unwrap_or("default")
        )
    }
}
