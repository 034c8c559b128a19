use super::{format_list, AppLauncher, Invocation, LaunchState, Platform};
use serde::Deserialize;

pub const VIEWER_PROCESS: &str = "sioyek";

fn default_viewer_path(platform: Platform) -> Option<&'static str> {
    match platform {
        Platform::Windows => Some(r"C:\Program Files\sioyek\sioyek.exe"),
        Platform::MacOs => Some("/Applications/sioyek.app/Contents/MacOS/sioyek"),
        Platform::Linux => Some("/usr/bin/sioyek"),
        Platform::Other => None,
    }
}

/// Document viewer; every file opens in its own window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewerApp {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(skip)]
    state: LaunchState,
}

impl ViewerApp {
    fn binary(&self, platform: Platform) -> Option<String> {
        self.path
            .clone()
            .filter(|path| !path.trim().is_empty())
            .or_else(|| default_viewer_path(platform).map(str::to_string))
    }
}

impl AppLauncher for ViewerApp {
    fn state(&self) -> &LaunchState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut LaunchState {
        &mut self.state
    }

    fn display_name(&self) -> String {
        VIEWER_PROCESS.to_string()
    }

    fn process_name(&self) -> String {
        VIEWER_PROCESS.to_string()
    }

    fn invocations(&self, platform: Platform) -> Vec<Invocation> {
        let Some(binary) = self.binary(platform) else {
            return Vec::new();
        };
        let dir = self.state.working_dir().cloned();
        self.files
            .iter()
            .map(|file| {
                Invocation::new(binary.as_str())
                    .args(["--new-window", file.as_str()])
                    .args(self.args.iter().cloned())
                    .current_dir(dir.clone())
            })
            .collect()
    }

    fn summary(&self) -> String {
        format!(
            "Viewer: {}\n  Files: {}",
            self.binary(Platform::current())
                .unwrap_or_else(|| VIEWER_PROCESS.to_string()),
            format_list(&self.files)
        )
    }

    fn supports(&self, platform: Platform) -> Result<(), String> {
        if self.files.is_empty() || self.binary(platform).is_some() {
            return Ok(());
        }
        Err("no default viewer location; set `path`".to_string())
    }
}
