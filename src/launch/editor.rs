use super::{binary_process_name, AppLauncher, Invocation, LaunchState, Platform};
use serde::Deserialize;

pub const DEFAULT_EDITOR: &str = "code";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditorApp {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub binary: Option<String>,
    #[serde(skip)]
    state: LaunchState,
}

impl EditorApp {
    fn binary(&self) -> &str {
        self.binary
            .as_deref()
            .filter(|binary| !binary.trim().is_empty())
            .unwrap_or(DEFAULT_EDITOR)
    }

    /// The explicit path, falling back to the workspace directory.
    fn target(&self) -> Option<String> {
        self.path
            .clone()
            .filter(|path| !path.is_empty())
            .or_else(|| {
                self.state
                    .working_dir()
                    .map(|dir| dir.display().to_string())
            })
    }
}

impl AppLauncher for EditorApp {
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
        let mut editor_args: Vec<String> = self.target().into_iter().collect();
        editor_args.extend(self.args.iter().cloned());
        let dir = self.state.working_dir().cloned();

        // `code` is a .cmd shim on Windows and needs the shell to resolve it.
        if platform.is_windows() {
            return vec![Invocation::new("cmd")
                .args(["/C", self.binary()])
                .args(editor_args)
                .current_dir(dir)];
        }
        vec![Invocation::new(self.binary())
            .args(editor_args)
            .current_dir(dir)]
    }

    fn summary(&self) -> String {
        format!(
            "Editor: {}\n  Path: {}",
            self.display_name(),
            self.target().unwrap_or_else(|| ".".to_string())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn opens_the_working_dir_when_no_path_is_given() {
        let mut app: EditorApp = serde_yaml::from_str("args: [--new-window]").expect("parse");
        app.state_mut().set_working_dir(PathBuf::from("/src/hearth"));

        let invocation = &app.invocations(Platform::Linux)[0];
        assert_eq!(invocation.program, "code");
        assert_eq!(invocation.args, vec!["/src/hearth", "--new-window"]);
        assert_eq!(invocation.current_dir, Some(PathBuf::from("/src/hearth")));
    }

    #[test]
    fn explicit_path_and_binary_win() {
        let app: EditorApp =
            serde_yaml::from_str("path: /etc/hosts\nbinary: /usr/local/bin/zed").expect("parse");
        let invocation = &app.invocations(Platform::MacOs)[0];
        assert_eq!(invocation.program, "/usr/local/bin/zed");
        assert_eq!(invocation.args, vec!["/etc/hosts"]);
        assert_eq!(app.process_name(), "zed");
    }

    #[test]
    fn windows_goes_through_cmd() {
        let app: EditorApp = serde_yaml::from_str("path: C:\\src").expect("parse");
        let invocation = &app.invocations(Platform::Windows)[0];
        assert_eq!(invocation.program, "cmd");
        assert_eq!(invocation.args, vec!["/C", "code", "C:\\src"]);
    }
}
