pub mod browser;
pub mod custom;
pub mod editor;
pub mod plan;
pub mod spawn;
pub mod terminal;
pub mod viewer;

use crate::process::{normalize_process_name, ProcessError};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub use browser::BrowserApp;
pub use custom::CustomApp;
pub use editor::EditorApp;
pub use plan::Plan;
pub use spawn::{Invocation, LaunchState, Launcher, Platform};
pub use terminal::TerminalApp;
pub use viewer::ViewerApp;

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("failed to start {app}: could not spawn `{program}`: {source}")]
    Spawn {
        app: String,
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to start {app}: {source}")]
    Process {
        app: String,
        #[source]
        source: ProcessError,
    },
    #[error("failed to start {app}: {reason} on {platform}")]
    UnsupportedPlatform {
        app: String,
        platform: Platform,
        reason: String,
    },
}

impl LaunchError {
    pub fn app(&self) -> &str {
        match self {
            Self::Spawn { app, .. }
            | Self::Process { app, .. }
            | Self::UnsupportedPlatform { app, .. } => app,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AppKind {
    Custom,
    Browser,
    Editor,
    Terminal,
    Viewer,
}

impl AppKind {
    pub const ALL: [AppKind; 5] = [
        AppKind::Custom,
        AppKind::Browser,
        AppKind::Editor,
        AppKind::Terminal,
        AppKind::Viewer,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::Browser => "browser",
            Self::Editor => "editor",
            Self::Terminal => "terminal",
            Self::Viewer => "viewer",
        }
    }
}

impl std::fmt::Display for AppKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behaviour each app kind provides on top of the shared [`LaunchState`].
pub(crate) trait AppLauncher {
    fn state(&self) -> &LaunchState;
    fn state_mut(&mut self) -> &mut LaunchState;
    fn display_name(&self) -> String;
    fn process_name(&self) -> String;
    fn invocations(&self, platform: Platform) -> Vec<Invocation>;
    fn summary(&self) -> String;
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
    /// Rejects platforms the app has no way to start on.
    fn supports(&self, _platform: Platform) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppSpec {
    Custom(CustomApp),
    Browser(BrowserApp),
    Editor(EditorApp),
    Terminal(TerminalApp),
    Viewer(ViewerApp),
}

impl AppSpec {
    /// Decodes one entry of an `apps.<kind>` list. Unknown fields are errors.
    pub fn from_yaml(kind: AppKind, value: serde_yaml::Value) -> Result<Self, String> {
        let value = match value {
            serde_yaml::Value::Null => serde_yaml::Value::Mapping(serde_yaml::Mapping::new()),
            other => other,
        };
        let app = match kind {
            AppKind::Custom => serde_yaml::from_value(value).map(Self::Custom),
            AppKind::Browser => serde_yaml::from_value(value).map(Self::Browser),
            AppKind::Editor => serde_yaml::from_value(value).map(Self::Editor),
            AppKind::Terminal => serde_yaml::from_value(value).map(Self::Terminal),
            AppKind::Viewer => serde_yaml::from_value(value).map(Self::Viewer),
        }
        .map_err(|err| err.to_string())?;
        app.launcher().validate()?;
        Ok(app)
    }

    fn launcher(&self) -> &dyn AppLauncher {
        match self {
            Self::Custom(app) => app,
            Self::Browser(app) => app,
            Self::Editor(app) => app,
            Self::Terminal(app) => app,
            Self::Viewer(app) => app,
        }
    }

    fn launcher_mut(&mut self) -> &mut dyn AppLauncher {
        match self {
            Self::Custom(app) => app,
            Self::Browser(app) => app,
            Self::Editor(app) => app,
            Self::Terminal(app) => app,
            Self::Viewer(app) => app,
        }
    }

    pub fn kind(&self) -> AppKind {
        match self {
            Self::Custom(_) => AppKind::Custom,
            Self::Browser(_) => AppKind::Browser,
            Self::Editor(_) => AppKind::Editor,
            Self::Terminal(_) => AppKind::Terminal,
            Self::Viewer(_) => AppKind::Viewer,
        }
    }

    pub fn name(&self) -> String {
        self.launcher().display_name()
    }

    pub fn process_name(&self) -> String {
        self.launcher().process_name()
    }

    pub fn pids(&self) -> &BTreeSet<u32> {
        self.launcher().state().pids()
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        self.launcher().state().env()
    }

    pub fn working_dir(&self) -> Option<&PathBuf> {
        self.launcher().state().working_dir()
    }

    pub fn is_started(&self) -> bool {
        self.launcher().state().is_started()
    }

    pub fn set_env(&mut self, env: &BTreeMap<String, String>) {
        self.launcher_mut().state_mut().set_env(env);
    }

    pub fn set_working_dir(&mut self, dir: &Path) {
        self.launcher_mut()
            .state_mut()
            .set_working_dir(dir.to_path_buf());
    }

    pub fn invocations(&self, platform: Platform) -> Vec<Invocation> {
        self.launcher().invocations(platform)
    }

    pub fn summary(&self) -> String {
        self.launcher().summary()
    }

    /// URLs opened by browser apps; empty for every other kind.
    pub fn browser_urls(&self) -> &[String] {
        match self {
            Self::Browser(app) => &app.tabs,
            _ => &[],
        }
    }

    pub fn start(&mut self, launcher: &Launcher<'_>) -> Result<(), LaunchError> {
        let app = self.name();
        let platform = launcher.platform();
        self.launcher()
            .supports(platform)
            .map_err(|reason| LaunchError::UnsupportedPlatform {
                app: app.clone(),
                platform,
                reason,
            })?;
        let process = self.process_name();
        let invocations = self.invocations(platform);
        let pids = launcher.launch(&app, &process, &invocations, self.env())?;
        self.launcher_mut().state_mut().record_started(pids);
        Ok(())
    }
}

/// Process name derived from an executable path: the file name, with only
/// the platform executable suffix removed.
pub(crate) fn binary_process_name(binary: &str) -> String {
    let file = Path::new(binary)
        .file_name()
        .and_then(|file| file.to_str())
        .unwrap_or(binary);
    normalize_process_name(file)
}

pub(crate) fn format_list(values: &[String]) -> String {
    if values.is_empty() {
        return "none".to_string();
    }
    values.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_kinds_parse_exactly() {
        for kind in AppKind::ALL {
            assert_eq!(AppKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(AppKind::parse("Browser"), None);
        assert_eq!(AppKind::parse("ide"), None);
    }

    #[test]
    fn binary_process_name_uses_the_file_name() {
        assert_eq!(binary_process_name("/usr/bin/sioyek"), "sioyek");
        assert_eq!(binary_process_name("Brave"), "brave");
        assert_eq!(binary_process_name("./scripts/run-api.sh"), "run-api.sh");
        assert_eq!(binary_process_name("tools/server.py"), "server.py");
    }

    #[test]
    fn unknown_fields_are_rejected_per_kind() {
        let value: serde_yaml::Value =
            serde_yaml::from_str("tabs: [\"https://a.test\"]\nincognito: true").expect("yaml");
        let err = AppSpec::from_yaml(AppKind::Browser, value).expect_err("unknown field");
        assert!(err.contains("incognito"));
    }

    #[test]
    fn browser_urls_only_come_from_browsers() {
        let browser = AppSpec::from_yaml(
            AppKind::Browser,
            serde_yaml::from_str("tabs: [\"https://a.test\", \"https://b.test\"]").expect("yaml"),
        )
        .expect("browser");
        assert_eq!(browser.browser_urls(), ["https://a.test", "https://b.test"]);

        let editor = AppSpec::from_yaml(AppKind::Editor, serde_yaml::Value::Null).expect("editor");
        assert!(editor.browser_urls().is_empty());
        assert_eq!(editor.process_name(), "code");
    }

    struct EmptyTable;

    impl crate::process::ProcessTable for EmptyTable {
        fn list_pids(&self, _name: &str) -> Result<BTreeSet<u32>, ProcessError> {
            Ok(BTreeSet::new())
        }
    }

    #[test]
    fn viewer_without_a_known_location_is_unsupported() {
        let mut app = AppSpec::from_yaml(
            AppKind::Viewer,
            serde_yaml::from_str("files: [notes.pdf]").expect("yaml"),
        )
        .expect("viewer");
        let launcher = Launcher::new(&EmptyTable, crate::process::DetectionPolicy::default())
            .with_platform(Platform::Other);

        let err = app.start(&launcher).expect_err("unsupported");
        assert!(matches!(err, LaunchError::UnsupportedPlatform { .. }));
        assert_eq!(err.app(), "sioyek");
        assert!(!app.is_started());
    }

    #[test]
    fn working_dir_and_env_reach_every_kind() {
        let mut app = AppSpec::from_yaml(
            AppKind::Terminal,
            serde_yaml::from_str("tabs: [htop]").expect("yaml"),
        )
        .expect("terminal");
        app.set_working_dir(Path::new("/srv/project"));
        app.set_env(&BTreeMap::from([("RUST_LOG".to_string(), "debug".to_string())]));
        assert_eq!(app.working_dir(), Some(&PathBuf::from("/srv/project")));
        assert_eq!(app.env().get("RUST_LOG").map(String::as_str), Some("debug"));
        assert!(!app.is_started());
    }
}
