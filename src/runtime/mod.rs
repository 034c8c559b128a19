pub mod lifecycle;
pub mod logging;
pub mod state_paths;
pub mod status;
pub(crate) mod worker_primitives;
pub mod workspace_runtime;

pub use crate::shared::errors::RuntimeError;
pub(crate) use crate::shared::fs_atomic::atomic_write_file;
pub(crate) use crate::shared::time::now_secs;
pub use lifecycle::{
    close_all_workspaces, close_workspace, delete_workspace, init_workspace, launch_workspace,
    list_workspaces, CloseAllReport, CloseReport, InitOptions, LaunchOptions, LaunchOutcome,
    ListFilter, ListSort, WorkspaceError,
};
pub use logging::append_runtime_log;
pub use state_paths::{
    bootstrap_state_root, default_state_root_path, StatePaths, DEFAULT_STATE_ROOT_DIR,
};
pub use status::{
    collect_status, signal_watch_stop, watch_status, watch_status_until_signalled, StatusReport,
    StatusRequest,
};
pub use workspace_runtime::{RuntimeRecord, WorkspaceRuntime};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn default_state_root_lives_under_home() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|err| err.into_inner());
        let temp = tempdir().expect("temp dir");
        let old_home = std::env::var_os("HOME");
        std::env::set_var("HOME", temp.path());

        let root = default_state_root_path().expect("state root");
        assert_eq!(root, temp.path().join(".hearth"));

        std::env::remove_var("HOME");
        assert!(matches!(
            default_state_root_path(),
            Err(RuntimeError::HomeDirectoryUnavailable)
        ));

        if let Some(value) = old_home {
            std::env::set_var("HOME", value);
        }
    }
}
