use super::worker_primitives::sleep_with_stop;
use super::{append_runtime_log, RuntimeError, RuntimeRecord, StatePaths, WorkspaceRuntime};
use crate::config::{WorkspaceConfig, WorkspaceRegistry, WorkspaceStatus};
use crate::shared::time::now_rfc3339;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

const DRAIN_SLICE: Duration = Duration::from_millis(10);
const STOP_FILE_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusRequest {
    /// Workspaces to report on; empty means every registered workspace.
    pub names: Vec<String>,
    /// Drops active workspaces started before this instant.
    pub since: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    pub inactive: Vec<WorkspaceConfig>,
    pub active: Vec<RuntimeRecord>,
    pub generated_at: String,
}

impl StatusReport {
    pub fn is_empty(&self) -> bool {
        self.inactive.is_empty() && self.active.is_empty()
    }
}

/// Splits requested names into those the registry knows and those it does
/// not. An empty request selects everything. A name requested more than once
/// is reported once, so `selected.len() + skipped.len()` equals the number of
/// distinct names requested, not `requested.len()`.
fn select(registry: &WorkspaceRegistry, requested: &[String]) -> (Vec<WorkspaceConfig>, Vec<String>) {
    if requested.is_empty() {
        return (registry.iter().cloned().collect(), Vec::new());
    }
    let mut seen = BTreeSet::new();
    let mut selected = Vec::new();
    let mut skipped = Vec::new();
    for name in requested {
        if !seen.insert(name.as_str()) {
            continue;
        }
        match registry.get(name) {
            Some(config) => selected.push(config.clone()),
            None => skipped.push(name.clone()),
        }
    }
    (selected, skipped)
}

fn started_since(record: &RuntimeRecord, since: Option<DateTime<Utc>>) -> bool {
    let Some(since) = since else {
        return true;
    };
    record
        .started_at_time()
        .is_some_and(|started| started >= since)
}

/// Resolves every selected workspace on its own thread. Inactive entries and
/// loaded runtime records flow back over two bounded channels to a single
/// consumer; a workspace whose runtime cannot be loaded is logged and left
/// out of the report.
pub fn collect_status(
    paths: &StatePaths,
    registry: &WorkspaceRegistry,
    request: &StatusRequest,
) -> StatusReport {
    let (selected, skipped) = select(registry, &request.names);
    let bound = selected.len().max(1);
    let (inactive_tx, inactive_rx) = mpsc::sync_channel::<WorkspaceConfig>(bound);
    let (active_tx, active_rx) = mpsc::sync_channel::<RuntimeRecord>(bound);

    let (mut inactive, mut active) = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(selected.len());
        for config in selected {
            let inactive_tx = inactive_tx.clone();
            let active_tx = active_tx.clone();
            let name = config.name.to_string();
            let handle = scope.spawn(move || match config.status {
                WorkspaceStatus::Inactive => {
                    let _ = inactive_tx.send(config);
                }
                WorkspaceStatus::Active => {
                    let runtime = WorkspaceRuntime::new(paths, &config.name);
                    match runtime.load() {
                        Ok(()) if runtime.snapshot().is_recorded() => {
                            let record = runtime.snapshot();
                            if started_since(&record, request.since) {
                                let _ = active_tx.send(record);
                            }
                        }
                        Ok(()) => append_runtime_log(
                            paths,
                            "warn",
                            "status.runtime_dropped",
                            &format!("workspace={} reason=runtime record missing", config.name),
                        ),
                        Err(err) => append_runtime_log(
                            paths,
                            "warn",
                            "status.runtime_dropped",
                            &format!("workspace={} reason={err}", config.name),
                        ),
                    }
                }
            });
            handles.push((name, handle));
        }
        drop(inactive_tx);
        drop(active_tx);

        let collected = drain(&inactive_rx, &active_rx);

        for (name, handle) in handles {
            if handle.join().is_err() {
                append_runtime_log(
                    paths,
                    "error",
                    "status.task_panicked",
                    &format!("workspace={name}"),
                );
            }
        }
        collected
    });

    inactive.sort_by(|left, right| left.name.cmp(&right.name));
    active.sort_by(|left, right| left.name.cmp(&right.name));
    StatusReport {
        skipped,
        inactive,
        active,
        generated_at: now_rfc3339(),
    }
}

/// Reads both channels until every producer has hung up.
fn drain(
    inactive_rx: &Receiver<WorkspaceConfig>,
    active_rx: &Receiver<RuntimeRecord>,
) -> (Vec<WorkspaceConfig>, Vec<RuntimeRecord>) {
    let mut inactive = Vec::new();
    let mut active = Vec::new();
    let mut inactive_open = true;
    let mut active_open = true;
    while inactive_open || active_open {
        if inactive_open {
            match inactive_rx.recv_timeout(DRAIN_SLICE) {
                Ok(config) => inactive.push(config),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => inactive_open = false,
            }
        }
        if active_open {
            match active_rx.recv_timeout(DRAIN_SLICE) {
                Ok(record) => active.push(record),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => active_open = false,
            }
        }
    }
    (inactive, active)
}

/// Runs `frame` once, then again every `interval` until `stop` is set or
/// `max_frames` frames have been produced.
pub fn watch_status(
    interval: Duration,
    stop: &AtomicBool,
    max_frames: Option<u64>,
    mut frame: impl FnMut(u64),
) -> u64 {
    let mut produced = 0;
    loop {
        produced += 1;
        frame(produced);
        if max_frames.is_some_and(|max| produced >= max) {
            return produced;
        }
        if !sleep_with_stop(stop, interval) {
            return produced;
        }
    }
}

/// Asks every running [`watch_status_until_signalled`] to stop after its
/// current frame.
pub fn signal_watch_stop(paths: &StatePaths) -> Result<(), RuntimeError> {
    let path = paths.watch_stop_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| RuntimeError::CreateDir {
            path: parent.display().to_string(),
            source,
        })?;
    }
    fs::write(&path, b"stop").map_err(|source| RuntimeError::WriteState {
        path: path.display().to_string(),
        source,
    })
}

/// [`watch_status`] that also ends when the watch stop file appears. A stale
/// stop file is cleared before the first frame and the file is removed again
/// on exit.
pub fn watch_status_until_signalled(
    paths: &StatePaths,
    interval: Duration,
    stop: &AtomicBool,
    max_frames: Option<u64>,
    frame: impl FnMut(u64),
) -> u64 {
    let stop_path = paths.watch_stop_path();
    let _ = fs::remove_file(&stop_path);
    let finished = AtomicBool::new(false);

    let frames = thread::scope(|scope| {
        scope.spawn(|| {
            while !finished.load(Ordering::Relaxed) && !stop.load(Ordering::Relaxed) {
                if stop_path.exists() {
                    stop.store(true, Ordering::Relaxed);
                    append_runtime_log(
                        paths,
                        "info",
                        "status.watch.stop_signal",
                        "stop file detected",
                    );
                    break;
                }
                thread::sleep(STOP_FILE_POLL);
            }
        });
        let frames = watch_status(interval, stop, max_frames, frame);
        finished.store(true, Ordering::Relaxed);
        frames
    });

    let _ = fs::remove_file(&stop_path);
    frames
}
