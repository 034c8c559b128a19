pub mod kill;
pub mod snapshot;

pub use kill::kill;
pub use snapshot::{
    diff_pids, normalize_process_name, wait_for_new_pids, DetectionPolicy, ProcessTable,
    SystemProcessTable, DEFAULT_DETECTION_TIMEOUT, DEFAULT_POLL_INTERVAL,
};

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to enumerate processes: {0}")]
    Enumeration(String),
    #[error("timed out after {waited_ms}ms waiting for a new `{process}` process")]
    DetectionTimeout { process: String, waited_ms: u64 },
    #[error("failed to kill pid {pid}: {reason}")]
    Kill { pid: u32, reason: String },
}
