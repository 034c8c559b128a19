use super::ProcessError;
use std::collections::BTreeSet;
use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};

pub const DEFAULT_DETECTION_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Source of "which PIDs currently run an executable called `name`".
pub trait ProcessTable: Send + Sync {
    fn list_pids(&self, name: &str) -> Result<BTreeSet<u32>, ProcessError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessTable;

impl ProcessTable for SystemProcessTable {
    fn list_pids(&self, name: &str) -> Result<BTreeSet<u32>, ProcessError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(ProcessError::Enumeration(format!(
                "process enumeration is not supported on {}",
                std::env::consts::OS
            )));
        }

        let wanted = normalize_process_name(name);
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::new()
                .with_exe(UpdateKind::OnlyIfNotSet)
                .with_cmd(UpdateKind::OnlyIfNotSet),
        );

        Ok(system
            .processes()
            .iter()
            .filter(|(_, process)| {
                process_matches(&wanted, process.name(), process.exe(), process.cmd())
            })
            .map(|(pid, _)| pid.as_u32())
            .collect())
    }
}

/// Linux truncates `name` to 15 bytes and reports shebang scripts under the
/// interpreter's exe, so the exe file name and the first two argv entries
/// are checked as well.
fn process_matches(wanted: &str, name: &OsStr, exe: Option<&Path>, cmd: &[OsString]) -> bool {
    let same = |candidate: &OsStr| normalize_process_name(&candidate.to_string_lossy()) == wanted;
    if same(name) {
        return true;
    }
    if exe.and_then(Path::file_name).is_some_and(|file| same(file)) {
        return true;
    }
    cmd.iter()
        .take(2)
        .filter_map(|arg| Path::new(arg).file_name())
        .any(|file| same(file))
}

/// Lowercases and strips the platform executable suffix (`.exe` on Windows).
pub fn normalize_process_name(raw: &str) -> String {
    strip_exe_suffix(&raw.trim().to_lowercase(), std::env::consts::EXE_SUFFIX)
}

fn strip_exe_suffix(name: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        return name.to_string();
    }
    name.strip_suffix(suffix).unwrap_or(name).to_string()
}

pub fn diff_pids(after: &BTreeSet<u32>, before: &BTreeSet<u32>) -> BTreeSet<u32> {
    after.difference(before).copied().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionPolicy {
    pub max_wait: Duration,
    pub poll_interval: Duration,
}

impl Default for DetectionPolicy {
    fn default() -> Self {
        Self {
            max_wait: DEFAULT_DETECTION_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Polls until `name` has PIDs that were not in `before`, or the policy's wait
/// budget runs out. Never sleeps past the deadline.
pub fn wait_for_new_pids(
    table: &dyn ProcessTable,
    name: &str,
    before: &BTreeSet<u32>,
    policy: DetectionPolicy,
) -> Result<BTreeSet<u32>, ProcessError> {
    let started = Instant::now();
    let deadline = started + policy.max_wait;
    loop {
        let after = table.list_pids(name)?;
        let fresh = diff_pids(&after, before);
        if !fresh.is_empty() {
            return Ok(fresh);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(ProcessError::DetectionTimeout {
                process: name.to_string(),
                waited_ms: started.elapsed().as_millis() as u64,
            });
        }
        thread::sleep(policy.poll_interval.min(deadline - now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedTable {
        snapshots: Mutex<VecDeque<BTreeSet<u32>>>,
        last: Mutex<BTreeSet<u32>>,
    }

    impl ScriptedTable {
        fn new(snapshots: Vec<Vec<u32>>) -> Self {
            Self {
                snapshots: Mutex::new(
                    snapshots
                        .into_iter()
                        .map(|pids| pids.into_iter().collect())
                        .collect(),
                ),
                last: Mutex::new(BTreeSet::new()),
            }
        }
    }

    impl ProcessTable for ScriptedTable {
        fn list_pids(&self, _name: &str) -> Result<BTreeSet<u32>, ProcessError> {
            let mut last = self.last.lock().unwrap_or_else(|err| err.into_inner());
            if let Some(next) = self
                .snapshots
                .lock()
                .unwrap_or_else(|err| err.into_inner())
                .pop_front()
            {
                *last = next;
            }
            Ok(last.clone())
        }
    }

    fn set(values: &[u32]) -> BTreeSet<u32> {
        values.iter().copied().collect()
    }

    #[test]
    fn diff_is_plain_set_subtraction() {
        assert_eq!(diff_pids(&set(&[1, 2, 3]), &set(&[1, 2])), set(&[3]));
        assert!(diff_pids(&set(&[4, 5]), &set(&[4, 5])).is_empty());
        assert!(diff_pids(&set(&[]), &set(&[7])).is_empty());
        assert_eq!(diff_pids(&set(&[1, 9]), &set(&[2])), set(&[1, 9]));
    }

    #[test]
    fn strips_exe_suffix_only_when_platform_has_one() {
        assert_eq!(strip_exe_suffix("brave.exe", ".exe"), "brave");
        assert_eq!(strip_exe_suffix("brave.exe", ""), "brave.exe");
        assert_eq!(strip_exe_suffix("code", ".exe"), "code");
        assert_eq!(normalize_process_name("  Sioyek "), "sioyek");
    }

    fn argv(values: &[&str]) -> Vec<OsString> {
        values.iter().map(OsString::from).collect()
    }

    #[test]
    fn matches_truncated_names_through_exe_or_argv() {
        let wanted = "hearth-long-sleeper-app";
        assert!(process_matches(
            wanted,
            OsStr::new("hearth-long-sle"),
            Some(Path::new("/opt/bin/hearth-long-sleeper-app")),
            &[],
        ));
        assert!(process_matches(
            wanted,
            OsStr::new("hearth-long-sle"),
            Some(Path::new("/usr/bin/dash")),
            &argv(&["/bin/sh", "/tmp/bin/hearth-long-sleeper-app"]),
        ));
        assert!(!process_matches(
            wanted,
            OsStr::new("sleep"),
            Some(Path::new("/usr/bin/sleep")),
            &argv(&["sleep", "1"]),
        ));
    }

    #[test]
    fn script_names_keep_their_extension() {
        assert!(process_matches(
            "run-api.sh",
            OsStr::new("run-api.sh"),
            None,
            &argv(&["/bin/sh", "./run-api.sh"]),
        ));
        assert!(!process_matches("run-api", OsStr::new("run-api.sh"), None, &[]));
    }

    #[test]
    fn wait_returns_first_non_empty_difference() {
        let table = ScriptedTable::new(vec![vec![10], vec![10], vec![10, 11, 12]]);
        let policy = DetectionPolicy {
            max_wait: Duration::from_secs(2),
            poll_interval: Duration::from_millis(5),
        };

        let fresh = wait_for_new_pids(&table, "app", &set(&[10]), policy).expect("new pids");
        assert_eq!(fresh, set(&[11, 12]));
    }

    #[test]
    fn wait_times_out_within_budget_plus_one_interval() {
        let table = ScriptedTable::new(vec![vec![1, 2]]);
        let policy = DetectionPolicy {
            max_wait: Duration::from_millis(150),
            poll_interval: Duration::from_millis(50),
        };

        let start = Instant::now();
        let err = wait_for_new_pids(&table, "ghost", &set(&[1, 2]), policy).expect_err("timeout");
        let elapsed = start.elapsed();

        assert!(matches!(err, ProcessError::DetectionTimeout { ref process, .. } if process == "ghost"));
        assert!(
            elapsed < policy.max_wait + policy.poll_interval + Duration::from_millis(100),
            "took {elapsed:?}"
        );
    }

    #[test]
    fn zero_budget_still_checks_once() {
        let table = ScriptedTable::new(vec![vec![3]]);
        let policy = DetectionPolicy {
            max_wait: Duration::ZERO,
            poll_interval: Duration::from_millis(200),
        };
        assert_eq!(
            wait_for_new_pids(&table, "x", &set(&[]), policy).expect("immediate"),
            set(&[3])
        );
    }

    #[cfg(unix)]
    #[test]
    fn system_table_sees_the_current_test_process() {
        let table = SystemProcessTable;
        let me = std::process::id();
        let exe = std::env::current_exe().expect("current exe");
        let name = exe
            .file_name()
            .and_then(|v| v.to_str())
            .expect("exe name")
            .to_string();
        // Linux truncates comm names to 15 bytes; either spelling may be reported.
        let short: String = name.chars().take(15).collect();
        let full = table.list_pids(&name).expect("list full");
        let truncated = table.list_pids(&short).expect("list short");
        assert!(
            full.contains(&me) || truncated.contains(&me),
            "{name}: {full:?} / {short}: {truncated:?}"
        );
    }
}
