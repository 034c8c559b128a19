use super::list::render_workspace_table;
use crate::app::command_support::{
    flag_value, load_registry, load_settings, parse_duration, parse_positive, render_table,
    truncate,
};
use crate::runtime::{
    collect_status, signal_watch_stop, watch_status_until_signalled, RuntimeRecord, StatePaths,
    StatusReport, StatusRequest,
};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const PID_COLUMN_WIDTH: usize = 30;
const VERBOSE_PID_THRESHOLD: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct StatusArgs {
    names: Vec<String>,
    json: bool,
    verbose: bool,
    since: Option<Duration>,
    watch: bool,
    interval: Option<Duration>,
    iterations: Option<u64>,
    stop_watch: bool,
}

fn parse_status_args(args: &[String]) -> Result<StatusArgs, String> {
    let mut parsed = StatusArgs::default();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => {
                parsed.json = true;
                i += 1;
            }
            "--verbose" | "-v" => {
                parsed.verbose = true;
                i += 1;
            }
            "--watch" | "-w" => {
                parsed.watch = true;
                i += 1;
            }
            "--stop-watch" => {
                parsed.stop_watch = true;
                i += 1;
            }
            "--since" => {
                parsed.since = Some(parse_duration(&flag_value(args, &mut i, "--since")?)?);
            }
            "--interval" => {
                let secs = parse_positive(&flag_value(args, &mut i, "--interval")?, "--interval")?;
                parsed.interval = Some(Duration::from_secs(secs));
            }
            "--iterations" => {
                parsed.iterations = Some(parse_positive(
                    &flag_value(args, &mut i, "--iterations")?,
                    "--iterations",
                )?);
            }
            other if other.starts_with('-') => return Err(format!("unknown option {other}")),
            name => {
                parsed.names.push(name.to_string());
                i += 1;
            }
        }
    }
    Ok(parsed)
}

fn pid_list(record: &RuntimeRecord) -> String {
    record
        .all_pids()
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn render_active_table(records: &[RuntimeRecord]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            vec![
                record.name.clone(),
                "active".to_string(),
                record.started_at.clone(),
                truncate(&pid_list(record), PID_COLUMN_WIDTH),
                record.processes.join(","),
            ]
        })
        .collect();
    render_table(&["NAME", "STATUS", "STARTED_AT", "PIDS", "PROCESSES"], &rows)
}

fn render_verbose_details(record: &RuntimeRecord) -> String {
    let mut lines = vec![format!("[{}]", record.name)];
    if record.all_pids().len() > VERBOSE_PID_THRESHOLD {
        lines.push(format!("  PIDs: {}", pid_list(record)));
    }
    if !record.ports.is_empty() {
        let ports: Vec<String> = record.ports.iter().map(u16::to_string).collect();
        lines.push(format!("  Ports: {}", ports.join(", ")));
    }
    if !record.browser_urls.is_empty() {
        lines.push(format!("  URLs: {}", record.browser_urls.join(", ")));
    }
    lines.push(format!("  Detached: {}", record.is_detached));
    lines.join("\n")
}

pub(crate) fn render_status_text(report: &StatusReport, verbose: bool) -> String {
    let mut sections = Vec::new();
    if !report.skipped.is_empty() {
        sections.push(format!(
            "Skipped unknown workspaces: {}",
            report.skipped.join(", ")
        ));
    }
    if report.is_empty() {
        sections.push("No workspaces found.".to_string());
        return sections.join("\n\n");
    }
    if !report.active.is_empty() {
        sections.push(format!("Active workspaces ({}):", report.active.len()));
        sections.push(render_active_table(&report.active));
        if verbose {
            sections.extend(report.active.iter().map(render_verbose_details));
        }
    }
    if !report.inactive.is_empty() {
        sections.push(format!("Inactive workspaces ({}):", report.inactive.len()));
        sections.push(render_workspace_table(&report.inactive));
    }
    sections.join("\n\n")
}

fn render_status_json(report: &StatusReport) -> Result<String, String> {
    serde_json::to_string_pretty(report).map_err(|e| format!("failed to encode status: {e}"))
}

fn status_once(paths: &StatePaths, parsed: &StatusArgs) -> Result<String, String> {
    let registry = load_registry(paths)?;
    let since = match parsed.since {
        Some(window) => {
            let window = chrono::Duration::from_std(window)
                .map_err(|_| "--since window is too large".to_string())?;
            Some(Utc::now() - window)
        }
        None => None,
    };
    let report = collect_status(
        paths,
        &registry,
        &StatusRequest {
            names: parsed.names.clone(),
            since,
        },
    );
    if parsed.json {
        return render_status_json(&report);
    }
    Ok(render_status_text(&report, parsed.verbose))
}

pub fn cmd_status(paths: &StatePaths, args: &[String]) -> Result<String, String> {
    let parsed = parse_status_args(args)?;
    if parsed.stop_watch {
        if parsed.watch {
            return Err("--stop-watch cannot be combined with --watch".to_string());
        }
        signal_watch_stop(paths).map_err(|e| e.to_string())?;
        return Ok("watch stop requested".to_string());
    }
    if !parsed.watch {
        return status_once(paths, &parsed);
    }

    let interval = match parsed.interval {
        Some(interval) => interval,
        None => load_settings(paths)?.watch_interval(),
    };
    let stop = AtomicBool::new(false);
    let mut failure = None;
    let frames = watch_status_until_signalled(paths, interval, &stop, parsed.iterations, |_| {
        match status_once(paths, &parsed) {
            Ok(frame) => println!("{frame}\n"),
            Err(err) => {
                failure = Some(err);
                stop.store(true, Ordering::Relaxed);
            }
        }
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(format!("watch stopped\nframes={frames}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn record(name: &str, pids: Vec<Vec<u32>>) -> RuntimeRecord {
        RuntimeRecord {
            name: name.to_string(),
            started_at: "2026-05-01T09:00:00Z".to_string(),
            app_count: pids.len(),
            pids,
            processes: vec!["brave".to_string(), "code".to_string()],
            ports: vec![8080],
            browser_urls: vec!["http://localhost:8080".to_string()],
            is_detached: false,
        }
    }

    #[test]
    fn parses_names_and_flags_in_any_order() {
        let parsed = parse_status_args(&args(&[
            "web", "--json", "api", "--since", "1h", "--watch", "--iterations", "2",
        ]))
        .expect("parse");
        assert_eq!(parsed.names, vec!["web", "api"]);
        assert!(parsed.json && parsed.watch);
        assert_eq!(parsed.since, Some(Duration::from_secs(3600)));
        assert_eq!(parsed.iterations, Some(2));

        assert!(!parsed.stop_watch);
        assert!(parse_status_args(&args(&["--stop-watch"])).expect("parse").stop_watch);

        assert!(parse_status_args(&args(&["--interval", "0"])).is_err());
        assert!(parse_status_args(&args(&["--bogus"])).is_err());
    }

    #[test]
    fn long_pid_lists_are_truncated_in_the_table_and_expanded_in_verbose() {
        let report = StatusReport {
            skipped: vec!["ghost".to_string()],
            inactive: Vec::new(),
            active: vec![record(
                "web",
                vec![vec![100001, 100002, 100003], vec![100004, 100005, 100006, 100007]],
            )],
            generated_at: "now".to_string(),
        };

        let plain = render_status_text(&report, false);
        assert!(plain.starts_with("Skipped unknown workspaces: ghost"));
        assert!(plain.contains("100001,100002,100003,100004..."));
        assert!(!plain.contains("Detached"));

        let verbose = render_status_text(&report, true);
        assert!(verbose.contains("PIDs: 100001,100002,100003,100004,100005,100006,100007"));
        assert!(verbose.contains("Ports: 8080"));
        assert!(verbose.contains("URLs: http://localhost:8080"));
        assert!(verbose.contains("Detached: false"));
    }

    #[test]
    fn empty_report_says_so() {
        let report = StatusReport {
            skipped: Vec::new(),
            inactive: Vec::new(),
            active: Vec::new(),
            generated_at: "now".to_string(),
        };
        assert_eq!(render_status_text(&report, false), "No workspaces found.");
    }

    #[test]
    fn stop_watch_writes_the_stop_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = StatePaths::new(dir.path());
        let out = cmd_status(&paths, &args(&["--stop-watch"])).expect("stop");
        assert_eq!(out, "watch stop requested");
        assert!(paths.watch_stop_path().is_file());

        assert!(cmd_status(&paths, &args(&["--stop-watch", "--watch"])).is_err());
    }
}
