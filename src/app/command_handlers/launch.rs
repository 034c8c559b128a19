use crate::app::command_support::{flag_value, load_settings, parse_env_pair};
use crate::process::SystemProcessTable;
use crate::runtime::{launch_workspace, LaunchOptions, LaunchOutcome, StatePaths};

const USAGE: &str = "usage: launch <name> [--env KEY=VALUE]... [--detach] [--dry-run] [--force]";

pub fn cmd_launch(paths: &StatePaths, args: &[String]) -> Result<String, String> {
    let mut name: Option<String> = None;
    let mut options = LaunchOptions::default();

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--env" | "-e" => {
                let (key, value) = parse_env_pair(&flag_value(args, &mut i, "--env")?)?;
                options.env.insert(key, value);
            }
            "--detach" | "-d" => {
                options.detach = true;
                i += 1;
            }
            "--dry-run" => {
                options.dry_run = true;
                i += 1;
            }
            "--force" => {
                options.force = true;
                i += 1;
            }
            other if other.starts_with('-') => return Err(format!("unknown option {other}")),
            other => {
                if name.is_some() {
                    return Err(USAGE.to_string());
                }
                name = Some(other.to_string());
                i += 1;
            }
        }
    }
    let name = name.ok_or_else(|| USAGE.to_string())?;

    let settings = load_settings(paths)?;
    let outcome = launch_workspace(paths, &settings, &SystemProcessTable, &name, &options)
        .map_err(|e| e.to_string())?;
    match outcome {
        LaunchOutcome::DryRun { summary } => Ok(format!("dry run, nothing started\n{summary}")),
        LaunchOutcome::Launched { record } => {
            let pids = record
                .all_pids()
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(",");
            Ok(format!(
                "workspace launched\nname={}\napps={}\npids={}\ndetached={}\nstarted_at={}",
                record.name, record.app_count, pids, record.is_detached, record.started_at
            ))
        }
    }
}
