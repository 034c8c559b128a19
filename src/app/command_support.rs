use crate::config::{ConfigError, Settings, WorkspaceRegistry};
use crate::runtime::{bootstrap_state_root, default_state_root_path, StatePaths};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

/// Pulls `--state-root PATH` (or `--state-root=PATH`) out of `args`, wherever
/// it appears.
pub fn split_state_root(args: Vec<String>) -> Result<(Option<PathBuf>, Vec<String>), String> {
    let mut state_root = None;
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--state-root" {
            let value = iter
                .next()
                .ok_or_else(|| "--state-root requires a path".to_string())?;
            state_root = Some(PathBuf::from(value));
        } else if let Some(value) = arg.strip_prefix("--state-root=") {
            if value.is_empty() {
                return Err("--state-root requires a path".to_string());
            }
            state_root = Some(PathBuf::from(value));
        } else {
            rest.push(arg);
        }
    }
    Ok((state_root, rest))
}

fn state_root(explicit: Option<&Path>) -> Result<PathBuf, String> {
    match explicit {
        Some(root) => Ok(root.to_path_buf()),
        None => default_state_root_path().map_err(|e| e.to_string()),
    }
}

pub fn ensure_runtime_root(explicit: Option<&Path>) -> Result<StatePaths, String> {
    let root = state_root(explicit)?;
    let paths = StatePaths::new(root);
    bootstrap_state_root(&paths).map_err(|e| e.to_string())?;
    Ok(paths)
}

pub fn load_settings(paths: &StatePaths) -> Result<Settings, String> {
    Settings::load_or_default(&paths.settings_file()).map_err(map_config_err)
}

pub fn load_registry(paths: &StatePaths) -> Result<WorkspaceRegistry, String> {
    WorkspaceRegistry::load(&paths.registry_path()).map_err(map_config_err)
}

/// Returns the value following the flag at `args[*index]` and advances past it.
pub fn flag_value(args: &[String], index: &mut usize, flag: &str) -> Result<String, String> {
    let value = args
        .get(*index + 1)
        .ok_or_else(|| format!("{flag} requires a value"))?;
    *index += 2;
    Ok(value.clone())
}

pub fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid env `{raw}` (expected KEY=VALUE)"))?;
    if key.trim().is_empty() {
        return Err(format!("invalid env `{raw}` (empty key)"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

/// Parses durations such as `90s`, `15m`, `1h30m`, `2d` or `500ms`.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let input = raw.trim();
    if input.is_empty() {
        return Err("duration must be non-empty".to_string());
    }
    let invalid = || format!("invalid duration `{raw}` (examples: 90s, 15m, 1h30m, 2d)");

    let mut total = Duration::ZERO;
    let mut rest = input;
    while !rest.is_empty() {
        let digits = rest
            .find(|ch: char| !ch.is_ascii_digit())
            .ok_or_else(invalid)?;
        if digits == 0 {
            return Err(invalid());
        }
        let amount: u64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];
        let unit_len = rest
            .find(|ch: char| ch.is_ascii_digit())
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];
        let step = match unit {
            "ms" => Duration::from_millis(amount),
            "s" => Duration::from_secs(amount),
            "m" => Duration::from_secs(amount.saturating_mul(60)),
            "h" => Duration::from_secs(amount.saturating_mul(3600)),
            "d" => Duration::from_secs(amount.saturating_mul(86_400)),
            _ => return Err(invalid()),
        };
        total = total.saturating_add(step);
    }
    Ok(total)
}

pub fn parse_positive(raw: &str, flag: &str) -> Result<u64, String> {
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(format!("{flag} must be a positive integer")),
    }
}

/// Left-aligned columns separated by two spaces, header first.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.len()).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let render_row = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(index, cell)| {
                let width = widths.get(index).copied().unwrap_or(0);
                format!("{cell:<width$}")
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render_row(headers.to_vec())];
    for row in rows {
        lines.push(render_row(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let kept: String = value.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
