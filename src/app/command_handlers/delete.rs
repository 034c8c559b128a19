use crate::runtime::{delete_workspace, StatePaths};

pub fn cmd_delete(paths: &StatePaths, args: &[String]) -> Result<String, String> {
    let mut name: Option<&str> = None;
    let mut force = false;
    for arg in args {
        match arg.as_str() {
            "--force" | "-f" => force = true,
            other if other.starts_with('-') => return Err(format!("unknown option {other}")),
            other if name.is_none() => name = Some(other),
            _ => return Err("usage: delete <name> [--force]".to_string()),
        }
    }
    let name = name.ok_or_else(|| "usage: delete <name> [--force]".to_string())?;

    let closed = delete_workspace(paths, name, force).map_err(|e| e.to_string())?;
    let mut lines = vec!["workspace deleted".to_string(), format!("name={name}")];
    if let Some(report) = closed {
        lines.push(format!("closed=true\nkilled={}", report.killed.len()));
    }
    Ok(lines.join("\n"))
}
