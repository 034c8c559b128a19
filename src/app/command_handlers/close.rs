use crate::runtime::{close_all_workspaces, close_workspace, CloseReport, StatePaths};

const USAGE: &str = "usage: close <name> | close --all";

fn render_close(report: &CloseReport) -> String {
    let mut lines = vec![
        "workspace closed".to_string(),
        format!("name={}", report.name),
        format!("killed={}", report.killed.len()),
    ];
    for (pid, error) in &report.failures {
        lines.push(format!("kill_failed pid={pid} error={error}"));
    }
    lines.join("\n")
}

pub fn cmd_close(paths: &StatePaths, args: &[String]) -> Result<String, String> {
    match args {
        [flag] if flag == "--all" || flag == "-a" => cmd_close_all(paths),
        [name] if !name.starts_with('-') => {
            let report = close_workspace(paths, name).map_err(|e| e.to_string())?;
            Ok(render_close(&report))
        }
        _ => Err(USAGE.to_string()),
    }
}

fn cmd_close_all(paths: &StatePaths) -> Result<String, String> {
    let report = close_all_workspaces(paths).map_err(|e| e.to_string())?;
    if report.closed.is_empty() && report.errors.is_empty() {
        return Ok("No active workspaces found to close.".to_string());
    }

    let mut sections: Vec<String> = report.closed.iter().map(render_close).collect();
    if report.errors.is_empty() {
        sections.push(format!("closed={}", report.closed.len()));
        return Ok(sections.join("\n"));
    }
    for (name, error) in &report.errors {
        sections.push(format!("close_failed name={name} error={error}"));
    }
    Err(sections.join("\n"))
}
