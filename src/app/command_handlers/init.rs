use crate::app::command_support::flag_value;
use crate::runtime::{init_workspace, InitOptions, StatePaths};
use std::path::PathBuf;

const USAGE: &str = "usage: init <name> [--dir PATH] [--template NAME] [--force]";

pub fn cmd_init(paths: &StatePaths, args: &[String]) -> Result<String, String> {
    let mut name: Option<String> = None;
    let mut options = InitOptions::default();

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--dir" => {
                options.workspace_dir = Some(PathBuf::from(flag_value(args, &mut i, "--dir")?));
            }
            "--template" => options.template = Some(flag_value(args, &mut i, "--template")?),
            "--force" => {
                options.force = true;
                i += 1;
            }
            other if other.starts_with("--") => return Err(format!("unknown option {other}")),
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

    let config = init_workspace(paths, &name, &options).map_err(|e| e.to_string())?;
    let mut lines = vec![
        "workspace initialized".to_string(),
        format!("name={}", config.name),
        format!("definition={}", config.path.display()),
        format!("status={}", config.status),
    ];
    if let Some(dir) = &config.workspace_dir {
        lines.push(format!("workspace_dir={}", dir.display()));
    }
    Ok(lines.join("\n"))
}
