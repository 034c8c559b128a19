use crate::app::command_support::{flag_value, render_table};
use crate::config::WorkspaceConfig;
use crate::runtime::{list_workspaces, ListFilter, ListSort, StatePaths};
use crate::shared::serde_ext::NEVER;

pub(crate) fn render_workspace_table(configs: &[WorkspaceConfig]) -> String {
    let rows: Vec<Vec<String>> = configs
        .iter()
        .map(|config| {
            vec![
                config.name.to_string(),
                config.status.to_string(),
                config.last_used.clone().unwrap_or_else(|| NEVER.to_string()),
                config.path.display().to_string(),
            ]
        })
        .collect();
    render_table(&["NAME", "STATUS", "LAST_USED", "PATH"], &rows)
}

pub fn cmd_list(paths: &StatePaths, args: &[String]) -> Result<String, String> {
    let mut filter = ListFilter::All;
    let mut sort = ListSort::Name;
    let mut json = false;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--filter" => filter = ListFilter::parse(&flag_value(args, &mut i, "--filter")?)?,
            "--sort" => sort = ListSort::parse(&flag_value(args, &mut i, "--sort")?)?,
            "--json" => {
                json = true;
                i += 1;
            }
            other => return Err(format!("unknown option {other}")),
        }
    }

    let configs = list_workspaces(paths, filter, sort).map_err(|e| e.to_string())?;
    if json {
        return serde_json::to_string_pretty(&configs)
            .map_err(|e| format!("failed to encode workspaces: {e}"));
    }
    if configs.is_empty() {
        return Ok("No workspaces found.".to_string());
    }
    Ok(render_workspace_table(&configs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkspaceStatus;
    use crate::shared::ids::WorkspaceName;
    use std::path::PathBuf;

    #[test]
    fn never_used_workspaces_show_never() {
        let table = render_workspace_table(&[WorkspaceConfig {
            name: WorkspaceName::parse("dev").expect("name"),
            path: PathBuf::from("/h/workspaces/dev.yaml"),
            status: WorkspaceStatus::Inactive,
            workspace_dir: None,
            template: None,
            created: "t".to_string(),
            last_updated: "t".to_string(),
            last_used: None,
        }]);
        let mut lines = table.lines();
        assert_eq!(
            lines.next().map(|l| l.split_whitespace().collect::<Vec<_>>()),
            Some(vec!["NAME", "STATUS", "LAST_USED", "PATH"])
        );
        assert_eq!(
            lines.next().map(|l| l.split_whitespace().collect::<Vec<_>>()),
            Some(vec!["dev", "inactive", "never", "/h/workspaces/dev.yaml"])
        );
    }
}
