#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Init,
    Launch,
    Close,
    Status,
    List,
    Delete,
    Version,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "init" => CliVerb::Init,
        "launch" | "start" => CliVerb::Launch,
        "close" | "stop" => CliVerb::Close,
        "status" => CliVerb::Status,
        "list" | "ls" => CliVerb::List,
        "delete" | "rm" => CliVerb::Delete,
        "version" | "--version" | "-V" => CliVerb::Version,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Usage: hearth [--state-root PATH] <command> [options]".to_string(),
        String::new(),
        "Commands:".to_string(),
        "  init <name> [--dir PATH] [--template NAME] [--force]".to_string(),
        "                                       Create a workspace definition".to_string(),
        "  launch <name> [--env K=V]... [--detach] [--dry-run] [--force]".to_string(),
        "                                       Start every app in a workspace".to_string(),
        "  close <name> | --all                 Kill a workspace's processes".to_string(),
        "  status [name...] [--json] [--verbose] [--since DURATION]".to_string(),
        "         [--watch] [--interval SECS] [--iterations N]".to_string(),
        "                                       Show active and inactive workspaces".to_string(),
        "  status --stop-watch                  End every running `status --watch`".to_string(),
        "  list [--filter all|active|inactive] [--sort name|last_used|status] [--json]"
            .to_string(),
        "                                       List registered workspaces".to_string(),
        "  delete <name> [--force]              Remove a workspace and its definition"
            .to_string(),
        "  version                              Print the hearth version".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    cli_help_lines().join("\n")
}
