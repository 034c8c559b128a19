use crate::app::cli::{help_text, parse_cli_verb, CliVerb};
use crate::app::command_support::{ensure_runtime_root, split_state_root};

pub mod close;
pub mod delete;
pub mod init;
pub mod launch;
pub mod list;
pub mod status;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    let (state_root, args) = split_state_root(args)?;
    if args.is_empty() {
        return Ok(help_text());
    }

    let verb = parse_cli_verb(args[0].as_str());
    match verb {
        CliVerb::Help => return Ok(help_text()),
        CliVerb::Version => return Ok(format!("hearth {}", env!("CARGO_PKG_VERSION"))),
        CliVerb::Unknown => {
            return Err(format!(
                "unknown command `{}`\nrun `hearth help` for usage",
                args[0]
            ))
        }
        _ => {}
    }

    let paths = ensure_runtime_root(state_root.as_deref())?;
    let rest = &args[1..];
    match verb {
        CliVerb::Init => init::cmd_init(&paths, rest),
        CliVerb::Launch => launch::cmd_launch(&paths, rest),
        CliVerb::Close => close::cmd_close(&paths, rest),
        CliVerb::Status => status::cmd_status(&paths, rest),
        CliVerb::List => list::cmd_list(&paths, rest),
        CliVerb::Delete => delete::cmd_delete(&paths, rest),
        CliVerb::Help | CliVerb::Version | CliVerb::Unknown => Ok(help_text()),
    }
}
