//! `o11n` command line

mod commands;
mod process;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use o11n_core::{Mode, O11nConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn change_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("FILE:INDEX")
        .action(ArgAction::Append)
        .value_parser(commands::parse_change_ref)
}

fn plan_arg() -> Arg {
    Arg::new("plan")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Plan document to read")
}

fn cli() -> Command {
    Command::new("o11n")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Review and apply LLM change plans, and assemble the prompts that request them")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Write logs as JSON lines"),
        )
        .subcommand(
            Command::new("tree")
                .about("Render paths as a file map")
                .arg(Arg::new("paths").required(true).num_args(1..)),
        )
        .subcommand(
            Command::new("prompt")
                .about("Assemble a prompt from files, templates and instructions")
                .arg(
                    Arg::new("file")
                        .long("file")
                        .action(ArgAction::Append)
                        .help("File to embed"),
                )
                .arg(
                    Arg::new("root")
                        .long("root")
                        .action(ArgAction::Append)
                        .help("Project root, mapped when no file is given"),
                )
                .arg(
                    Arg::new("template")
                        .long("template")
                        .action(ArgAction::Append)
                        .help("Template file to embed"),
                )
                .arg(
                    Arg::new("instructions")
                        .long("instructions")
                        .default_value("")
                        .help("User instructions"),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .default_value("plan")
                        .value_parser(value_parser!(Mode))
                        .help("talk, plan or do"),
                ),
        )
        .subcommand(
            Command::new("preview")
                .about("Summarise a plan's files and changes")
                .arg(plan_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                )
                .arg(
                    Arg::new("diff")
                        .long("diff")
                        .value_name("FILE:INDEX")
                        .value_parser(commands::parse_change_ref)
                        .help("Show one change as a diff"),
                ),
        )
        .subcommand(
            Command::new("filter")
                .about("Print the plan with rejected changes removed")
                .arg(plan_arg())
                .arg(change_arg("reject").help("Reject one change"))
                .arg(
                    Arg::new("reject-file")
                        .long("reject-file")
                        .action(ArgAction::Append)
                        .help("Reject every change of a file"),
                ),
        )
        .subcommand(
            Command::new("commit")
                .about("Apply the accepted changes through the executor")
                .arg(plan_arg())
                .arg(change_arg("reject").help("Reject one change"))
                .arg(
                    Arg::new("reject-file")
                        .long("reject-file")
                        .action(ArgAction::Append)
                        .help("Reject every change of a file"),
                )
                .arg(
                    Arg::new("executor")
                        .long("executor")
                        .help("Executor program, overriding the configuration"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<O11nConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => Ok(O11nConfig::load(path)?),
        None => Ok(O11nConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));
    let config = load_config(&matches)?;

    match matches.subcommand() {
        Some(("tree", args)) => commands::tree(args),
        Some(("prompt", args)) => commands::prompt(config, args).await,
        Some(("preview", args)) => commands::preview(args).await,
        Some(("filter", args)) => commands::filter(config, args).await,
        Some(("commit", args)) => commands::commit(config, args).await,
        _ => unreachable!("subcommand required"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn parses_filter_rejections() {
        let matches = cli()
            .try_get_matches_from([
                "o11n", "filter", "plan.md", "--reject", "src/a.rs:1", "--reject", "b.rs:0",
            ])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        let rejects: Vec<_> = args
            .get_many::<(String, usize)>("reject")
            .unwrap()
            .cloned()
            .collect();
        assert_eq!(rejects, vec![("src/a.rs".to_string(), 1), ("b.rs".to_string(), 0)]);
    }

    #[test]
    fn rejects_unknown_mode() {
        let result = cli().try_get_matches_from(["o11n", "prompt", "--mode", "shout"]);
        assert!(result.is_err());
    }
}
