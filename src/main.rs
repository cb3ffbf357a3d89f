//! tdl CLI - Replay concurrent to-do edits into one deterministic list.

use clap::Parser;
use std::process;
use todoledger::cli::{Cli, Commands, ConfigCommands};
use todoledger::commands::{self, Output, ReplayResult, ShowResult};
use todoledger::config::{OutputFormat, ResolvedConfig, resolve_config};
use todoledger::registry::TodoList;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter (e.g. `debug`, `todoledger=trace`).
const LOG_ENV: &str = "TDL_LOG";

fn main() {
    init_logging();

    let cli = Cli::parse();

    let config = match resolve_config(cli.config_path.as_deref(), &cli.overrides()) {
        Ok(config) => config,
        Err(e) => exit_with_error(&e, cli.human_readable),
    };
    let human = config.output_format() == OutputFormat::Human;

    if let Err(e) = run_command(cli.command, &config, human) {
        exit_with_error(&e, human);
    }
}

fn exit_with_error(e: &todoledger::Error, human: bool) -> ! {
    if human {
        eprintln!("Error: {}", e);
    } else {
        eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
    }
    process::exit(1);
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_command(
    command: Commands,
    config: &ResolvedConfig,
    human: bool,
) -> Result<(), todoledger::Error> {
    match command {
        Commands::Replay { script } => {
            let mut list = TodoList::with_options(config.fold_options());
            let applied = commands::replay(&mut list, commands::read_script(&script)?);
            output(&ReplayResult::collect(&mut list, applied), human);
        }
        Commands::Show { script, entry } => {
            let mut list = TodoList::with_options(config.fold_options());
            commands::replay(&mut list, commands::read_script(&script)?);
            output(&ShowResult::collect(&mut list, entry), human);
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => output(config, human),
        },
    }
    Ok(())
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
