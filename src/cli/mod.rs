//! CLI argument definitions for tdl.

use crate::config::{CONFIG_PATH_ENV, ConfigOverrides, OutputFormat};
use crate::timeline::DismissalPolicy;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// tdl - Replay concurrent to-do edits into one deterministic list.
///
/// Scripts are JSONL files with one command per line, e.g.
/// `{"op":"add_entry","entry":1,"user":10,"name":"buy milk","ts":100}`.
#[derive(Parser, Debug)]
#[command(name = "tdl")]
#[command(
    author,
    version = concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("TDL_GIT_COMMIT"),
        " ",
        env!("TDL_BUILD_TIMESTAMP"),
        ")"
    ),
    about = "Replay concurrent to-do edits into one deterministic list",
    long_about = None
)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Path to config.kdl (defaults to the user config directory)
    #[arg(long = "config", global = true, env = CONFIG_PATH_ENV)]
    pub config_path: Option<PathBuf>,

    /// How a dismissed user's first add affects the entry
    #[arg(long, global = true, value_enum)]
    pub dismissal_policy: Option<PolicyArg>,

    /// Keep cached snapshots until the entry changes, even after a dismissal
    #[arg(long, global = true)]
    pub no_refresh_on_dismissal: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Config values given on the command line.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            dismissal_policy: self.dismissal_policy.map(DismissalPolicy::from),
            refresh_on_dismissal: self.no_refresh_on_dismissal.then_some(false),
            output_format: self.human_readable.then_some(OutputFormat::Human),
        }
    }
}

/// CLI spelling of [`DismissalPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// A dismissed creator voids the whole entry
    VoidEntry,
    /// Only the dismissed user's own changes are skipped
    SkipChange,
}

impl From<PolicyArg> for DismissalPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::VoidEntry => DismissalPolicy::VoidEntry,
            PolicyArg::SkipChange => DismissalPolicy::SkipChange,
        }
    }
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a script and list the live entries
    Replay {
        /// JSONL script path, or `-` for stdin
        script: PathBuf,
    },

    /// Replay a script and show one entry, including removed ones
    Show {
        /// JSONL script path, or `-` for stdin
        script: PathBuf,

        /// Entry ID to show
        entry: i64,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved configuration and where each value came from
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_debug_assert() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_flag_reads_env() {
        use clap::CommandFactory;
        let cmd = Cli::command();
        let arg = cmd
            .get_arguments()
            .find(|a| a.get_id() == "config_path")
            .unwrap();
        assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new(CONFIG_PATH_ENV)));
    }

    #[test]
    fn test_parse_replay_with_flags() {
        let cli = Cli::try_parse_from([
            "tdl",
            "replay",
            "script.jsonl",
            "-H",
            "--dismissal-policy",
            "skip-change",
            "--no-refresh-on-dismissal",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides.dismissal_policy, Some(DismissalPolicy::SkipChange));
        assert_eq!(overrides.refresh_on_dismissal, Some(false));
        assert_eq!(overrides.output_format, Some(OutputFormat::Human));
        assert!(matches!(cli.command, Commands::Replay { .. }));
    }

    #[test]
    fn test_no_flags_no_overrides() {
        let cli = Cli::try_parse_from(["tdl", "show", "-", "3"]).unwrap();
        let overrides = cli.overrides();
        assert!(overrides.dismissal_policy.is_none());
        assert!(overrides.refresh_on_dismissal.is_none());
        assert!(overrides.output_format.is_none());
        assert!(matches!(cli.command, Commands::Show { entry: 3, .. }));
    }
}
