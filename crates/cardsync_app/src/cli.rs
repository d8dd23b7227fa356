use std::path::PathBuf;

use cardsync_core::{RunRequest, TargetSource};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

pub const DEFAULT_SETTINGS_PATH: &str = "settings.ron";

#[derive(Debug, Parser)]
#[command(name = "cardsync")]
#[command(about = "Incremental card catalog sync")]
#[command(version)]
pub struct Cli {
    /// Settings file (RON)
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_PATH)]
    pub config: PathBuf,

    /// Where log lines go
    #[arg(long, global = true, value_enum)]
    pub log: Option<LogDestination>,

    /// Authorization header value
    #[arg(long, global = true, env = "CARDSYNC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sync cards and images of one or more titles
    Parse(ParseArgs),

    /// List titles with new cards since the last scan and store the new watermark
    Updates,
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("targets")
        .required(true)
        .args(["target", "local", "collection", "updates"])
))]
pub struct ParseArgs {
    /// Title slug or numeric id
    pub target: Option<String>,

    /// Every title in the local store
    #[arg(long)]
    pub local: bool,

    /// Every title listed in the collection file
    #[arg(long)]
    pub collection: bool,

    /// Every title with new cards since the last scan
    #[arg(long)]
    pub updates: bool,

    /// Skip titles listed before this slug
    #[arg(long, value_name = "SLUG")]
    pub from: Option<String>,

    /// Wipe and re-download existing images
    #[arg(long)]
    pub force: bool,
}

impl ParseArgs {
    pub fn request(&self) -> RunRequest {
        let source = if self.local {
            TargetSource::LocalStore
        } else if self.collection {
            TargetSource::CollectionFile
        } else if self.updates {
            TargetSource::Updates
        } else {
            TargetSource::Single(self.target.clone().unwrap_or_default())
        };
        let mut request = RunRequest::new(source).with_force(self.force);
        if let Some(slug) = &self.from {
            request = request.resume_from(slug.clone());
        }
        request
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, serde::Serialize, serde::Deserialize)]
pub enum LogDestination {
    Terminal,
    File,
    Both,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("cardsync").chain(args.iter().copied()))
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn single_target_with_options() {
        let cli = parse(&["parse", "solo", "--force", "--log", "both"]).unwrap();
        assert_eq!(cli.log, Some(LogDestination::Both));
        let Command::Parse(args) = cli.command else {
            panic!("expected parse");
        };
        assert_eq!(
            args.request(),
            RunRequest::single("solo").with_force(true)
        );
    }

    #[test]
    fn collection_with_resume() {
        let cli = parse(&["parse", "--collection", "--from", "beta"]).unwrap();
        let Command::Parse(args) = cli.command else {
            panic!("expected parse");
        };
        assert_eq!(
            args.request(),
            RunRequest::new(TargetSource::CollectionFile).resume_from("beta")
        );
    }

    #[test]
    fn exactly_one_target_kind() {
        assert!(parse(&["parse"]).is_err());
        assert!(parse(&["parse", "solo", "--local"]).is_err());
        assert!(parse(&["parse", "--local", "--updates"]).is_err());
    }

    #[test]
    fn updates_command_takes_global_flags() {
        let cli = parse(&["updates", "--verbose", "--config", "other.ron"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("other.ron"));
        assert!(matches!(cli.command, Command::Updates));
    }
}
