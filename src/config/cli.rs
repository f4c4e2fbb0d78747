use crate::app::report::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "pg-lookup")]
#[command(about = "Match a reported people group name to its Joshua Project record")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Credential file to use instead of the configured/default one
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Find the best Joshua Project match for a reported name
    Search(SearchArgs),

    /// List the Joshua Project candidates for a name without asking the model
    Candidates(CandidatesArgs),

    /// Manage the stored API keys
    #[command(subcommand)]
    Keys(KeysCommand),
}

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Reported people group name
    pub name: String,

    #[arg(long)]
    pub country: Option<String>,

    /// City or region the group was reported in
    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub religion: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Args)]
pub struct CandidatesArgs {
    pub name: String,

    #[arg(long)]
    pub country: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Clone, Subcommand)]
pub enum KeysCommand {
    /// Save both API keys
    Set {
        #[arg(long)]
        jp_key: String,

        #[arg(long)]
        anthropic_key: String,
    },

    /// Forget both API keys
    Clear,

    /// Show which keys are stored
    Status,
}

// Key values never reach a log line.
impl fmt::Debug for KeysCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set { .. } => f
                .debug_struct("Set")
                .field("jp_key", &"<redacted>")
                .field("anthropic_key", &"<redacted>")
                .finish(),
            Self::Clear => f.write_str("Clear"),
            Self::Status => f.write_str("Status"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_command() {
        let cli = CliConfig::try_parse_from([
            "pg-lookup",
            "search",
            "Northern Pashtun",
            "--country",
            "Pakistan",
            "--format",
            "json",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.name, "Northern Pashtun");
                assert_eq!(args.country.as_deref(), Some("Pakistan"));
                assert_eq!(args.city, None);
                assert_eq!(args.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_keys_set() {
        let cli = CliConfig::try_parse_from([
            "pg-lookup",
            "keys",
            "set",
            "--jp-key",
            "jp",
            "--anthropic-key",
            "ant",
        ])
        .unwrap();

        assert!(matches!(
            cli.command,
            Command::Keys(KeysCommand::Set { ref jp_key, ref anthropic_key })
                if jp_key == "jp" && anthropic_key == "ant"
        ));
    }

    #[test]
    fn test_debug_output_hides_stored_keys() {
        let cli = CliConfig::try_parse_from([
            "pg-lookup",
            "-v",
            "keys",
            "set",
            "--jp-key",
            "jp-K1-secret",
            "--anthropic-key",
            "sk-ant-K2-secret",
        ])
        .unwrap();

        let debug = format!("{:?}", cli);
        assert!(!debug.contains("jp-K1-secret"));
        assert!(!debug.contains("sk-ant-K2-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_search_requires_name() {
        assert!(CliConfig::try_parse_from(["pg-lookup", "search"]).is_err());
    }
}
