//! CLI argument parsing definitions

use campus_rbac::Role;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a requirement against the demo actor for a role
    Check {
        /// Role whose preset actor is signed in (e.g. teacher, front-desk)
        #[arg(long, value_name = "ROLE")]
        role: Role,

        /// Required scope tokens, all of which must be held
        #[arg(long, value_name = "SCOPE", num_args = 0..)]
        require: Vec<String>,
    },

    /// Switch the demo actor between two roles and check a requirement for each
    Switch {
        /// Role signed in first
        #[arg(long, value_name = "ROLE")]
        from: Role,

        /// Role switched to
        #[arg(long, value_name = "ROLE")]
        to: Role,

        /// Required scope tokens, all of which must be held
        #[arg(long, value_name = "SCOPE", num_args = 0..)]
        require: Vec<String>,
    },

    /// Print the role registry report
    Registry {
        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: OutputFormat,
    },

    /// Compare the registry with the demo scope grants
    Parity {
        /// Limit the report to one role
        #[arg(long, value_name = "ROLE")]
        role: Option<Role>,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Generate a sample configuration file
    Generate {
        /// Output file path
        #[arg(long, value_name = "PATH")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from([
            "campus-authz",
            "check",
            "--role",
            "front-desk",
            "--require",
            "attendance:read",
            "cms:read",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Check { role, require }) => {
                assert_eq!(role, Role::FrontDesk);
                assert_eq!(require, vec!["attendance:read", "cms:read"]);
            }
            _ => panic!("expected check command"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_role() {
        assert!(Cli::try_parse_from(["campus-authz", "check", "--role", "janitor"]).is_err());
    }

    #[test]
    fn test_parse_registry_format() {
        let cli = Cli::try_parse_from(["campus-authz", "registry", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Registry {
                format: OutputFormat::Json
            })
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["campus-authz", "parity", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Some(Commands::Parity { role: None })));
    }
}
