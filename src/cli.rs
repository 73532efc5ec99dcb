use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "openrouter-key-selector",
    version,
    about = "Selects a usable OpenRouter API key from a fixed pool",
    long_about = "Keeps a cached status per OpenRouter API key, rotates between keys round-robin and skips keys whose quota is exhausted or that callers reported as failed."
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "KEY_SELECTOR_CONFIG",
        default_value = "config.yaml"
    )]
    pub config: PathBuf,

    /// Plain text logs instead of JSON
    #[arg(long)]
    pub no_json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the operations HTTP server (default)
    Serve {
        /// Overrides server.port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Key management commands
    Keys {
        #[command(subcommand)]
        action: KeyCommands,
    },

    /// Validate configuration file
    CheckConfig {
        /// Configuration file to validate, defaults to --config
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommands {
    /// List configured key labels in rotation order
    List,

    /// Check every key against the provider and print the statuses
    Refresh,

    /// Run one selection and print the chosen label
    Select,
}

impl Cli {
    /// Without a subcommand the server is started.
    pub fn resolved_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Serve { port: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_serve() {
        let cli = Cli::try_parse_from(["openrouter-key-selector"]).unwrap();
        assert!(matches!(cli.resolved_command(), Commands::Serve { port: None }));
        assert!(!cli.no_json_logs);
    }

    #[test]
    fn test_parses_keys_select() {
        let cli = Cli::try_parse_from([
            "openrouter-key-selector",
            "--config",
            "/etc/selector.yaml",
            "keys",
            "select",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/selector.yaml"));
        assert!(matches!(
            cli.resolved_command(),
            Commands::Keys {
                action: KeyCommands::Select
            }
        ));
    }

    #[test]
    fn test_parses_serve_port() {
        let cli = Cli::try_parse_from(["openrouter-key-selector", "serve", "--port", "9090"]).unwrap();
        assert!(matches!(cli.resolved_command(), Commands::Serve { port: Some(9090) }));
    }
}
