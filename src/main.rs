use std::path::PathBuf;

use clap::{Parser, Subcommand};
use restaurant_rag::commands::{ask, build_index, serve, show_status};
use restaurant_rag::config::{Config, get_config_dir, run_interactive_config, show_config};
use restaurant_rag::{RagError, Result};

#[derive(Parser)]
#[command(name = "restaurant-rag")]
#[command(about = "Restaurant recommendations over a spreadsheet, answered by a local LLM")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml and the vector index
    #[arg(long, global = true, env = "RESTAURANT_RAG_HOME")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure Ollama, generation and dataset settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Build the vector index from the restaurant spreadsheet
    Build {
        /// Spreadsheet to index instead of the configured one
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Sheet name or 0-based index
        #[arg(long)]
        sheet: Option<String>,
        /// Remove an existing index and rebuild it
        #[arg(long)]
        force: bool,
    },
    /// Start the HTTP chat server
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Answer a single question and exit
    Ask {
        question: String,
    },
    /// Show configuration, index and Ollama status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => get_config_dir().map_err(|e| RagError::Config(e.to_string()))?,
    };

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config(&config_dir)?;
            } else {
                run_interactive_config(&config_dir)?;
            }
        }
        Commands::Build {
            dataset,
            sheet,
            force,
        } => {
            let config = Config::load(&config_dir)?;
            build_index(&config, dataset, sheet, force).await?;
        }
        Commands::Serve { host, port } => {
            let config = Config::load(&config_dir)?;
            serve(&config, host, port).await?;
        }
        Commands::Ask { question } => {
            let config = Config::load(&config_dir)?;
            ask(&config, &question).await?;
        }
        Commands::Status => {
            let config = Config::load(&config_dir).unwrap_or_else(|e| {
                tracing::warn!("Falling back to default configuration: {:#}", e);
                Config {
                    base_dir: config_dir.clone(),
                    ..Config::default()
                }
            });
            show_status(&config).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["restaurant-rag", "status"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            assert!(matches!(parsed.command, Commands::Status));
        }
    }

    #[test]
    fn build_command_defaults() {
        let cli = Cli::try_parse_from(["restaurant-rag", "build"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Build {
                dataset,
                sheet,
                force,
            } = parsed.command
            {
                assert_eq!(dataset, None);
                assert_eq!(sheet, None);
                assert!(!force);
            }
        }
    }

    #[test]
    fn build_command_with_overrides() {
        let cli = Cli::try_parse_from([
            "restaurant-rag",
            "build",
            "--dataset",
            "data/Restaurants.xlsx",
            "--sheet",
            "Sheet2",
            "--force",
        ]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Build {
                dataset,
                sheet,
                force,
            } = parsed.command
            {
                assert_eq!(dataset, Some(PathBuf::from("data/Restaurants.xlsx")));
                assert_eq!(sheet, Some("Sheet2".to_string()));
                assert!(force);
            }
        }
    }

    #[test]
    fn serve_command_with_port() {
        let cli = Cli::try_parse_from(["restaurant-rag", "serve", "--port", "8080"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Serve { host, port } = parsed.command {
                assert_eq!(host, None);
                assert_eq!(port, Some(8080));
            }
        }
    }

    #[test]
    fn ask_requires_question() {
        let cli = Cli::try_parse_from(["restaurant-rag", "ask"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        }
    }

    #[test]
    fn global_config_dir_flag() {
        let cli = Cli::try_parse_from([
            "restaurant-rag",
            "ask",
            "vegan food?",
            "--config-dir",
            "/tmp/rag",
        ]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            assert_eq!(parsed.config_dir, Some(PathBuf::from("/tmp/rag")));
            if let Commands::Ask { question } = parsed.command {
                assert_eq!(question, "vegan food?");
            }
        }
    }

    #[test]
    fn config_show_flag() {
        let cli = Cli::try_parse_from(["restaurant-rag", "config", "--show"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Config { show } = parsed.command {
                assert!(show);
            }
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["restaurant-rag", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }
}
