// cli.rs - Command-line interface for the football-shop binary

use clap::{Args, Parser, Subcommand};

use crate::config::{AppConfig, StoreBackend};

#[derive(Debug, Parser)]
#[command(name = "football-shop")]
#[command(about = "Football merchandise catalog server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve(ServeArgs),

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Insert the sample items into an empty catalog and exit")]
    Seed,
}

#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    #[arg(long, help = "Address to bind (overrides SERVER_HOST)")]
    pub host: Option<String>,

    #[arg(long, help = "Port to bind (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Keep the catalog in memory instead of Postgres")]
    pub memory: bool,
}

impl ServeArgs {
    /// Applies the flags on top of the environment-derived config.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.memory {
            config.database.backend = StoreBackend::Memory;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_flags_override_config() {
        let cli = Cli::parse_from(["football-shop", "serve", "--port", "9001", "--memory"]);
        let Some(Commands::Serve(args)) = cli.command else {
            panic!("expected serve");
        };

        let mut config = AppConfig::development();
        config.database.backend = StoreBackend::Postgres;
        args.apply(&mut config);

        assert_eq!(config.server.port, 9001);
        assert_eq!(config.database.backend, StoreBackend::Memory);
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::parse_from(["football-shop"]);
        assert!(cli.command.is_none());
    }
}
