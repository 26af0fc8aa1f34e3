//! CLI entry point for salzpug

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use salzpug::config::SiteConfig;
use salzpug::server::ServerOptions;
use salzpug::Site;

#[derive(Parser)]
#[command(name = "salzpug")]
#[command(version)]
#[command(about = "The Salzburg Python User Group's website", long_about = None)]
struct Cli {
    /// Site directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web server
    #[command(alias = "s")]
    Runserver {
        /// The hostname to listen on
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// The port of the web server
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Debug logging and detailed error pages
        #[arg(short, long)]
        debug: bool,

        /// Reload pages and templates when they change
        #[arg(short, long)]
        reload: bool,
    },

    /// List site content
    List {
        /// Type of content to list (pages, articles, archive)
        #[arg(default_value = "pages")]
        r#type: String,
    },

    /// Display version information
    Version,
}

fn init_logging(debug: bool) {
    let filter = if debug {
        "salzpug=debug,tower_http=debug,info"
    } else {
        "salzpug=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_config(base_dir: &std::path::Path) -> Result<SiteConfig> {
    let config_path = base_dir.join("_config.yml");
    if config_path.exists() {
        SiteConfig::load(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))
    } else {
        Ok(SiteConfig::default())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let debug = matches!(cli.command, Commands::Runserver { debug: true, .. });
    init_logging(debug);

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Runserver {
            host,
            port,
            debug,
            reload,
        } => {
            let mut config = load_config(&base_dir)?;
            // The development server always picks up edited pages
            config.auto_reload = true;

            let site = Site::with_config(&base_dir, config)?;
            let options = ServerOptions {
                host,
                port,
                debug,
                reload,
            };

            tracing::info!("Starting server at http://{}:{}", options.host, options.port);
            salzpug::server::start(site, &options).await?;
        }

        Commands::List { r#type } => {
            let site = Site::new(&base_dir)?;
            salzpug::commands::list::run(&site, &r#type)?;
        }

        Commands::Version => {
            println!("salzpug version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
