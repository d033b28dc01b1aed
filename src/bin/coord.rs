//! Coordinator binary

use clap::{Parser, Subcommand};
use minifrag::{Config, Coordinator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "minifrag-coord")]
#[command(about = "minifrag query coordinator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start coordinator server
    Serve {
        /// Bind address for HTTP
        #[arg(long)]
        bind: Option<String>,

        /// Base URL of Site A (advanced fragment)
        #[arg(long)]
        site_a: Option<String>,

        /// Base URL of Site B (basic fragment)
        #[arg(long)]
        site_b: Option<String>,

        /// Department accepted by the coordinator
        #[arg(long)]
        department: Option<String>,

        /// Timeout for each fragment site call, in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // File and environment first, CLI arguments override
    let config = Config::load()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve {
            bind,
            site_a,
            site_b,
            department,
            timeout_ms,
        } => {
            let mut coord_config = config.coordinator.unwrap_or_default();
            if let Some(bind) = bind {
                coord_config.bind_addr = bind.parse()?;
            }
            if let Some(site_a) = site_a {
                coord_config.sites.site_a = site_a;
            }
            if let Some(site_b) = site_b {
                coord_config.sites.site_b = site_b;
            }
            if let Some(department) = department {
                coord_config.department = department;
            }
            if let Some(timeout_ms) = timeout_ms {
                coord_config.request_timeout_ms = timeout_ms;
            }
            coord_config.validate()?;

            Coordinator::new(coord_config).serve().await?;
        }
    }

    Ok(())
}
