//! Fragment site binary

use clap::{Parser, Subcommand};
use minifrag::common::{Partition, SiteConfig};
use minifrag::{Config, FragmentSite};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "minifrag-site")]
#[command(about = "minifrag fragment site - serves one slice of the records database")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import the dataset and start serving
    Serve {
        /// Fragment to hold: advanced (Site-A) or basic (Site-B)
        #[arg(long)]
        partition: Option<Partition>,

        /// Bind address for HTTP
        #[arg(long)]
        bind: Option<String>,

        /// Directory with students.json, faculty.json, courses.json, enrollments.json
        #[arg(long)]
        data: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
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
            partition,
            bind,
            data,
        } => {
            let mut site_config = match (config.site, partition) {
                (Some(file_conf), None) => file_conf,
                (Some(file_conf), Some(p)) if file_conf.partition == p => file_conf,
                (_, Some(p)) => SiteConfig::new(p),
                (None, None) => anyhow::bail!("--partition is required without a [site] config"),
            };
            if let Some(bind) = bind {
                site_config.bind_addr = bind.parse()?;
            }
            if let Some(data) = data {
                site_config.data_dir = data;
            }

            FragmentSite::new(site_config).serve().await?;
        }
    }

    Ok(())
}
