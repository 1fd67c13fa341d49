use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing::{info, warn};

use n1_catalog::config::Config;
use n1_catalog::normalize::{build_membership_catalog, build_service_catalog};
use n1_catalog::observability::logging;
use n1_catalog::server::{start_server, AppState};
use n1_catalog::square::{CatalogSource, SquareCatalogClient};

#[derive(Parser)]
#[command(name = "n1_catalog")]
#[command(about = "Catalog normalization API for the N1 Nail salon website")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Port to bind (overrides the PORT environment variable)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Fetch the catalog once and print a normalization summary
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();

    let config = Arc::new(Config::from_env()?);
    let source: Arc<dyn CatalogSource> = Arc::new(SquareCatalogClient::new(&config.square)?);

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.port);

            let metrics_handle = match PrometheusBuilder::new().install_recorder() {
                Ok(handle) => Some(handle),
                Err(e) => {
                    warn!("failed to install metrics recorder: {e}");
                    None
                }
            };

            let state = AppState {
                config: config.clone(),
                source,
                metrics: metrics_handle,
            };

            info!("starting catalog API server");
            start_server(state, port).await?;
        }
        Commands::Check => {
            println!("🔄 Fetching catalog from Square...");

            let services = build_service_catalog(source.as_ref(), &config.square).await?;
            let memberships = build_membership_catalog(source.as_ref()).await?;

            println!("\n📊 Catalog summary:");
            println!("   Services: {}", services.total);
            println!("   Categories: {}", services.categories.len());
            for category in &services.categories {
                println!("   - {} ({} services)", category.title, category.services.len());
            }
            println!("   Memberships: {}", memberships.total);
            for membership in &memberships.memberships {
                println!("   - {} ({})", membership.title, membership.yearly_price);
            }
        }
    }

    Ok(())
}
