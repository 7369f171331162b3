use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use bizdata_pipeline::app::BatchUseCase;
use bizdata_pipeline::config::PipelineConfig;
use bizdata_pipeline::events::EventBus;
use bizdata_pipeline::logging;
use bizdata_pipeline::observability;
use bizdata_pipeline::pipeline::processing::{detect_format, extract_value};

#[derive(Parser)]
#[command(name = "bizdata")]
#[command(about = "Validate, normalize, enrich and deduplicate business record batches")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect from all configured sources and run one batch
    Run {
        /// Pipeline config file (falls back to BIZDATA_CONFIG, then pipeline.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print Prometheus metrics after the batch
        #[arg(long)]
        metrics: bool,
    },
    /// Show the detected format and extracted value of a file
    Detect {
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, metrics } => {
            let path = PipelineConfig::resolve_path(config);
            let config = PipelineConfig::load(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;

            logging::init_logging(&config.logging.dir);
            if metrics {
                if let Err(e) = observability::init() {
                    warn!("Metrics disabled: {}", e);
                }
            }
            info!(config = %path.display(), pipeline = %config.pipeline.name, "Loaded configuration");

            let bus = Arc::new(EventBus::new());
            let use_case = BatchUseCase::from_config(&config, bus)?;

            match use_case.run().await {
                Ok(report) => {
                    println!("Batch {} completed for '{}'", report.batch_id, report.pipeline_name);
                    println!("   Collected: {}", report.counts.collected);
                    println!("   Accepted:  {}", report.counts.accepted);
                    println!("   Rejected:  {}", report.counts.rejected);
                    println!("   Output:    {}", report.counts.deduplicated);
                    println!("   Duration:  {} ms", report.duration().num_milliseconds());
                }
                Err(e) => {
                    error!("Batch failed: {:#}", e);
                    return Err(e);
                }
            }

            if let Some(rendered) = observability::render() {
                println!("\n{}", rendered);
            }
        }
        Commands::Detect { path } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            println!("format: {}", detect_format(&content));
            println!("value:  {}", extract_value(&content));
        }
    }

    Ok(())
}
