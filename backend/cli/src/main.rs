mod config;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use media::ImageStore;
use snapsolve_core::SnapError;
use snapsolve_gateway::{GatewayState, RateLimiter, start_server};
use snapsolve_solver::providers::AiGatewayProvider;
use snapsolve_solver::{SolveModels, SolvePipeline};
use snapsolve_store::{ProblemStore, SqliteProblemStore};

use config::Config;

#[derive(Parser)]
#[command(name = "snapsolve")]
#[command(about = "SnapSolve — photo-to-solution math solving backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the SnapSolve HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show current server status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    logging::init_logger(config.log_dir.as_deref().map(Path::new), &config.log_level);

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                ..config
            };
            run_server(config).await?;
        }
        Commands::Status => {
            let client = reqwest::Client::new();
            match client
                .get(format!("http://localhost:{}/api/health", config.port))
                .send()
                .await
            {
                Ok(resp) => {
                    let body: serde_json::Value = resp.json().await?;
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                Err(_) => {
                    println!("SnapSolve is not running on port {}", config.port);
                }
            }
        }
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        db = %config.db_path,
        media_dir = %config.media_dir,
        "Starting SnapSolve"
    );

    let api_key = config
        .ai_api_key
        .clone()
        .ok_or_else(|| SnapError::ConfigError("OPENROUTER_API_KEY is not set".to_string()))?;

    let provider = Arc::new(AiGatewayProvider::new(api_key).with_base_url(&config.ai_base_url));
    let store: Arc<dyn ProblemStore> = Arc::new(SqliteProblemStore::open(&config.db_path)?);

    let models = SolveModels {
        vision: config.vision_model.clone(),
        solver: config.solver_model.clone(),
    };
    let pipeline = Arc::new(SolvePipeline::new(provider, Arc::clone(&store), models));

    let images = ImageStore::new(&config.media_dir).with_max_bytes(config.max_upload_bytes);

    let state = Arc::new(GatewayState {
        store,
        pipeline,
        images,
        rate_limiter: RateLimiter::new(config.rate_limit, config.rate_window_secs),
        api_token: config.api_token.clone(),
        public_base_url: config.public_base_url.clone(),
    });

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port).parse()?;
    start_server(addr, state).await
}
