use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use upmark::config::Config;
use upmark::pipeline::Pipeline;
use upmark::server::{self, AppState};
use upmark::storage::FilesystemSink;
use upmark::watermark::Watermark;

/// Upmark - resize uploaded images and stamp a watermark in the corner
#[derive(Parser, Debug)]
#[command(name = "upmark")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = if args.config.exists() {
        Config::from_file(&args.config).map_err(anyhow::Error::msg)?
    } else {
        Config::default()
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate().map_err(anyhow::Error::msg)?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = load_config(&args)
        .with_context(|| format!("Invalid configuration in {}", args.config.display()))?;

    if args.test {
        println!("configuration file {} test is successful", args.config.display());
        return Ok(());
    }

    upmark::logging::init_subscriber(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging subsystem: {}", e))?;

    tracing::info!(
        config_file = %args.config.display(),
        server_address = %config.server.address,
        server_port = config.server.port,
        target_width = config.pipeline.target_width,
        upload_dir = %config.storage.upload_dir,
        "Configuration loaded successfully"
    );

    let watermark = Watermark::from_path(&config.watermark.path, config.watermark.to_options())
        .with_context(|| format!("Failed to load watermark {}", config.watermark.path))?;

    let sink = FilesystemSink::new(&config.storage.upload_dir);
    sink.ensure_root()
        .with_context(|| format!("Failed to create {}", config.storage.upload_dir))?;

    let pipeline = Pipeline::new(config.pipeline.clone(), Arc::new(watermark));
    let state = AppState::new(pipeline, Arc::new(sink), config.server.clone());
    let bind_address = config.server.bind_address();

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&bind_address)
            .await
            .with_context(|| format!("Failed to bind {}", bind_address))?;
        server::serve(listener, state).await
    })
}
