use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use cloud_bootstrap::{storage::S3Client, utils::init_logger, Settings};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Service to bootstrap, overriding the settings (e.g. s3, sqs, dynamodb)
    #[arg(short, long)]
    service: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();

    let load_settings = || -> anyhow::Result<Settings> {
        let mut settings = Settings::load(args.config.as_deref())?;
        if let Some(service) = args.service {
            settings.service = service;
        }
        Ok(settings)
    };

    let mut stdout = std::io::stdout().lock();
    let handle = cloud_bootstrap::run(&mut stdout, load_settings)?;

    if handle.service().id == cloud_bootstrap::storage::S3_SERVICE_ID {
        let client = S3Client::from_handle(&handle)?;
        info!(region = ?client.region(), "S3 client constructed");
    }

    Ok(())
}
