use anyhow::Result;
use tracing::info;

use tether::{Config, Server, UppercaseHandler};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("tether=debug,info")
        .init();

    info!("Starting tether server");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tether.toml".to_string());

    let config = if std::path::Path::new(&config_path).exists() {
        info!("Loading config from {}", config_path);
        Config::from_file(&config_path)?
    } else {
        Config::default()
    };

    let server = Server::bind(&config, UppercaseHandler).await?;
    info!(
        "Address record written to {}",
        config.record_path.display()
    );
    let mut handle = server.run();

    info!("Press [Ctrl-C] to quit");
    tokio::signal::ctrl_c().await?;

    handle.close().await;
    Ok(())
}
