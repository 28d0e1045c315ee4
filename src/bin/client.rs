use anyhow::{Context, Result};

use tether::{Client, DEFAULT_RECORD_FILE};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("tether=info")
        .init();

    let message = std::env::args()
        .nth(1)
        .context("usage: client <message>")?;
    let record_path = std::env::args()
        .nth(2)
        .unwrap_or_else(|| DEFAULT_RECORD_FILE.to_string());

    let mut client = Client::connect(&record_path).await?;
    client.send(&message).await?;

    if let Some(response) = client.receive().await? {
        println!("{}", response);
    }

    Ok(())
}
