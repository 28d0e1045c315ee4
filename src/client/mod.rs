use std::path::Path;
use tokio::net::TcpStream;
use tracing::debug;

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::record::AddressRecord;

/// One client, one connection. No retry, no reconnection; a refused dial or
/// a missing record surfaces immediately.
#[derive(Debug)]
pub struct Client {
    conn: Connection,
}

impl Client {
    /// Loads the address record at `path` and connects to the server it
    /// names. Fails fast with `Error::RecordNotFound` when no record exists.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let record = AddressRecord::load(path)?;
        Self::connect_to(&record).await
    }

    pub async fn connect_to(record: &AddressRecord) -> Result<Self> {
        let stream = TcpStream::connect(record.address())
            .await
            .map_err(Error::Connection)?;
        debug!("Connected to {}:{}", record.host(), record.port());
        Ok(Self {
            conn: Connection::new(stream)?,
        })
    }

    pub async fn send(&mut self, msg: &str) -> Result<()> {
        self.conn.send(msg).await
    }

    pub async fn receive(&mut self) -> Result<Option<String>> {
        self.conn.receive().await
    }
}
