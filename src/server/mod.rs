use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::handler::RequestHandler;
use crate::record::AddressRecord;

/// A listening request/response server. Binding persists the address record
/// immediately; `run` moves the accept loop onto a background task and hands
/// back a [`ServerHandle`] for shutdown.
#[derive(Debug)]
pub struct Server<H> {
    listener: TcpListener,
    record: AddressRecord,
    handler: Arc<H>,
}

impl<H: RequestHandler> Server<H> {
    /// Binds and listens, then writes the address record to
    /// `config.record_path`. With `config.port` set to 0 the record carries
    /// the ephemeral port the OS actually assigned.
    pub async fn bind(config: &Config, handler: H) -> Result<Self> {
        let listener = TcpListener::bind((config.host.as_str(), config.port))
            .await
            .map_err(|e| Error::Bind {
                addr: format!("{}:{}", config.host, config.port),
                source: e,
            })?;
        let local_addr = listener.local_addr().map_err(Error::Io)?;
        info!("Listening on {}", local_addr);

        let record = AddressRecord::new(config.host.clone(), local_addr.port());
        record.save(&config.record_path)?;

        Ok(Self {
            listener,
            record,
            handler: Arc::new(handler),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(Error::Io)
    }

    pub fn record(&self) -> &AddressRecord {
        &self.record
    }

    /// Starts accepting on a dedicated background task and returns
    /// immediately. Each accepted connection is handled inline on that task,
    /// so a slow handler blocks further accepts; concurrent clients
    /// serialize behind it.
    pub fn run(self) -> ServerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let handler = self.handler;
        let listener = self.listener;

        let task = tokio::spawn(async move {
            debug!("Waiting for requests");
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        info!("Server close");
                        break;
                    }
                    accepted = listener.accept() => match accepted {
                        Ok((stream, peer)) => {
                            debug!("New connection from {}", peer);
                            let mut conn = match Connection::new(stream) {
                                Ok(conn) => conn,
                                Err(e) => {
                                    error!("Failed to set up connection from {}: {}", peer, e);
                                    continue;
                                }
                            };
                            if let Err(e) = handler.handle(&mut conn).await {
                                error!("Error handling connection from {}: {}", peer, e);
                            }
                        }
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                        }
                    }
                }
            }
        });

        ServerHandle {
            shutdown: shutdown_tx,
            task: Some(task),
        }
    }
}

/// Shutdown handshake for a running server: signal the accept loop, then
/// join its task. A handler already blocked in socket I/O is not
/// interrupted; the signal is observed between connections.
pub struct ServerHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl ServerHandle {
    /// Stops accepting and releases the listening socket. Idempotent.
    pub async fn close(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        let _ = self.shutdown.send(true);
        if let Err(e) = task.await {
            error!("Accept task failed: {}", e);
        }
    }
}
