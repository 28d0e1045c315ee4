use std::future::Future;
use tracing::{debug, info};

use crate::connection::Connection;
use crate::error::Result;

/// Per-connection application logic, invoked once per accepted connection.
/// The connection closes when `handle` returns.
pub trait RequestHandler: Send + Sync + 'static {
    fn handle(&self, conn: &mut Connection) -> impl Future<Output = Result<()>> + Send;
}

/// Base behavior: receive a single message and log it. Concrete handlers
/// that want it call it explicitly after their own logic.
pub async fn receive_and_log(conn: &mut Connection) -> Result<()> {
    match conn.receive().await? {
        Some(msg) => info!("Handle request from {}: {}", conn.peer_addr(), msg),
        None => debug!("Peer {} closed before sending", conn.peer_addr()),
    }
    Ok(())
}

/// The base handler: logs one received message and returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogHandler;

impl RequestHandler for LogHandler {
    async fn handle(&self, conn: &mut Connection) -> Result<()> {
        receive_and_log(conn).await
    }
}

/// Receives one message and replies with its upper-cased form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UppercaseHandler;

impl RequestHandler for UppercaseHandler {
    async fn handle(&self, conn: &mut Connection) -> Result<()> {
        let Some(msg) = conn.receive().await? else {
            debug!("Peer {} closed before sending", conn.peer_addr());
            return Ok(());
        };
        info!("Handle request from {}: {}", conn.peer_addr(), msg);
        conn.send(&msg.to_uppercase()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::{TcpListener, TcpStream};

    async fn connection_pair() -> (Connection, Connection) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let dial = TcpStream::connect(addr);
        let (outbound, (inbound, _)) = tokio::join!(dial, async {
            listener.accept().await.unwrap()
        });
        (
            Connection::new(outbound.unwrap()).unwrap(),
            Connection::new(inbound).unwrap(),
        )
    }

    #[tokio::test]
    async fn uppercase_handler_echoes_uppercased() {
        let (mut client_side, mut server_side) = connection_pair().await;

        client_side.send("hello world").await.unwrap();
        UppercaseHandler.handle(&mut server_side).await.unwrap();

        assert_eq!(
            client_side.receive().await.unwrap().unwrap(),
            "HELLO WORLD"
        );
    }

    #[tokio::test]
    async fn uppercase_handler_tolerates_immediate_close() {
        let (client_side, mut server_side) = connection_pair().await;
        drop(client_side);
        UppercaseHandler.handle(&mut server_side).await.unwrap();
    }

    #[tokio::test]
    async fn log_handler_consumes_one_message() {
        let (mut client_side, mut server_side) = connection_pair().await;
        client_side.send("just logging").await.unwrap();
        LogHandler.handle(&mut server_side).await.unwrap();
    }
}
