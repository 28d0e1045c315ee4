use socket2::TcpKeepalive;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::{Error, Result};

/// Upper bound on a single frame's payload. Oversized messages fail loudly
/// instead of truncating at the read buffer like an unframed stream would.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// One message per frame: a big-endian u32 payload length followed by that
/// many bytes of UTF-8 text. Wraps exactly one underlying stream; there is
/// no reconnection logic.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Result<Self> {
        let peer = stream.peer_addr().map_err(Error::Connection)?;
        configure_keepalive(&stream).map_err(Error::Connection)?;
        Ok(Self { stream, peer })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Writes one framed message. Fails with `Error::Connection` if the peer
    /// has closed the stream.
    pub async fn send(&mut self, msg: &str) -> Result<()> {
        let payload = msg.as_bytes();
        if payload.len() > MAX_FRAME_LEN {
            return Err(Error::FrameTooLarge {
                len: payload.len(),
                max: MAX_FRAME_LEN,
            });
        }

        debug!("Send {} byte message to {}", payload.len(), self.peer);
        self.stream
            .write_u32(payload.len() as u32)
            .await
            .map_err(Error::Connection)?;
        self.stream
            .write_all(payload)
            .await
            .map_err(Error::Connection)?;
        Ok(())
    }

    /// Reads one whole framed message. Returns `None` if the peer closed the
    /// connection cleanly before a frame started; an EOF mid-frame is an
    /// `Error::Connection`.
    pub async fn receive(&mut self) -> Result<Option<String>> {
        let mut len_buf = [0u8; 4];
        let mut filled = 0;
        while filled < len_buf.len() {
            let n = self
                .stream
                .read(&mut len_buf[filled..])
                .await
                .map_err(Error::Connection)?;
            if n == 0 {
                if filled == 0 {
                    debug!("Peer {} closed the connection", self.peer);
                    return Ok(None);
                }
                return Err(Error::Connection(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "peer closed mid-frame",
                )));
            }
            filled += n;
        }

        let len = u32::from_be_bytes(len_buf) as usize;
        if len > MAX_FRAME_LEN {
            return Err(Error::FrameTooLarge {
                len,
                max: MAX_FRAME_LEN,
            });
        }

        let mut payload = vec![0u8; len];
        self.stream
            .read_exact(&mut payload)
            .await
            .map_err(Error::Connection)?;

        debug!("Receive {} byte message from {}", len, self.peer);
        Ok(Some(String::from_utf8_lossy(&payload).into_owned()))
    }
}

fn configure_keepalive(stream: &TcpStream) -> io::Result<()> {
    let sock_ref = socket2::SockRef::from(stream);

    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(30))
        .with_interval(Duration::from_secs(10));
    sock_ref.set_tcp_keepalive(&keepalive)?;

    // reduce latency for the small request/response frames
    stream.set_nodelay(true)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio_test::assert_ok;

    async fn stream_pair() -> (Connection, Connection) {
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
    async fn framed_round_trip() {
        let (mut a, mut b) = stream_pair().await;
        assert_ok!(a.send("hello").await);
        assert_eq!(b.receive().await.unwrap(), Some("hello".to_string()));
    }

    #[tokio::test]
    async fn frames_keep_message_boundaries() {
        let (mut a, mut b) = stream_pair().await;
        a.send("first").await.unwrap();
        a.send("second").await.unwrap();
        assert_eq!(b.receive().await.unwrap().unwrap(), "first");
        assert_eq!(b.receive().await.unwrap().unwrap(), "second");
    }

    #[tokio::test]
    async fn payload_larger_than_legacy_buffer_survives() {
        // the unframed original truncated at 1024 bytes per read
        let (mut a, mut b) = stream_pair().await;
        let msg = "x".repeat(5000);
        a.send(&msg).await.unwrap();
        assert_eq!(b.receive().await.unwrap().unwrap(), msg);
    }

    #[tokio::test]
    async fn clean_close_yields_none() {
        let (a, mut b) = stream_pair().await;
        drop(a);
        assert_eq!(b.receive().await.unwrap(), None);
    }

    #[tokio::test]
    async fn oversized_send_is_rejected_locally() {
        let (mut a, _b) = stream_pair().await;
        let msg = "x".repeat(MAX_FRAME_LEN + 1);
        let err = a.send(&msg).await.unwrap_err();
        assert!(matches!(err, Error::FrameTooLarge { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn oversized_frame_header_is_rejected() {
        let (a, mut b) = stream_pair().await;
        let mut raw = a.stream;
        raw.write_u32((MAX_FRAME_LEN + 1) as u32).await.unwrap();
        let err = b.receive().await.unwrap_err();
        assert!(matches!(err, Error::FrameTooLarge { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn eof_mid_frame_is_a_connection_error() {
        let (a, mut b) = stream_pair().await;
        let mut raw = a.stream;
        raw.write_u32(100).await.unwrap();
        raw.write_all(b"only part").await.unwrap();
        drop(raw);
        let err = b.receive().await.unwrap_err();
        assert!(matches!(err, Error::Connection(_)), "got {err:?}");
    }
}
