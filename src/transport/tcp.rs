//! Length-prefixed bincode framing over TCP.
//!
//! Each frame is a big-endian `u32` length followed by that many bytes of
//! bincode. Reads wait indefinitely (players idle between turns); writes are
//! bounded by a timeout so a stalled peer cannot wedge the connection task.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::protocol::{ClientMessage, ServerMessage};
use crate::transport::Transport;

/// Timeout for a single frame write.
const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum frame size (1 MB) to bound memory allocation per connection.
const MAX_MESSAGE_SIZE: u32 = 1_000_000;

async fn write_frame<M: Serialize>(stream: &mut TcpStream, msg: &M) -> anyhow::Result<()> {
    let data = bincode::serialize(msg)?;
    if data.len() as u32 > MAX_MESSAGE_SIZE {
        anyhow::bail!("message too large: {} bytes", data.len());
    }
    let write_op = async {
        stream.write_all(&(data.len() as u32).to_be_bytes()).await?;
        stream.write_all(&data).await?;
        anyhow::Ok(())
    };
    timeout(WRITE_TIMEOUT, write_op)
        .await
        .map_err(|_| anyhow::anyhow!("write timeout after {:?}", WRITE_TIMEOUT))?
}

async fn read_frame<M: DeserializeOwned>(stream: &mut TcpStream) -> anyhow::Result<M> {
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            anyhow::anyhow!("connection closed by peer")
        } else {
            anyhow::anyhow!("read error: {}", e)
        }
    })?;

    let len = u32::from_be_bytes(len_buf);
    if len == 0 || len > MAX_MESSAGE_SIZE {
        anyhow::bail!("invalid frame length: {}", len);
    }

    let mut buf = vec![0u8; len as usize];
    stream.read_exact(&mut buf).await?;
    Ok(bincode::deserialize(&buf)?)
}

/// Server side of one accepted connection.
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, msg: &ServerMessage) -> anyhow::Result<()> {
        write_frame(&mut self.stream, msg).await
    }

    async fn recv(&mut self) -> anyhow::Result<ClientMessage> {
        read_frame(&mut self.stream).await
    }
}

/// Client end of the protocol, used by tests and external tooling.
pub struct TcpClient {
    stream: TcpStream,
}

impl TcpClient {
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self { stream })
    }

    pub async fn send(&mut self, msg: &ClientMessage) -> anyhow::Result<()> {
        write_frame(&mut self.stream, msg).await
    }

    pub async fn recv(&mut self) -> anyhow::Result<ServerMessage> {
        read_frame(&mut self.stream).await
    }
}
