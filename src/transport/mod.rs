//! Message transports. The realtime handler is generic over [`Transport`],
//! so the same loop serves TCP connections and the in-memory pair used by
//! the integration tests.

use crate::protocol::{ClientMessage, ServerMessage};

/// Server-side view of one client connection.
#[async_trait::async_trait]
pub trait Transport: Send {
    async fn send(&mut self, msg: &ServerMessage) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<ClientMessage>;
}

pub mod in_memory;
pub mod tcp;

pub use in_memory::{InMemoryClient, InMemoryTransport};
pub use tcp::{TcpClient, TcpTransport};
