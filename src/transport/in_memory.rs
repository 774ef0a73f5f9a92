//! In-process transport pair for exercising the realtime handler without a
//! socket. Dropping either end closes the other.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::task::yield_now;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::transport::Transport;

type Queue<M> = Arc<Mutex<VecDeque<M>>>;

/// Server end: paired with an [`InMemoryClient`].
pub struct InMemoryTransport {
    inbound: Queue<ClientMessage>,
    outbound: Queue<ServerMessage>,
}

/// Client end: drives the protocol the way a remote peer would.
pub struct InMemoryClient {
    inbound: Queue<ServerMessage>,
    outbound: Queue<ClientMessage>,
}

/// Create a connected server/client pair.
pub fn pair() -> (InMemoryTransport, InMemoryClient) {
    let to_server: Queue<ClientMessage> = Arc::new(Mutex::new(VecDeque::new()));
    let to_client: Queue<ServerMessage> = Arc::new(Mutex::new(VecDeque::new()));
    (
        InMemoryTransport {
            inbound: to_server.clone(),
            outbound: to_client.clone(),
        },
        InMemoryClient {
            inbound: to_client,
            outbound: to_server,
        },
    )
}

fn pop<M>(queue: &Queue<M>) -> Option<M> {
    let mut queue = queue.lock().expect("transport queue poisoned");
    queue.pop_front()
}

fn push<M>(queue: &Queue<M>, msg: M) {
    let mut queue = queue.lock().expect("transport queue poisoned");
    queue.push_back(msg);
}

// The peer holds the only other reference to each queue; a strong count of
// one means it hung up.
fn peer_gone<M>(queue: &Queue<M>) -> bool {
    Arc::strong_count(queue) == 1
}

#[async_trait::async_trait]
impl Transport for InMemoryTransport {
    async fn send(&mut self, msg: &ServerMessage) -> anyhow::Result<()> {
        if peer_gone(&self.outbound) {
            anyhow::bail!("channel closed");
        }
        push(&self.outbound, msg.clone());
        Ok(())
    }

    async fn recv(&mut self) -> anyhow::Result<ClientMessage> {
        loop {
            if let Some(msg) = pop(&self.inbound) {
                return Ok(msg);
            }
            if peer_gone(&self.inbound) {
                anyhow::bail!("channel closed");
            }
            yield_now().await;
        }
    }
}

impl InMemoryClient {
    pub fn send(&self, msg: ClientMessage) {
        push(&self.outbound, msg);
    }

    /// Wait for the next notification from the server.
    pub async fn recv(&self) -> anyhow::Result<ServerMessage> {
        loop {
            if let Some(msg) = pop(&self.inbound) {
                return Ok(msg);
            }
            if peer_gone(&self.inbound) {
                anyhow::bail!("channel closed");
            }
            yield_now().await;
        }
    }

    /// Next notification if one is already queued.
    pub fn try_recv(&self) -> Option<ServerMessage> {
        pop(&self.inbound)
    }
}
