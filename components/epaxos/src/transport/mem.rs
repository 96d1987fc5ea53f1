use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::Weak;

use async_trait::async_trait;
use prost::Message;

use crate::qpaxos::*;
use crate::replica::Replica;
use crate::replication::Transport;
use crate::replication::TransportError;

/// MemNetwork connects replicas in one process.
///
/// Every request and reply is encoded to and decoded from protobuf bytes on its way, as a real
/// network would do. A replica can be disconnected from all others, and a single link can be
/// cut, to simulate partitions. A lost message is reported to the sender at once.
#[derive(Default)]
pub struct MemNetwork {
    replicas: RwLock<BTreeMap<ReplicaId, Weak<Replica>>>,
    down: RwLock<BTreeSet<ReplicaId>>,

    /// cut links, stored with the smaller replica id first.
    cut: RwLock<BTreeSet<(ReplicaId, ReplicaId)>>,
}

impl MemNetwork {
    pub fn new() -> Arc<MemNetwork> {
        Arc::new(MemNetwork::default())
    }

    pub fn register(&self, r: &Arc<Replica>) {
        let mut replicas = self.replicas.write().unwrap_or_else(|e| e.into_inner());
        replicas.insert(r.replica_id, Arc::downgrade(r));
    }

    /// transport_of returns the Transport replica `from` sends requests with.
    pub fn transport_of(self: &Arc<Self>, from: ReplicaId) -> Arc<MemTransport> {
        Arc::new(MemTransport {
            net: self.clone(),
            from,
        })
    }

    /// disconnect isolates a replica from all others.
    pub fn disconnect(&self, rid: ReplicaId) {
        self.down.write().unwrap_or_else(|e| e.into_inner()).insert(rid);
    }

    pub fn reconnect(&self, rid: ReplicaId) {
        self.down.write().unwrap_or_else(|e| e.into_inner()).remove(&rid);
    }

    /// cut breaks the link between two replicas, in both directions.
    pub fn cut(&self, a: ReplicaId, b: ReplicaId) {
        let mut cut = self.cut.write().unwrap_or_else(|e| e.into_inner());
        cut.insert(link(a, b));
    }

    pub fn heal(&self, a: ReplicaId, b: ReplicaId) {
        let mut cut = self.cut.write().unwrap_or_else(|e| e.into_inner());
        cut.remove(&link(a, b));
    }

    pub fn heal_all(&self) {
        self.cut.write().unwrap_or_else(|e| e.into_inner()).clear();
        self.down.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn is_connected(&self, a: ReplicaId, b: ReplicaId) -> bool {
        let down = self.down.read().unwrap_or_else(|e| e.into_inner());
        if down.contains(&a) || down.contains(&b) {
            return false;
        }
        let cut = self.cut.read().unwrap_or_else(|e| e.into_inner());
        !cut.contains(&link(a, b))
    }

    fn replica(&self, from: ReplicaId, to: ReplicaId) -> Result<Arc<Replica>, TransportError> {
        if !self.is_connected(from, to) {
            return Err(TransportError::Disconnected(from, to));
        }

        let replicas = self.replicas.read().unwrap_or_else(|e| e.into_inner());
        replicas
            .get(&to)
            .and_then(|w| w.upgrade())
            .ok_or(TransportError::NoSuchReplica(to))
    }

    fn check_link(&self, from: ReplicaId, to: ReplicaId) -> Result<(), TransportError> {
        if self.is_connected(from, to) {
            Ok(())
        } else {
            Err(TransportError::Disconnected(to, from))
        }
    }
}

fn link(a: ReplicaId, b: ReplicaId) -> (ReplicaId, ReplicaId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// wire sends a message through its protobuf form.
fn wire<M: Message + Default>(m: &M) -> Result<M, TransportError> {
    let mut buf = Vec::with_capacity(m.encoded_len());
    m.encode(&mut buf)?;
    let got = M::decode(buf.as_slice())?;
    Ok(got)
}

/// MemTransport is the Transport of one replica on a MemNetwork.
pub struct MemTransport {
    net: Arc<MemNetwork>,
    from: ReplicaId,
}

#[async_trait]
impl Transport for MemTransport {
    async fn pre_accept(
        &self,
        to: ReplicaId,
        req: PreAcceptRequest,
    ) -> Result<PreAcceptReply, TransportError> {
        tokio::task::yield_now().await;
        let r = self.net.replica(self.from, to)?;
        let reply = r.handle_pre_accept(&wire(&req)?);
        self.net.check_link(self.from, to)?;
        wire(&reply)
    }

    async fn accept(
        &self,
        to: ReplicaId,
        req: AcceptRequest,
    ) -> Result<AcceptReply, TransportError> {
        tokio::task::yield_now().await;
        let r = self.net.replica(self.from, to)?;
        let reply = r.handle_accept(&wire(&req)?);
        self.net.check_link(self.from, to)?;
        wire(&reply)
    }

    async fn commit(&self, to: ReplicaId, req: CommitRequest) -> Result<(), TransportError> {
        tokio::task::yield_now().await;
        let r = self.net.replica(self.from, to)?;
        r.handle_commit(&wire(&req)?);
        Ok(())
    }

    async fn prepare(
        &self,
        to: ReplicaId,
        req: PrepareRequest,
    ) -> Result<PrepareReply, TransportError> {
        tokio::task::yield_now().await;
        let r = self.net.replica(self.from, to)?;
        let reply = r.handle_prepare(&wire(&req)?);
        self.net.check_link(self.from, to)?;
        wire(&reply)
    }
}
