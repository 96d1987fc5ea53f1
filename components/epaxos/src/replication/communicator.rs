use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::qpaxos::*;
use crate::replication::QuorumEvent;
use crate::replication::Transport;
use crate::replication::TransportError;

/// information of communication peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaPeer {
    pub replica_id: ReplicaId,
    pub addr: String,
}

impl ReplicaPeer {
    pub fn new(replica_id: ReplicaId, addr: &str) -> Self {
        Self {
            replica_id,
            addr: addr.to_string(),
        }
    }
}

/// Communicator broadcasts requests of a replica to all of its peers.
/// Every request to a peer runs in its own task. Replies come back through a QuorumEvent.
pub struct Communicator {
    pub replica_id: ReplicaId,
    pub n_replicas: i32,
    pub peers: Vec<ReplicaPeer>,
    transport: Arc<dyn Transport>,
    logger: slog::Logger,
}

impl Communicator {
    pub fn new(
        replica_id: ReplicaId,
        peers: Vec<ReplicaPeer>,
        transport: Arc<dyn Transport>,
        logger: slog::Logger,
    ) -> Communicator {
        Communicator {
            replica_id,
            n_replicas: peers.len() as i32 + 1,
            peers,
            transport,
            logger,
        }
    }

    pub fn send_pre_accept(&self, req: PreAcceptRequest) -> QuorumEvent<PreAcceptReply> {
        self.bcast("pre_accept", req, |t, to, req| async move {
            t.pre_accept(to, req).await
        })
    }

    pub fn send_accept(&self, req: AcceptRequest) -> QuorumEvent<AcceptReply> {
        self.bcast("accept", req, |t, to, req| async move {
            t.accept(to, req).await
        })
    }

    pub fn send_prepare(&self, req: PrepareRequest) -> QuorumEvent<PrepareReply> {
        self.bcast("prepare", req, |t, to, req| async move {
            t.prepare(to, req).await
        })
    }

    /// send_commit does not wait for any acknowledgement: an instance is decided once a
    /// quorum accepted it.
    pub fn send_commit(&self, req: CommitRequest) {
        for p in self.peers.iter() {
            let t = self.transport.clone();
            let to = p.replica_id;
            let req = req.clone();
            let logger = self.logger.clone();

            tokio::spawn(async move {
                if let Err(e) = t.commit(to, req).await {
                    debug!(logger, "commit to {} lost: {}", to, e);
                }
            });
        }
    }

    fn bcast<Q, R, F, Fut>(&self, phase: &'static str, req: Q, f: F) -> QuorumEvent<R>
    where
        Q: Clone + Send + 'static,
        R: QuorumReply + Send + 'static,
        F: Fn(Arc<dyn Transport>, ReplicaId, Q) -> Fut,
        Fut: Future<Output = Result<R, TransportError>> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();

        for p in self.peers.iter() {
            let to = p.replica_id;
            let fut = f(self.transport.clone(), to, req.clone());
            let tx = tx.clone();
            let logger = self.logger.clone();

            tokio::spawn(async move {
                let reply = match fut.await {
                    Ok(r) => Some(r),
                    Err(e) => {
                        debug!(logger, "{} to {} lost: {}", phase, to, e);
                        None
                    }
                };
                // the round may have finished and dropped the receiver.
                let _ = tx.send((to, reply));
            });
        }

        QuorumEvent::new(self.n_replicas, self.peers.len() as i32, rx)
    }
}
