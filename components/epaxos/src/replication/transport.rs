use async_trait::async_trait;

use crate::qpaxos::*;
use crate::replication::TransportError;

/// Transport delivers a request from the replica that owns it to a peer and returns the
/// peer's reply.
///
/// A Transport is at-least-once: a request may be delivered more than once. Every handler is
/// idempotent for a given ballot.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn pre_accept(
        &self,
        to: ReplicaId,
        req: PreAcceptRequest,
    ) -> Result<PreAcceptReply, TransportError>;

    async fn accept(&self, to: ReplicaId, req: AcceptRequest)
        -> Result<AcceptReply, TransportError>;

    async fn commit(&self, to: ReplicaId, req: CommitRequest) -> Result<(), TransportError>;

    async fn prepare(
        &self,
        to: ReplicaId,
        req: PrepareRequest,
    ) -> Result<PrepareReply, TransportError>;
}
