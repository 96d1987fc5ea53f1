use crate::qpaxos::Ballot;
use crate::qpaxos::ReplicaId;

quick_error! {
    /// TransportError is an error a Transport returns when a request can not be delivered or
    /// a reply can not be received.
    #[derive(Debug)]
    pub enum TransportError {
        Disconnected(from: ReplicaId, to: ReplicaId) {
            display("link {} -> {} is down", from, to)
        }

        NoSuchReplica(rid: ReplicaId) {
            display("replica {} not found", rid)
        }

        Decode(e: prost::DecodeError) {
            from(e: prost::DecodeError) -> (e)
        }

        Encode(e: prost::EncodeError) {
            from(e: prost::EncodeError) -> (e)
        }
    }
}

quick_error! {
    /// ReplicationError is an error encountered during a leader driven round of an instance.
    /// None of them is fatal: the caller retries with a higher ballot or starts a recovery.
    #[derive(Debug, PartialEq, Eq)]
    pub enum ReplicationError {
        /// The ballot number is too small to proceed.
        StaleBallot(stale: Ballot, last: Ballot) {
            from(bb: (Ballot, Ballot)) -> (bb.0, bb.1)
            display("ballot {} is stale, seen: {}", stale, last)
        }

        NotEnoughQuorum(phase: &'static str, want: i32, got: i32) {
            display("{}: want at least {} replies, but:{}", phase, want, got)
        }
    }
}
