use std::collections::BTreeMap;
use std::convert::TryFrom;

#[macro_use]
pub mod macros;

mod display;
pub mod instance;
pub mod message;
pub mod quorums;

pub use display::*;
pub use instance::*;
pub use message::*;
pub use quorums::*;

#[cfg(test)]
mod test_ballot;

#[cfg(test)]
mod test_command;

#[cfg(test)]
mod test_display;

#[cfg(test)]
mod test_instance;



pub type ReplicaId = i64;
pub type InstanceIdx = i64;

/// Deps maps a replica to the highest instance of it a command must execute after.
/// A BTreeMap keeps the iteration order, and thus the graph construction, deterministic.
pub type Deps = BTreeMap<ReplicaId, InstanceIdx>;

/// NOOP_DKEY is the dependency key carried by a NoOp command.
/// NoOp never takes part in conflict tracking.
pub const NOOP_DKEY: &str = "";

/// Ballot is ordered by (epoch, ballot_no, replica_id), in this field order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::From, prost::Message)]
pub struct Ballot {
    #[prost(int64, tag = "1")]
    pub epoch: i64,
    #[prost(int64, tag = "2")]
    pub ballot_no: i64,
    #[prost(int64, tag = "3")]
    pub replica_id: i64,
}

impl Ballot {
    /// initial returns the ballot of an instance that has seen nothing. It is lower than any
    /// ballot a proposer uses.
    pub fn initial() -> Ballot {
        Ballot {
            epoch: 0,
            ballot_no: -1,
            replica_id: 0,
        }
    }

    /// default_of returns the ballot a leader uses for its first proposal of an instance.
    pub fn default_of(epoch: i64, replica_id: ReplicaId) -> Ballot {
        Ballot {
            epoch,
            ballot_no: 0,
            replica_id,
        }
    }

    /// is_default checks if this is a ballot of a first proposal, i.e. no recovery has
    /// happened on it.
    pub fn is_default(&self) -> bool {
        self.ballot_no == 0
    }

    /// next returns a ballot owned by `replica_id` that is greater than any ballot with the
    /// same epoch and a ballot_no not greater than `self.ballot_no`.
    pub fn next(&self, epoch: i64, replica_id: ReplicaId) -> Ballot {
        Ballot {
            epoch,
            ballot_no: std::cmp::max(self.ballot_no, 0) + 1,
            replica_id,
        }
    }
}

/// InstanceId identifies an instance(a slot) by the replica that owns it and a per-replica index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::From)]
pub struct InstanceId {
    pub replica_id: ReplicaId,
    pub idx: InstanceIdx,
}

impl InstanceId {
    pub fn new(replica_id: ReplicaId, idx: InstanceIdx) -> InstanceId {
        InstanceId { replica_id, idx }
    }

    /// prev returns the instance right before this one of the same replica.
    pub fn prev(&self) -> Option<InstanceId> {
        if self.idx <= 0 {
            None
        } else {
            Some(InstanceId::new(self.replica_id, self.idx - 1))
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum OpCode {
    NoOp = 0,
    Apply = 1,
}

/// Command is an opaque payload for the application state machine.
/// The conflict key is carried beside it, not inside it.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct Command {
    #[prost(enumeration = "OpCode", tag = "1")]
    pub op: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,
}

impl Command {
    pub fn noop() -> Command {
        Command {
            op: OpCode::NoOp as i32,
            payload: vec![],
        }
    }

    pub fn apply(payload: &[u8]) -> Command {
        Command {
            op: OpCode::Apply as i32,
            payload: payload.to_vec(),
        }
    }

    /// kind returns NoOp for a NoOp or for an unknown op code, which can only be produced by
    /// a corrupted message.
    pub fn kind(&self) -> OpCode {
        OpCode::try_from(self.op).unwrap_or(OpCode::NoOp)
    }

    pub fn is_noop(&self) -> bool {
        self.kind() == OpCode::NoOp
    }
}

impl From<&str> for Command {
    fn from(payload: &str) -> Command {
        Command::apply(payload.as_bytes())
    }
}

impl From<&[u8]> for Command {
    fn from(payload: &[u8]) -> Command {
        Command::apply(payload)
    }
}

/// SlotState is the life cycle of an instance on one replica.
/// The declaration order is the progress order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum SlotState {
    NotStarted = 0,
    PreAccepted = 1,
    Accepted = 2,
    Committed = 3,
    Executed = 4,
}

impl SlotState {
    /// is_decided returns true if value, seq and deps of an instance can no longer change.
    pub fn is_decided(&self) -> bool {
        *self >= SlotState::Committed
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum PreAcceptStatus {
    Identical = 0,
    NonIdentical = 1,
    Failed = 2,
}
