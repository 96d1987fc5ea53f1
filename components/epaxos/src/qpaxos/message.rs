use crate::qpaxos::{
    Ballot, Command, Deps, Instance, InstanceId, PreAcceptStatus, ReplicaId, SlotState,
};

#[derive(Clone, PartialEq, prost::Message)]
pub struct PreAcceptRequest {
    #[prost(message, optional, tag = "1")]
    pub cmd: Option<Command>,
    #[prost(string, tag = "2")]
    pub dkey: String,
    #[prost(message, optional, tag = "3")]
    pub ballot: Option<Ballot>,
    #[prost(int64, tag = "4")]
    pub seq: i64,
    #[prost(btree_map = "int64, int64", tag = "5")]
    pub deps: Deps,
    #[prost(int64, tag = "6")]
    pub replica_id: i64,
    #[prost(int64, tag = "7")]
    pub instance_no: i64,
    /// set if the proposer is recovering this instance.
    #[prost(bool, tag = "8")]
    pub recovery: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PreAcceptReply {
    #[prost(enumeration = "PreAcceptStatus", tag = "1")]
    pub status: i32,
    #[prost(message, optional, tag = "2")]
    pub ballot: Option<Ballot>,
    #[prost(int64, tag = "3")]
    pub seq: i64,
    #[prost(btree_map = "int64, int64", tag = "4")]
    pub deps: Deps,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct AcceptRequest {
    #[prost(message, optional, tag = "1")]
    pub cmd: Option<Command>,
    #[prost(string, tag = "2")]
    pub dkey: String,
    #[prost(message, optional, tag = "3")]
    pub ballot: Option<Ballot>,
    #[prost(int64, tag = "4")]
    pub seq: i64,
    #[prost(btree_map = "int64, int64", tag = "5")]
    pub deps: Deps,
    #[prost(int64, tag = "6")]
    pub replica_id: i64,
    #[prost(int64, tag = "7")]
    pub instance_no: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct AcceptReply {
    #[prost(bool, tag = "1")]
    pub ok: bool,
    #[prost(message, optional, tag = "2")]
    pub ballot: Option<Ballot>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CommitRequest {
    #[prost(message, optional, tag = "1")]
    pub cmd: Option<Command>,
    #[prost(string, tag = "2")]
    pub dkey: String,
    #[prost(message, optional, tag = "3")]
    pub ballot: Option<Ballot>,
    #[prost(int64, tag = "4")]
    pub seq: i64,
    #[prost(btree_map = "int64, int64", tag = "5")]
    pub deps: Deps,
    #[prost(int64, tag = "6")]
    pub replica_id: i64,
    #[prost(int64, tag = "7")]
    pub instance_no: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PrepareRequest {
    #[prost(message, optional, tag = "1")]
    pub ballot: Option<Ballot>,
    #[prost(int64, tag = "2")]
    pub replica_id: i64,
    #[prost(int64, tag = "3")]
    pub instance_no: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PrepareReply {
    #[prost(bool, tag = "1")]
    pub ok: bool,
    #[prost(message, optional, tag = "2")]
    pub cmd: Option<Command>,
    #[prost(string, tag = "3")]
    pub dkey: String,
    #[prost(int64, tag = "4")]
    pub seq: i64,
    #[prost(btree_map = "int64, int64", tag = "5")]
    pub deps: Deps,
    #[prost(enumeration = "SlotState", tag = "6")]
    pub state: i32,
    /// the replica that sent this reply.
    #[prost(int64, tag = "7")]
    pub acceptor_id: i64,
    /// the ballot the reported value is written with, or the ballot to catch up with if not ok.
    #[prost(message, optional, tag = "8")]
    pub ballot: Option<Ballot>,
}

/// QuorumReply is what a quorum collector needs to know about a reply of any phase.
pub trait QuorumReply {
    /// ok is true if the replier accepted the request.
    fn ok(&self) -> bool;

    /// identical is true if the replier agreed without changing any attribute.
    /// Only PreAccept replies may be non-identical.
    fn identical(&self) -> bool {
        self.ok()
    }

    /// last_ballot is the ballot the replier has seen for the instance.
    fn last_ballot(&self) -> Ballot;
}

impl QuorumReply for PreAcceptReply {
    fn ok(&self) -> bool {
        self.status() != PreAcceptStatus::Failed
    }

    fn identical(&self) -> bool {
        self.status() == PreAcceptStatus::Identical
    }

    fn last_ballot(&self) -> Ballot {
        self.ballot.unwrap_or_default()
    }
}

impl QuorumReply for AcceptReply {
    fn ok(&self) -> bool {
        self.ok
    }

    fn last_ballot(&self) -> Ballot {
        self.ballot.unwrap_or_default()
    }
}

impl QuorumReply for PrepareReply {
    fn ok(&self) -> bool {
        self.ok
    }

    fn last_ballot(&self) -> Ballot {
        self.ballot.unwrap_or_default()
    }
}

macro_rules! instance_id_of {
    ($t:ty) => {
        impl $t {
            pub fn instance_id(&self) -> InstanceId {
                InstanceId::new(self.replica_id, self.instance_no)
            }

            pub fn get_ballot(&self) -> Ballot {
                self.ballot.unwrap_or_default()
            }
        }
    };
}

instance_id_of!(PreAcceptRequest);
instance_id_of!(AcceptRequest);
instance_id_of!(CommitRequest);
instance_id_of!(PrepareRequest);

macro_rules! get_cmd {
    ($t:ty) => {
        impl $t {
            /// get_cmd returns the carried command. A missing command is a NoOp.
            pub fn get_cmd(&self) -> Command {
                self.cmd.clone().unwrap_or_else(Command::noop)
            }
        }
    };
}

get_cmd!(PreAcceptRequest);
get_cmd!(AcceptRequest);
get_cmd!(CommitRequest);
get_cmd!(PrepareReply);

impl PrepareReply {
    /// to_instance converts a reply into the instance it describes.
    pub fn to_instance(&self, iid: InstanceId) -> Instance {
        let mut inst = Instance::empty(iid);
        inst.cmd = self.get_cmd();
        inst.dkey = self.dkey.clone();
        inst.seq = self.seq;
        inst.deps = self.deps.clone();
        inst.state = self.state();
        inst.highest_seen = self.last_ballot();
        inst.value_ballot = self.last_ballot();
        inst
    }
}

/// MakeRequest builds requests of every phase from a local instance.
///
/// ```ignore
/// let req = MakeRequest::accept(&inst, ballot);
/// ```
pub struct MakeRequest {}

impl MakeRequest {
    pub fn pre_accept(inst: &Instance, ballot: Ballot, recovery: bool) -> PreAcceptRequest {
        PreAcceptRequest {
            cmd: Some(inst.cmd.clone()),
            dkey: inst.dkey.clone(),
            ballot: Some(ballot),
            seq: inst.seq,
            deps: inst.deps.clone(),
            replica_id: inst.instance_id.replica_id,
            instance_no: inst.instance_id.idx,
            recovery,
        }
    }

    pub fn accept(inst: &Instance, ballot: Ballot) -> AcceptRequest {
        AcceptRequest {
            cmd: Some(inst.cmd.clone()),
            dkey: inst.dkey.clone(),
            ballot: Some(ballot),
            seq: inst.seq,
            deps: inst.deps.clone(),
            replica_id: inst.instance_id.replica_id,
            instance_no: inst.instance_id.idx,
        }
    }

    pub fn commit(inst: &Instance) -> CommitRequest {
        CommitRequest {
            cmd: Some(inst.cmd.clone()),
            dkey: inst.dkey.clone(),
            ballot: Some(inst.highest_seen),
            seq: inst.seq,
            deps: inst.deps.clone(),
            replica_id: inst.instance_id.replica_id,
            instance_no: inst.instance_id.idx,
        }
    }

    pub fn prepare(iid: InstanceId, ballot: Ballot) -> PrepareRequest {
        PrepareRequest {
            ballot: Some(ballot),
            replica_id: iid.replica_id,
            instance_no: iid.idx,
        }
    }
}

/// MakeReply builds replies from the local instance a request addressed.
pub struct MakeReply {}

impl MakeReply {
    pub fn pre_accept(status: PreAcceptStatus, inst: &Instance) -> PreAcceptReply {
        PreAcceptReply {
            status: status as i32,
            ballot: Some(inst.highest_seen),
            seq: inst.seq,
            deps: inst.deps.clone(),
        }
    }

    /// pre_accept_failed rejects a pre-accept and tells the proposer the ballot to catch up.
    pub fn pre_accept_failed(ballot: Ballot) -> PreAcceptReply {
        PreAcceptReply {
            status: PreAcceptStatus::Failed as i32,
            ballot: Some(ballot),
            ..Default::default()
        }
    }

    pub fn accept(ok: bool, ballot: Ballot) -> AcceptReply {
        AcceptReply {
            ok,
            ballot: Some(ballot),
        }
    }

    /// prepare describes the local instance. A not started instance is described as a NoOp.
    pub fn prepare(acceptor_id: ReplicaId, inst: &Instance) -> PrepareReply {
        if inst.state == SlotState::NotStarted {
            return PrepareReply {
                ok: true,
                cmd: Some(Command::noop()),
                state: SlotState::NotStarted as i32,
                acceptor_id,
                ballot: Some(Ballot::initial()),
                ..Default::default()
            };
        }

        PrepareReply {
            ok: true,
            cmd: Some(inst.cmd.clone()),
            dkey: inst.dkey.clone(),
            seq: inst.seq,
            deps: inst.deps.clone(),
            state: inst.state as i32,
            acceptor_id,
            ballot: Some(inst.value_ballot),
        }
    }

    pub fn prepare_failed(acceptor_id: ReplicaId, ballot: Ballot) -> PrepareReply {
        PrepareReply {
            ok: false,
            cmd: Some(Command::noop()),
            acceptor_id,
            ballot: Some(ballot),
            ..Default::default()
        }
    }
}
