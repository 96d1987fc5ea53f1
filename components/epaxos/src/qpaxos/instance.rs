use std::time::Instant;

use crate::qpaxos::{Ballot, Command, Deps, InstanceId, SlotState, NOOP_DKEY};

/// Instance is the agreement state of one slot on one replica.
///
/// `cmd`, `dkey`, `seq` and `deps` can be overwritten by a message with a higher ballot until
/// the instance is committed. After that they never change.
#[derive(Clone, Debug)]
pub struct Instance {
    pub instance_id: InstanceId,
    pub cmd: Command,
    pub dkey: String,
    pub seq: i64,
    pub deps: Deps,

    /// the highest ballot this instance has seen. It never decreases.
    pub highest_seen: Ballot,
    /// the ballot the current value is written with. A recovery compares values by it.
    pub value_ballot: Ballot,
    pub state: SlotState,

    /// set when a recovery is running on this instance.
    pub preparing: bool,

    /// when this instance was last written. Recovery waits for a grace period after it.
    pub received_time: Instant,
}

impl Instance {
    /// empty creates a not-started instance with the initial ballot.
    pub fn empty(instance_id: InstanceId) -> Instance {
        Instance {
            instance_id,
            cmd: Command::noop(),
            dkey: NOOP_DKEY.into(),
            seq: 0,
            deps: Deps::new(),
            highest_seen: Ballot::initial(),
            value_ballot: Ballot::initial(),
            state: SlotState::NotStarted,
            preparing: false,
            received_time: Instant::now(),
        }
    }

    /// adopt overwrites the value of this instance and moves it into `state`.
    /// A committed or executed instance is left untouched and false is returned.
    pub fn adopt(
        &mut self,
        cmd: &Command,
        dkey: &str,
        seq: i64,
        deps: &Deps,
        ballot: Ballot,
        state: SlotState,
    ) -> bool {
        if self.state.is_decided() {
            return false;
        }

        self.cmd = cmd.clone();
        self.dkey = dkey.to_string();
        self.seq = seq;
        self.deps = deps.clone();
        self.highest_seen = std::cmp::max(self.highest_seen, ballot);
        self.value_ballot = ballot;
        self.state = state;
        self.touch();

        true
    }

    /// see_ballot raises highest_seen to `ballot` if it is greater.
    pub fn see_ballot(&mut self, ballot: Ballot) {
        if ballot > self.highest_seen {
            self.highest_seen = ballot;
        }
    }

    pub fn touch(&mut self) {
        self.received_time = Instant::now();
    }

    pub fn is_noop(&self) -> bool {
        self.cmd.is_noop()
    }

    /// same_value checks if two instances agree on command kind, payload, seq and deps.
    pub fn same_value(&self, other: &Instance) -> bool {
        self.cmd == other.cmd && self.dkey == other.dkey && self.seq == other.seq && self.deps == other.deps
    }
}
