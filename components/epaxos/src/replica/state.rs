use std::collections::BTreeMap;
use std::collections::HashSet;

use crate::qpaxos::{Command, Deps, InstanceId, InstanceIdx, QuorumReply, ReplicaId};
use crate::replica::KeyTracker;
use crate::replica::SlotStore;

/// ReplicaState is everything a replica mutates when it votes or executes.
/// It is guarded by a single lock in Replica and the lock is never held across an await.
#[derive(Debug, Default)]
pub struct ReplicaState {
    pub slots: SlotStore,
    pub keys: KeyTracker,

    /// the highest instance index of every replica this replica has heard of.
    pub received_till: BTreeMap<ReplicaId, InstanceIdx>,

    /// the highest instance index of every replica an execution pass has been started for.
    pub exec_started_till: BTreeMap<ReplicaId, InstanceIdx>,

    /// index of the next instance this replica leads.
    pub next_instance: InstanceIdx,

    /// dependency keys an execution pass is working on.
    pub in_process_dkeys: HashSet<String>,

    pub pause_execution: bool,
}

impl ReplicaState {
    pub fn new() -> Self {
        Self::default()
    }

    /// receive raises received_till of the replica of `iid`.
    pub fn receive(&mut self, iid: InstanceId) {
        let r = self.received_till.entry(iid.replica_id).or_insert(iid.idx);
        if iid.idx > *r {
            *r = iid.idx;
        }
    }

    /// update_internal records a value of instance `iid` that is accepted or committed
    /// locally: the key tracker and received_till learn about it and about its deps.
    pub fn update_internal(
        &mut self,
        cmd: &Command,
        dkey: &str,
        iid: InstanceId,
        seq: i64,
        deps: &Deps,
    ) {
        self.receive(iid);
        if cmd.is_noop() {
            return;
        }

        self.keys.merge(dkey, seq, deps);
        for (rid, idx) in deps.iter() {
            self.receive(InstanceId::new(*rid, *idx));
        }
        self.keys.see_instance(dkey, iid);
    }

    /// update_attributes merges seq and deps of slow path replies into instance `iid`.
    /// A NoOp or decided instance is left untouched.
    pub fn update_attributes<'a, I>(&mut self, iid: InstanceId, replies: I)
    where
        I: Iterator<Item = (i64, &'a Deps)>,
    {
        let inst = self.slots.get_or_create(iid);
        if inst.is_noop() || inst.state.is_decided() {
            return;
        }

        let dkey = inst.dkey.clone();
        let mut learnt = vec![];

        for (seq, deps) in replies {
            inst.seq = std::cmp::max(inst.seq, seq);
            for (rid, idx) in deps.iter() {
                let d = inst.deps.entry(*rid).or_insert(*idx);
                if *idx > *d {
                    *d = *idx;
                }
            }
            learnt.push((seq, deps));
        }

        for (seq, deps) in learnt {
            self.keys.merge(&dkey, seq, deps);
            for (rid, idx) in deps.iter() {
                self.receive(InstanceId::new(*rid, *idx));
            }
        }
    }

    /// update_highest_seen raises the ballot of `iid` to the highest one in replies.
    pub fn update_highest_seen<R: QuorumReply>(
        &mut self,
        iid: InstanceId,
        replies: &[(ReplicaId, R)],
    ) {
        let inst = self.slots.get_or_create(iid);
        for (_, r) in replies.iter() {
            inst.see_ballot(r.last_ballot());
        }
    }
}
