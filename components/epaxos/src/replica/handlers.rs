use crate::qpaxos::*;
use crate::replica::Replica;

/// Receiver side of every phase.
/// A rejection is not an error: it is a reply with the ballot the sender has to catch up with.
impl Replica {
    pub fn handle_pre_accept(&self, req: &PreAcceptRequest) -> PreAcceptReply {
        let iid = req.instance_id();
        let ballot = req.get_ballot();
        let cmd = req.get_cmd();

        let mut st = self.lock();
        let keys_seq = st.keys.seq_of(&req.dkey);
        let keys_deps = st.keys.deps_of(&req.dkey);

        let inst = st.slots.get_or_create(iid);

        if ballot <= inst.highest_seen {
            debug!(
                self.logger,
                "pre_accept {} stale ballot:{} seen:{}", iid, ballot, inst.highest_seen
            );
            return MakeReply::pre_accept_failed(inst.highest_seen);
        }

        // A value could have been chosen. The sender has to recover it with a Prepare.
        if inst.state >= SlotState::Accepted {
            inst.highest_seen = ballot;
            debug!(self.logger, "pre_accept {} refused, state:{:?}", iid, inst.state);
            return MakeReply::pre_accept_failed(ballot);
        }

        let mut status = PreAcceptStatus::Identical;

        let seq = std::cmp::max(keys_seq + 1, req.seq);
        if seq != req.seq {
            status = PreAcceptStatus::NonIdentical;
        }

        let mut deps = req.deps.clone();
        for (rid, idx) in keys_deps.iter() {
            if *rid == iid.replica_id {
                continue;
            }
            let d = deps.entry(*rid).or_insert(-1);
            if *idx > *d {
                *d = *idx;
                status = PreAcceptStatus::NonIdentical;
            }
        }

        inst.adopt(&cmd, &req.dkey, seq, &deps, ballot, SlotState::PreAccepted);
        let reply = MakeReply::pre_accept(status, inst);

        if !cmd.is_noop() {
            st.keys.merge(&req.dkey, seq, &deps);
            st.keys.see_instance(&req.dkey, iid);
        }
        st.receive(iid);

        debug!(self.logger, "pre_accept {} status:{:?} seq:{}", iid, status, seq);
        reply
    }

    pub fn handle_accept(&self, req: &AcceptRequest) -> AcceptReply {
        let iid = req.instance_id();
        let ballot = req.get_ballot();
        let cmd = req.get_cmd();

        let mut st = self.lock();
        let inst = st.slots.get_or_create(iid);

        // Not strict: a leader confirms its own slow path proposal with the same ballot.
        if ballot < inst.highest_seen {
            debug!(
                self.logger,
                "accept {} stale ballot:{} seen:{}", iid, ballot, inst.highest_seen
            );
            return MakeReply::accept(false, inst.highest_seen);
        }

        if inst.state.is_decided() {
            inst.highest_seen = ballot;
            return MakeReply::accept(false, ballot);
        }

        inst.adopt(&cmd, &req.dkey, req.seq, &req.deps, ballot, SlotState::Accepted);

        st.update_internal(&cmd, &req.dkey, iid, req.seq, &req.deps);

        debug!(self.logger, "accepted {} ballot:{}", iid, ballot);
        MakeReply::accept(true, ballot)
    }

    pub fn handle_commit(&self, req: &CommitRequest) {
        let iid = req.instance_id();
        let cmd = req.get_cmd();

        let mut st = self.lock();
        let inst = st.slots.get_or_create(iid);

        let ballot = std::cmp::max(req.get_ballot(), inst.highest_seen);

        if inst.state.is_decided() {
            return;
        }

        inst.adopt(&cmd, &req.dkey, req.seq, &req.deps, ballot, SlotState::Committed);
        st.update_internal(&cmd, &req.dkey, iid, req.seq, &req.deps);

        debug!(self.logger, "committed {} cmd:{} seq:{}", iid, cmd, req.seq);
    }

    /// handle_prepare reports the local instance to a recovering replica.
    /// The prepare ballot is not recorded: the recovering replica runs PreAccept with the same
    /// ballot afterwards, which requires a strictly greater ballot.
    pub fn handle_prepare(&self, req: &PrepareRequest) -> PrepareReply {
        let iid = req.instance_id();
        let ballot = req.get_ballot();

        let mut st = self.lock();
        let inst = st.slots.get_or_create(iid);

        if ballot <= inst.highest_seen {
            debug!(
                self.logger,
                "prepare {} stale ballot:{} seen:{}", iid, ballot, inst.highest_seen
            );
            return MakeReply::prepare_failed(self.replica_id, inst.highest_seen);
        }

        MakeReply::prepare(self.replica_id, inst)
    }
}
