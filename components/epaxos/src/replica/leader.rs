use crate::qpaxos::*;
use crate::replica::CommitPath;
use crate::replica::Replica;
use crate::replication::ReplicationError;

/// Leader side of PreAccept, Accept and Commit.
impl Replica {
    /// start_pre_accept proposes `cmd` for instance `iid` with `ballot`.
    ///
    /// `leader_dep` is the dependency of the new value on the replica that owns `iid`. A
    /// normal proposal passes the previous instance of the leader on `dkey`, a recovery passes
    /// what it learnt from the pre-accepted value. `None` removes the dependency.
    pub async fn start_pre_accept(
        &self,
        cmd: &Command,
        dkey: &str,
        ballot: Ballot,
        iid: InstanceId,
        leader_dep: Option<InstanceIdx>,
        recovery: bool,
    ) -> Result<CommitPath, ReplicationError> {
        let req = {
            let mut st = self.lock();

            let seq = st.keys.seq_of(dkey) + 1;
            let mut deps = st.keys.deps_of(dkey);
            match leader_dep {
                Some(d) => deps.insert(iid.replica_id, d),
                None => deps.remove(&iid.replica_id),
            };

            let inst = st.slots.get_or_create(iid);
            if !inst.adopt(cmd, dkey, seq, &deps, ballot, SlotState::PreAccepted) {
                return Ok(CommitPath::Decided);
            }
            let req = MakeRequest::pre_accept(inst, ballot, recovery);

            if !cmd.is_noop() {
                st.keys.merge(dkey, seq, &Deps::new());
                st.keys.see_instance(dkey, iid);
            }
            st.receive(iid);

            req
        };

        debug!(
            self.logger,
            "pre_accept {} ballot:{} seq:{} deps:{:?} recovery:{}",
            iid,
            ballot,
            req.seq,
            req.deps,
            recovery
        );

        let mut ev = self.comm.send_pre_accept(req);
        ev.wait(self.conf.quorum_timeout()).await;

        if ev.fast_path() {
            debug!(self.logger, "pre_accept {} fast path", iid);
            self.start_commit(iid);
            return Ok(CommitPath::FastPath);
        }

        if ev.yes() {
            debug!(self.logger, "pre_accept {} slow path", iid);
            {
                let mut st = self.lock();
                let oks = ev
                    .replies()
                    .iter()
                    .filter(|(_, r)| r.ok())
                    .map(|(_, r)| (r.seq, &r.deps));
                st.update_attributes(iid, oks);
            }
            self.start_accept(iid, ballot).await?;
            return Ok(CommitPath::SlowPath);
        }

        let mut st = self.lock();
        st.update_highest_seen(iid, ev.replies());
        let inst = st.slots.snapshot(iid);
        let err = self.quorum_error("pre_accept", &inst, ballot, ev.n_ok());
        warn!(self.logger, "pre_accept {} failed: {}", iid, err);
        Err(err)
    }

    /// start_accept sends the value of instance `iid` to all peers with `ballot`.
    pub async fn start_accept(
        &self,
        iid: InstanceId,
        ballot: Ballot,
    ) -> Result<CommitPath, ReplicationError> {
        let req = {
            let mut st = self.lock();
            let inst = st.slots.get_or_create(iid);

            if inst.state.is_decided() {
                return Ok(CommitPath::Decided);
            }

            // some other replica started a recovery with a higher ballot.
            if inst.highest_seen > ballot {
                return Err(ReplicationError::StaleBallot(ballot, inst.highest_seen));
            }

            inst.state = SlotState::Accepted;
            inst.value_ballot = ballot;
            inst.touch();
            MakeRequest::accept(inst, ballot)
        };

        debug!(
            self.logger,
            "accept {} ballot:{} seq:{} deps:{:?}", iid, ballot, req.seq, req.deps
        );

        let mut ev = self.comm.send_accept(req);
        ev.wait(self.conf.quorum_timeout()).await;

        if ev.yes() {
            self.start_commit(iid);
            return Ok(CommitPath::SlowPath);
        }

        let mut st = self.lock();
        st.update_highest_seen(iid, ev.replies());
        let inst = st.slots.snapshot(iid);
        let err = self.quorum_error("accept", &inst, ballot, ev.n_ok());
        warn!(self.logger, "accept {} failed: {}", iid, err);
        Err(err)
    }

    /// start_commit marks instance `iid` committed and tells all peers.
    /// It does not wait for any peer.
    pub fn start_commit(&self, iid: InstanceId) {
        let req = {
            let mut st = self.lock();
            let inst = st.slots.get_or_create(iid);

            if inst.state != SlotState::Executed {
                inst.state = SlotState::Committed;
            }
            inst.touch();

            let req = MakeRequest::commit(inst);
            st.update_internal(&req.get_cmd(), &req.dkey, iid, req.seq, &req.deps);
            req
        };

        info!(
            self.logger,
            "commit {} cmd:{} seq:{} deps:{:?}",
            iid,
            req.get_cmd(),
            req.seq,
            req.deps
        );

        self.comm.send_commit(req);
    }

    fn quorum_error(
        &self,
        phase: &'static str,
        inst: &Instance,
        ballot: Ballot,
        n_ok: i32,
    ) -> ReplicationError {
        if inst.highest_seen > ballot {
            ReplicationError::StaleBallot(ballot, inst.highest_seen)
        } else {
            ReplicationError::NotEnoughQuorum(phase, quorum(self.n_replicas), n_ok + 1)
        }
    }
}
