use std::sync::Arc;

use crate::qpaxos::*;
use crate::replica::CommitPath;
use crate::replica::Replica;
use crate::replication::ReplicationError;

/// What a recovery learnt from the prepare replies.
enum Recovered {
    Committed(PrepareReply),
    Accepted(PrepareReply),
    /// enough identical pre-accepted values with the default ballot of the leader: it could
    /// have been committed on the fast path.
    FastAccepted(PrepareReply),
    PreAccepted(PrepareReply),
    Nothing,
}

impl Replica {
    /// start_prepare runs one recovery attempt of instance `iid`.
    /// Ok means `iid` is committed.
    pub async fn start_prepare(&self, iid: InstanceId) -> Result<CommitPath, ReplicationError> {
        let (ballot, self_reply) = {
            let mut st = self.lock();
            let inst = st.slots.get_or_create(iid);

            if inst.state.is_decided() {
                return Ok(CommitPath::Decided);
            }

            let self_reply = MakeReply::prepare(self.replica_id, inst);
            let ballot = inst.highest_seen.next(self.epoch, self.replica_id);
            inst.see_ballot(ballot);

            (ballot, self_reply)
        };

        debug!(self.logger, "prepare {} ballot:{}", iid, ballot);

        // every reply counts when choosing the value, not only the first majority.
        let mut ev = self.comm.send_prepare(MakeRequest::prepare(iid, ballot));
        ev.wait_all(self.conf.quorum_timeout()).await;

        if !ev.yes() {
            let mut st = self.lock();
            st.update_highest_seen(iid, ev.replies());
            let seen = st.slots.snapshot(iid).highest_seen;

            if seen > ballot {
                return Err(ReplicationError::StaleBallot(ballot, seen));
            }
            return Err(ReplicationError::NotEnoughQuorum(
                "prepare",
                quorum(self.n_replicas),
                ev.n_ok() + 1,
            ));
        }

        let mut replies: Vec<PrepareReply> = ev
            .into_replies()
            .into_iter()
            .map(|(_, r)| r)
            .filter(|r| r.ok)
            .collect();
        replies.push(self_reply);

        match self.choose_recovered(iid, &replies) {
            Recovered::Committed(r) => {
                info!(self.logger, "prepare {} found committed from {}", iid, r.acceptor_id);
                self.adopt_recovered(iid, &r, ballot, SlotState::Committed);
                self.start_commit(iid);
                Ok(CommitPath::Decided)
            }
            Recovered::Accepted(r) => {
                info!(self.logger, "prepare {} found accepted from {}", iid, r.acceptor_id);
                self.adopt_recovered(iid, &r, ballot, SlotState::Accepted);
                self.start_accept(iid, ballot).await
            }
            Recovered::FastAccepted(r) => {
                info!(self.logger, "prepare {} found identical pre-accepted", iid);
                self.adopt_recovered(iid, &r, ballot, SlotState::PreAccepted);
                self.start_accept(iid, ballot).await
            }
            Recovered::PreAccepted(r) => {
                info!(self.logger, "prepare {} found pre-accepted from {}", iid, r.acceptor_id);
                let leader_dep = r.deps.get(&iid.replica_id).cloned();
                self.start_pre_accept(&r.get_cmd(), &r.dkey, ballot, iid, leader_dep, true)
                    .await
            }
            Recovered::Nothing => {
                info!(self.logger, "prepare {} found nothing, propose NoOp", iid);
                self.start_pre_accept(&Command::noop(), NOOP_DKEY, ballot, iid, None, true)
                    .await
            }
        }
    }

    /// choose_recovered picks the value to recover from `replies`. A committed value is taken
    /// as is, otherwise only replies whose value is written with the highest ballot are
    /// considered. Every value used is learnt by the key tracker.
    fn choose_recovered(&self, iid: InstanceId, replies: &[PrepareReply]) -> Recovered {
        let informative = replies
            .iter()
            .filter(|r| r.state() != SlotState::NotStarted);

        // a committed value is final whatever ballot it carries.
        if let Some(r) = informative.clone().find(|r| r.state().is_decided()) {
            let mut st = self.lock();
            st.update_internal(&r.get_cmd(), &r.dkey, iid, r.seq, &r.deps);
            return Recovered::Committed(r.clone());
        }

        let highest = match informative.clone().map(|r| r.last_ballot()).max() {
            Some(b) => b,
            None => return Recovered::Nothing,
        };

        let highest_replies: Vec<&PrepareReply> = informative
            .filter(|r| r.last_ballot() == highest)
            .collect();

        let mut st = self.lock();
        for r in highest_replies.iter() {
            st.update_internal(&r.get_cmd(), &r.dkey, iid, r.seq, &r.deps);
        }
        drop(st);

        if let Some(r) = highest_replies
            .iter()
            .find(|r| r.state() == SlotState::Accepted)
        {
            return Recovered::Accepted((*r).clone());
        }

        let pre_accepted: Vec<&PrepareReply> = highest_replies
            .iter()
            .filter(|r| r.state() == SlotState::PreAccepted)
            .cloned()
            .collect();

        if highest.is_default() {
            // the leader itself does not count: it may have pre-accepted a value nobody else saw.
            let others: Vec<&PrepareReply> = pre_accepted
                .iter()
                .filter(|r| r.acceptor_id != iid.replica_id)
                .cloned()
                .collect();

            for r in others.iter() {
                let n_identical = others
                    .iter()
                    .filter(|x| {
                        x.get_cmd() == r.get_cmd()
                            && x.dkey == r.dkey
                            && x.seq == r.seq
                            && x.deps == r.deps
                    })
                    .count() as i32;

                if n_identical >= self.n_replicas / 2 {
                    return Recovered::FastAccepted((*r).clone());
                }
            }
        }

        match pre_accepted.first() {
            Some(r) => Recovered::PreAccepted((*r).clone()),
            None => Recovered::Nothing,
        }
    }

    fn adopt_recovered(
        &self,
        iid: InstanceId,
        r: &PrepareReply,
        ballot: Ballot,
        state: SlotState,
    ) {
        let mut st = self.lock();
        let inst = st.slots.get_or_create(iid);
        inst.adopt(&r.get_cmd(), &r.dkey, r.seq, &r.deps, ballot, state);
    }

    /// prepare_till_committed recovers instance `iid` until it is committed.
    ///
    /// It does nothing until the instance has not been touched for a grace period, in case the
    /// leader is still working on it. Only one recovery runs on an instance at a time: a second
    /// one waits for the first and returns once the instance is committed.
    pub async fn prepare_till_committed(&self, iid: InstanceId) {
        let grace = self.conf.recovery_grace();

        loop {
            {
                let mut st = self.lock();
                let inst = st.slots.get_or_create(iid);

                if inst.state.is_decided() {
                    return;
                }

                if inst.received_time.elapsed() > grace && !inst.preparing {
                    inst.preparing = true;
                    break;
                }
            }

            tokio::time::sleep(self.conf.recovery_poll()).await;
        }

        debug!(self.logger, "prepare till committed {}", iid);

        loop {
            match self.start_prepare(iid).await {
                Ok(_) => break,
                Err(e) => {
                    debug!(self.logger, "prepare {} failed: {}, retry", iid, e);
                    tokio::time::sleep(self.conf.recovery_backoff()).await;
                }
            }
        }

        let mut st = self.lock();
        st.slots.get_or_create(iid).preparing = false;
    }

    /// prepare starts a recovery of instance `iid` in background.
    pub fn prepare(self: &Arc<Self>, iid: InstanceId) {
        let r = self.clone();
        tokio::spawn(async move {
            r.prepare_till_committed(iid).await;
        });
    }

    /// prepare_all starts a recovery of every instance up to the highest known one of every
    /// replica.
    pub fn prepare_all(self: &Arc<Self>) {
        let last = {
            let st = self.lock();
            let mut last = st.slots.last_instances();
            last.remove(&self.replica_id);
            if st.next_instance > 0 {
                last.insert(self.replica_id, st.next_instance - 1);
            }
            last
        };

        info!(self.logger, "prepare all till: {:?}", last);

        for (rid, till) in last {
            for idx in 0..=till {
                self.prepare(InstanceId::new(rid, idx));
            }
        }
    }
}
