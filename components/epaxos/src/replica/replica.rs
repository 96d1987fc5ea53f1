use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::conf::ClusterInfo;
use crate::conf::ReplicaConf;
use crate::qpaxos::*;
use crate::replica::ReplicaError;
use crate::replica::ReplicaState;
use crate::replication::Communicator;
use crate::replication::ReplicationError;
use crate::replication::Transport;

/// StateMachine is the application an executed command is applied to.
/// `apply` is called exactly once for every executed non-NoOp command, in execution order.
/// It is called with the replica state locked and must not call back into the replica.
pub trait StateMachine: Send + Sync {
    fn apply(&self, iid: InstanceId, cmd: &Command);
}

/// CommitPath tells how a leader driven round got an instance committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitPath {
    /// committed after one PreAccept round.
    FastPath,
    /// committed after a PreAccept and an Accept round.
    SlowPath,
    /// some other replica had it committed.
    Decided,
}

/// structure to represent a replica
pub struct Replica {
    pub replica_id: ReplicaId,
    pub epoch: i64,
    pub n_replicas: i32,
    pub conf: ReplicaConf,

    pub(crate) comm: Communicator,
    pub(crate) app: Arc<dyn StateMachine>,
    state: Mutex<ReplicaState>,

    pub logger: slog::Logger,
}

impl Replica {
    /// new creates a replica of `cluster`. Its requests to peers go through `transport`.
    /// Background loops are not started until start_loops() is called.
    pub fn new(
        replica_id: ReplicaId,
        cluster: &ClusterInfo,
        transport: Arc<dyn Transport>,
        app: Arc<dyn StateMachine>,
        logger: &slog::Logger,
    ) -> Result<Replica, ReplicaError> {
        if !cluster.replicas.contains_key(&replica_id) {
            return Err(ReplicaError::ReplicaNotFound(replica_id));
        }

        let logger = logger.new(o!("replica_id" => replica_id));
        let peers = cluster.peers_of(replica_id)?;
        let comm = Communicator::new(replica_id, peers, transport, logger.clone());

        Ok(Replica {
            replica_id,
            epoch: cluster.epoch,
            n_replicas: cluster.n_replicas(),
            conf: cluster.conf.clone(),
            comm,
            app,
            state: Mutex::new(ReplicaState::new()),
            logger,
        })
    }

    /// lock returns the replica state. A poisoned lock is recovered: every update of the state
    /// is complete before anything that may panic is called.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ReplicaState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// start_loops spawns the background execution loop if it is enabled.
    /// The loop exits after the replica is dropped.
    pub fn start_loops(self: &Arc<Self>) {
        if self.conf.exec {
            let weak = Arc::downgrade(self);
            tokio::spawn(Replica::exec_loop(weak));
        }
    }

    /// new_instance allocates the next instance of this replica for a command on `dkey`.
    /// The key tracker is updated at once so that a following command on the same key depends
    /// on this one even before this one is pre-accepted.
    ///
    /// It returns the instance id and the previous instance of this replica on `dkey`.
    fn new_instance(&self, dkey: &str) -> (InstanceId, Option<InstanceIdx>) {
        let mut st = self.lock();

        let idx = st.next_instance;
        st.next_instance += 1;

        let leader_dep = st.keys.dep_of(dkey, self.replica_id);
        st.keys.set_dep(dkey, self.replica_id, idx);

        (InstanceId::new(self.replica_id, idx), leader_dep)
    }

    /// start accepts a command synchronously and runs the agreement in background.
    pub fn start(self: &Arc<Self>, cmd: Command, dkey: &str) -> InstanceId {
        let (iid, leader_dep) = self.new_instance(dkey);
        let ballot = Ballot::default_of(self.epoch, self.replica_id);

        debug!(self.logger, "start {} on dkey:{}", iid, dkey);

        let r = self.clone();
        let dkey = dkey.to_string();
        tokio::spawn(async move {
            let rst = r
                .start_pre_accept(&cmd, &dkey, ballot, iid, leader_dep, false)
                .await;
            if let Err(e) = rst {
                warn!(r.logger, "propose {} failed: {}", iid, e);
            }
        });

        iid
    }

    /// propose runs the agreement of a command and returns when it is committed or failed.
    pub async fn propose(
        &self,
        cmd: Command,
        dkey: &str,
    ) -> Result<(InstanceId, CommitPath), ReplicationError> {
        let (iid, leader_dep) = self.new_instance(dkey);
        let ballot = Ballot::default_of(self.epoch, self.replica_id);

        debug!(self.logger, "propose {} on dkey:{}", iid, dkey);

        let path = self
            .start_pre_accept(&cmd, dkey, ballot, iid, leader_dep, false)
            .await?;
        Ok((iid, path))
    }

    /// get_state returns a snapshot of an instance.
    pub fn get_state(&self, iid: InstanceId) -> Instance {
        self.lock().slots.snapshot(iid)
    }

    /// pause_execution stops or resumes starting new execution passes.
    pub fn pause_execution(&self, pause: bool) {
        self.lock().pause_execution = pause;
        info!(self.logger, "pause execution: {}", pause);
    }

    pub fn received_till(&self) -> std::collections::BTreeMap<ReplicaId, InstanceIdx> {
        self.lock().received_till.clone()
    }
}
