use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use rand::seq::SliceRandom;

use epaxos::conf::ClusterInfo;
use epaxos::qpaxos::{Command, InstanceId, ReplicaId};
use epaxos::replica::{CommitPath, Replica};
use epaxos::replication::ReplicationError;
use epaxos::testutil::{wait_until, Recorder};
use epaxos::transport::MemNetwork;

use crate::OrdoError;

/// Proposal is one command submitted by LocalCluster::run and how it ended.
#[derive(Debug)]
pub struct Proposal {
    pub leader: ReplicaId,
    pub key: String,
    pub cmd: String,
    pub result: Result<(InstanceId, CommitPath), ReplicationError>,
}

struct Member {
    replica: Arc<Replica>,
    app: Arc<Recorder>,
}

/// LocalCluster runs every replica of a cluster conf in this process, connected by a
/// MemNetwork.
pub struct LocalCluster {
    pub net: Arc<MemNetwork>,
    members: BTreeMap<ReplicaId, Member>,
    logger: slog::Logger,
}

impl LocalCluster {
    /// new creates all replicas and starts their background loops.
    /// It must be called inside a tokio runtime.
    pub fn new(cluster: &ClusterInfo, logger: &slog::Logger) -> Result<LocalCluster, OrdoError> {
        cluster.check()?;

        let net = MemNetwork::new();
        let mut members = BTreeMap::new();

        for rid in cluster.replicas.keys() {
            let app = Recorder::new();
            let replica = Replica::new(*rid, cluster, net.transport_of(*rid), app.clone(), logger)?;
            let replica = Arc::new(replica);
            net.register(&replica);

            members.insert(*rid, Member { replica, app });
        }

        for m in members.values() {
            m.replica.start_loops();
        }

        info!(logger, "local cluster started: {:?}", cluster.replicas);

        Ok(LocalCluster {
            net,
            members,
            logger: logger.clone(),
        })
    }

    pub fn replica_ids(&self) -> Vec<ReplicaId> {
        self.members.keys().cloned().collect()
    }

    pub fn replica(&self, rid: ReplicaId) -> Option<&Arc<Replica>> {
        self.members.get(&rid).map(|m| &m.replica)
    }

    /// applied returns commands executed by a replica, in execution order.
    pub fn applied(&self, rid: ReplicaId) -> Vec<(InstanceId, Command)> {
        match self.members.get(&rid) {
            Some(m) => m.app.applied(),
            None => vec![],
        }
    }

    /// run proposes `n_cmds` commands concurrently. Command i is led by the i-th replica, round
    /// robin, and is on a key randomly chosen from `keys`.
    pub async fn run(&self, n_cmds: usize, keys: &[String]) -> Result<Vec<Proposal>, OrdoError> {
        if keys.is_empty() {
            return Err(OrdoError::NoKey);
        }

        let rids = self.replica_ids();
        let mut futs = vec![];

        // the rng must not live across an await.
        {
            let mut rng = rand::thread_rng();

            for i in 0..n_cmds {
                let leader = rids[i % rids.len()];
                let key = keys.choose(&mut rng).cloned().unwrap_or_default();
                let cmd = format!("cmd-{}", i);
                let replica = self.members[&leader].replica.clone();

                futs.push(async move {
                    let result = replica.propose(Command::from(cmd.as_str()), &key).await;
                    Proposal {
                        leader,
                        key,
                        cmd,
                        result,
                    }
                });
            }
        }

        let proposals = join_all(futs).await;

        for p in proposals.iter() {
            match &p.result {
                Ok((iid, path)) => debug!(self.logger, "{} committed as {} by {:?}", p.cmd, iid, path),
                Err(e) => warn!(self.logger, "{} on {} failed: {}", p.cmd, p.leader, e),
            }
        }

        Ok(proposals)
    }

    /// wait_executed waits until every replica executed at least `n` commands.
    pub async fn wait_executed(&self, n: usize, timeout: Duration) -> Result<(), OrdoError> {
        let ok = wait_until(timeout, || self.members.values().all(|m| m.app.len() >= n)).await;
        if ok {
            Ok(())
        } else {
            Err(OrdoError::Timeout(n))
        }
    }

    /// orders_by_key groups the commands a replica executed by key.
    /// Only commands on the same key have to be executed in the same order everywhere.
    pub fn orders_by_key(&self, rid: ReplicaId) -> BTreeMap<String, Vec<InstanceId>> {
        let mut orders: BTreeMap<String, Vec<InstanceId>> = BTreeMap::new();

        let m = match self.members.get(&rid) {
            Some(m) => m,
            None => return orders,
        };

        for (iid, _) in m.app.applied() {
            let dkey = m.replica.get_state(iid).dkey;
            orders.entry(dkey).or_default().push(iid);
        }
        orders
    }

    /// check_consistent returns an error naming a key whose commands are executed in different
    /// orders by two replicas.
    pub fn check_consistent(&self) -> Result<(), OrdoError> {
        let mut first: Option<BTreeMap<String, Vec<InstanceId>>> = None;

        for rid in self.replica_ids() {
            let orders = self.orders_by_key(rid);

            if let Some(want) = &first {
                for (key, iids) in orders.iter() {
                    if want.get(key) != Some(iids) {
                        return Err(OrdoError::Diverged(key.clone()));
                    }
                }
                if want.len() != orders.len() {
                    let key = want.keys().find(|k| !orders.contains_key(*k));
                    return Err(OrdoError::Diverged(key.cloned().unwrap_or_default()));
                }
            } else {
                first = Some(orders);
            }
        }
        Ok(())
    }

    /// report renders the execution order of every replica, one line per replica:
    /// `0: cmd-0@x cmd-2@y`
    pub fn report(&self) -> String {
        let mut lines = vec![];

        for (rid, m) in self.members.iter() {
            let mut line = format!("{}:", rid);
            for (iid, cmd) in m.app.applied() {
                let dkey = m.replica.get_state(iid).dkey;
                line.push_str(&format!(" {}@{}", String::from_utf8_lossy(&cmd.payload), dkey));
            }
            lines.push(line);
        }
        lines.join("\n")
    }
}
