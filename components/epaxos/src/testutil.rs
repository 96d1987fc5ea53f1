//! Helpers to run replicas in one process, for tests and demos.

use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use crate::conf::ClusterInfo;
use crate::conf::ReplicaConf;
use crate::qpaxos::*;
use crate::replica::Replica;
use crate::replica::ReplicaError;
use crate::replica::StateMachine;
use crate::transport::MemNetwork;

lazy_static! {
    /// TEST_CONF recovers slower and polls faster than the default, so that a busy test
    /// machine does not trigger recovery of an instance whose leader is still working.
    pub static ref TEST_CONF: ReplicaConf = ReplicaConf {
        quorum_timeout_ms: 500,
        recovery_grace_ms: 200,
        recovery_poll_ms: 20,
        recovery_backoff_ms: 50,
        recovery_jitter_ms: 30,
        exec_poll_ms: 1,
        exec_wait_ms: 5,
        exec: true,
    };
}

/// Recorder is a StateMachine that remembers every applied command in order.
#[derive(Debug, Default)]
pub struct Recorder {
    applied: Mutex<Vec<(InstanceId, Command)>>,
}

impl StateMachine for Recorder {
    fn apply(&self, iid: InstanceId, cmd: &Command) {
        let mut applied = self.applied.lock().unwrap_or_else(|e| e.into_inner());
        applied.push((iid, cmd.clone()));
    }
}

impl Recorder {
    pub fn new() -> Arc<Recorder> {
        Arc::new(Recorder::default())
    }

    pub fn applied(&self) -> Vec<(InstanceId, Command)> {
        self.applied
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn applied_ids(&self) -> Vec<InstanceId> {
        self.applied().into_iter().map(|(iid, _)| iid).collect()
    }

    pub fn len(&self) -> usize {
        self.applied.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// new_cluster_info builds a cluster of replica 0 to n-1.
pub fn new_cluster_info(n: i64, conf: &ReplicaConf) -> ClusterInfo {
    let mut replicas = BTreeMap::new();
    for rid in 0..n {
        replicas.insert(rid, format!("127.0.0.1:{}", 4441 + rid));
    }

    ClusterInfo {
        replicas,
        epoch: 0,
        conf: conf.clone(),
    }
}

pub fn discard_logger() -> slog::Logger {
    slog::Logger::root(slog::Discard, o!())
}

/// TestCluster runs all replicas of a cluster on a MemNetwork.
pub struct TestCluster {
    pub net: Arc<MemNetwork>,
    pub replicas: Vec<Arc<Replica>>,
    pub recorders: Vec<Arc<Recorder>>,
}

impl TestCluster {
    /// new starts a cluster of `n` replicas. It must be called in a tokio runtime if
    /// `conf.exec` is set.
    pub fn new(
        n: i64,
        conf: &ReplicaConf,
        logger: &slog::Logger,
    ) -> Result<TestCluster, ReplicaError> {
        let cluster = new_cluster_info(n, conf);
        let net = MemNetwork::new();

        let mut replicas = vec![];
        let mut recorders = vec![];

        for rid in 0..n {
            let rec = Recorder::new();
            let r = Replica::new(rid, &cluster, net.transport_of(rid), rec.clone(), logger)?;
            let r = Arc::new(r);
            net.register(&r);
            replicas.push(r);
            recorders.push(rec);
        }

        for r in replicas.iter() {
            r.start_loops();
        }

        Ok(TestCluster {
            net,
            replicas,
            recorders,
        })
    }

    /// replica panics if `rid` is not in this cluster.
    pub fn replica(&self, rid: ReplicaId) -> &Arc<Replica> {
        usize::try_from(rid)
            .ok()
            .and_then(|i| self.replicas.get(i))
            .unwrap_or_else(|| panic!("replica {} is not in this test cluster", rid))
    }

    pub fn recorder(&self, rid: ReplicaId) -> &Arc<Recorder> {
        usize::try_from(rid)
            .ok()
            .and_then(|i| self.recorders.get(i))
            .unwrap_or_else(|| panic!("recorder {} is not in this test cluster", rid))
    }

    /// states returns the state of an instance on every replica.
    pub fn states(&self, iid: InstanceId) -> Vec<SlotState> {
        self.replicas.iter().map(|r| r.get_state(iid).state).collect()
    }

    pub fn all_in_state(&self, iid: InstanceId, state: SlotState) -> bool {
        self.states(iid).iter().all(|s| *s == state)
    }
}

/// wait_until polls `f` until it returns true or `timeout` expires.
pub async fn wait_until<F: Fn() -> bool>(timeout: Duration, f: F) -> bool {
    let start = Instant::now();
    loop {
        if f() {
            return true;
        }
        if start.elapsed() > timeout {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// with_timeout runs `fut` but gives up after `timeout`.
pub async fn with_timeout<T, F: Future<Output = T>>(timeout: Duration, fut: F) -> Option<T> {
    tokio::time::timeout(timeout, fut).await.ok()
}
