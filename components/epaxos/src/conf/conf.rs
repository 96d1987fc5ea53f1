use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::ConfError;
use crate::qpaxos::{fast_quorum, quorum, ReplicaId};
use crate::replication::ReplicaPeer;

/// ReplicaConf holds the timing knobs of a replica. Every field has a default so that a
/// cluster yaml only needs to list what it changes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ReplicaConf {
    /// how long a leader waits for the replies of one round.
    pub quorum_timeout_ms: u64,

    /// an instance is not recovered until it has not been touched for this long.
    pub recovery_grace_ms: u64,

    /// how often a waiting recovery checks if the instance got committed by someone else.
    pub recovery_poll_ms: u64,

    pub recovery_backoff_ms: u64,
    pub recovery_jitter_ms: u64,

    /// how often the execution loop looks for newly received instances.
    pub exec_poll_ms: u64,

    /// how long an execution pass sleeps when one of its keys is being executed by another pass.
    pub exec_wait_ms: u64,

    /// run the background execution loop or not.
    pub exec: bool,
}

impl Default for ReplicaConf {
    fn default() -> Self {
        ReplicaConf {
            quorum_timeout_ms: 1000,
            recovery_grace_ms: 10,
            recovery_poll_ms: 100,
            recovery_backoff_ms: 100,
            recovery_jitter_ms: 50,
            exec_poll_ms: 1,
            exec_wait_ms: 10,
            exec: true,
        }
    }
}

impl ReplicaConf {
    pub fn quorum_timeout(&self) -> Duration {
        Duration::from_millis(self.quorum_timeout_ms)
    }

    pub fn recovery_grace(&self) -> Duration {
        Duration::from_millis(self.recovery_grace_ms)
    }

    pub fn recovery_poll(&self) -> Duration {
        Duration::from_millis(self.recovery_poll_ms)
    }

    pub fn exec_poll(&self) -> Duration {
        Duration::from_millis(self.exec_poll_ms)
    }

    pub fn exec_wait(&self) -> Duration {
        Duration::from_millis(self.exec_wait_ms)
    }

    /// recovery_backoff returns the backoff plus a random jitter.
    pub fn recovery_backoff(&self) -> Duration {
        let jitter = if self.recovery_jitter_ms > 0 {
            rand::random::<u64>() % self.recovery_jitter_ms
        } else {
            0
        };
        Duration::from_millis(self.recovery_backoff_ms + jitter)
    }
}

/// ClusterInfo describes all replicas of a cluster.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ClusterInfo {
    /// replica id to the address it serves on.
    pub replicas: BTreeMap<ReplicaId, String>,

    #[serde(default)]
    pub epoch: i64,

    #[serde(default)]
    pub conf: ReplicaConf,
}

impl FromStr for ClusterInfo {
    type Err = ConfError;

    fn from_str(yaml: &str) -> Result<ClusterInfo, ConfError> {
        let cluster: ClusterInfo = serde_yaml::from_str(yaml)?;
        cluster.check()?;
        Ok(cluster)
    }
}

impl ClusterInfo {
    /// from_file read cluster conf yaml from a local file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ClusterInfo, ConfError> {
        let content = fs::read_to_string(path)?;
        ClusterInfo::from_str(content.as_str())
    }

    /// check rejects a cluster that can not run.
    pub fn check(&self) -> Result<(), ConfError> {
        if self.replicas.is_empty() {
            return Err(ConfError::NoReplica);
        }
        if self.conf.quorum_timeout_ms == 0 {
            return Err(ConfError::BadQuorumTimeout);
        }
        Ok(())
    }

    pub fn n_replicas(&self) -> i32 {
        self.replicas.len() as i32
    }

    pub fn quorum(&self) -> i32 {
        quorum(self.n_replicas())
    }

    pub fn fast_quorum(&self) -> i32 {
        fast_quorum(self.n_replicas())
    }

    /// peers_of returns all replicas except `rid`.
    pub fn peers_of(&self, rid: ReplicaId) -> Result<Vec<ReplicaPeer>, ConfError> {
        if !self.replicas.contains_key(&rid) {
            return Err(ConfError::UnknownReplica(rid));
        }

        let peers = self
            .replicas
            .iter()
            .filter(|(id, _)| **id != rid)
            .map(|(id, addr)| ReplicaPeer::new(*id, addr))
            .collect();
        Ok(peers)
    }
}
