use std::collections::HashMap;

use crate::qpaxos::{Deps, InstanceId, InstanceIdx, ReplicaId};

#[derive(Debug, Default, Clone)]
struct KeyState {
    seq: i64,
    deps: Deps,
}

/// KeyTracker records, for every dependency key, the highest seq ever assigned and the highest
/// instance of every replica that touched the key.
/// NoOp never touches it.
#[derive(Debug, Default)]
pub struct KeyTracker {
    keys: HashMap<String, KeyState>,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seq_of(&self, dkey: &str) -> i64 {
        self.keys.get(dkey).map(|k| k.seq).unwrap_or_default()
    }

    pub fn deps_of(&self, dkey: &str) -> Deps {
        self.keys
            .get(dkey)
            .map(|k| k.deps.clone())
            .unwrap_or_default()
    }

    pub fn dep_of(&self, dkey: &str, rid: ReplicaId) -> Option<InstanceIdx> {
        self.keys.get(dkey)?.deps.get(&rid).cloned()
    }

    /// set_dep overwrites the dependency of `dkey` on replica `rid`.
    pub fn set_dep(&mut self, dkey: &str, rid: ReplicaId, idx: InstanceIdx) {
        self.entry(dkey).deps.insert(rid, idx);
    }

    /// see_instance raises the dependency on the replica of `iid`.
    pub fn see_instance(&mut self, dkey: &str, iid: InstanceId) {
        let d = self.entry(dkey).deps.entry(iid.replica_id).or_insert(iid.idx);
        if iid.idx > *d {
            *d = iid.idx;
        }
    }

    /// merge raises seq and every dependency of `dkey`, nothing decreases.
    pub fn merge(&mut self, dkey: &str, seq: i64, deps: &Deps) {
        let k = self.entry(dkey);
        k.seq = std::cmp::max(k.seq, seq);
        for (rid, idx) in deps.iter() {
            let d = k.deps.entry(*rid).or_insert(*idx);
            if *idx > *d {
                *d = *idx;
            }
        }
    }

    fn entry(&mut self, dkey: &str) -> &mut KeyState {
        self.keys.entry(dkey.to_string()).or_default()
    }
}
