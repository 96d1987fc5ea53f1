use std::collections::BTreeMap;

use crate::qpaxos::{Instance, InstanceId, InstanceIdx, ReplicaId};

/// SlotStore keeps every instance a replica has ever seen. Instances are never removed.
#[derive(Debug, Default)]
pub struct SlotStore {
    slots: BTreeMap<InstanceId, Instance>,
}

impl SlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, iid: &InstanceId) -> Option<&Instance> {
        self.slots.get(iid)
    }

    /// get_or_create returns the instance, a not-started one is created if absent.
    pub fn get_or_create(&mut self, iid: InstanceId) -> &mut Instance {
        self.slots
            .entry(iid)
            .or_insert_with(|| Instance::empty(iid))
    }

    /// snapshot returns a copy of an instance, or an empty one without creating it.
    pub fn snapshot(&self, iid: InstanceId) -> Instance {
        match self.slots.get(&iid) {
            Some(inst) => inst.clone(),
            None => Instance::empty(iid),
        }
    }

    /// last_instances returns the highest known instance index of every replica.
    pub fn last_instances(&self) -> BTreeMap<ReplicaId, InstanceIdx> {
        let mut rst = BTreeMap::new();
        for iid in self.slots.keys() {
            let e = rst.entry(iid.replica_id).or_insert(iid.idx);
            if iid.idx > *e {
                *e = iid.idx;
            }
        }
        rst
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InstanceId, &Instance)> {
        self.slots.iter()
    }
}
