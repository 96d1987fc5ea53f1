use std::sync::Weak;

use crate::graph::DepGraph;
use crate::qpaxos::*;
use crate::replica::Replica;

/// DkeyGuard marks a dependency key as being executed. It is released on drop.
/// It must not be dropped with the replica state locked.
struct DkeyGuard<'a> {
    replica: &'a Replica,
    dkey: String,
}

impl<'a> Drop for DkeyGuard<'a> {
    fn drop(&mut self) {
        self.replica.lock().in_process_dkeys.remove(&self.dkey);
    }
}

impl Replica {
    /// exec_loop starts an execution pass for every instance once it is heard of.
    pub async fn exec_loop(weak: Weak<Replica>) {
        loop {
            let r = match weak.upgrade() {
                Some(r) => r,
                None => return,
            };
            let poll = r.conf.exec_poll();

            let todo = {
                let mut st = r.lock();
                if st.pause_execution {
                    vec![]
                } else {
                    let mut todo = vec![];
                    for (rid, till) in st.received_till.iter() {
                        let from = st.exec_started_till.get(rid).map(|x| x + 1).unwrap_or(0);
                        for idx in from..=*till {
                            todo.push(InstanceId::new(*rid, idx));
                        }
                    }
                    st.exec_started_till = st.received_till.clone();
                    todo
                }
            };

            for iid in todo {
                let r = r.clone();
                tokio::spawn(async move {
                    r.start_execution(iid).await;
                });
            }

            drop(r);
            tokio::time::sleep(poll).await;
        }
    }

    /// start_execution executes instance `iid` and every instance it depends on, directly or
    /// not, that is not yet executed.
    ///
    /// Instances not yet committed are recovered first. Executing an executed instance is a
    /// no-op.
    pub async fn start_execution(&self, iid: InstanceId) {
        self.prepare_till_committed(iid).await;

        let root = self.lock().slots.snapshot(iid);
        if root.state == SlotState::Executed || root.is_noop() {
            return;
        }

        let _guard = self.acquire_dkey(&root.dkey).await;

        let g = self.build_graph(iid).await;
        let sorted = g.sorted();

        let mut st = self.lock();
        for x in sorted.iter() {
            let inst = st.slots.get_or_create(*x);
            if inst.state == SlotState::Executed {
                continue;
            }
            inst.state = SlotState::Executed;
            self.app.apply(*x, &inst.cmd);
            debug!(self.logger, "executed {} cmd:{} by pass of {}", x, inst.cmd, iid);
        }
        drop(st);
    }

    /// acquire_dkey waits until no other execution pass works on `dkey`.
    async fn acquire_dkey(&self, dkey: &str) -> DkeyGuard<'_> {
        loop {
            {
                let mut st = self.lock();
                if !st.in_process_dkeys.contains(dkey) {
                    st.in_process_dkeys.insert(dkey.to_string());
                    return DkeyGuard {
                        replica: self,
                        dkey: dkey.to_string(),
                    };
                }
            }
            tokio::time::sleep(self.conf.exec_wait()).await;
        }
    }

    /// build_graph collects all committed but not executed instances `root` depends on.
    async fn build_graph(&self, root: InstanceId) -> DepGraph {
        let mut g = DepGraph::new();
        let mut stack = vec![root];

        while let Some(iid) = stack.pop() {
            if g.contains(&iid) {
                continue;
            }

            self.prepare_till_committed(iid).await;
            let inst = self.lock().slots.snapshot(iid);

            if inst.state == SlotState::Executed || inst.is_noop() {
                continue;
            }

            g.add_vertex(iid, inst.seq);

            for (rid, idx) in inst.deps.iter() {
                let dep = InstanceId::new(*rid, *idx);
                if dep == iid {
                    continue;
                }

                if let Some(d) = self.resolve_dep(dep, &inst.dkey).await {
                    g.add_edge(iid, d);
                    if !g.contains(&d) {
                        stack.push(d);
                    }
                }
            }
        }

        g
    }

    /// resolve_dep finds the instance a dependency really refers to.
    /// It returns None if there is nothing to wait for.
    ///
    /// A NoOp dependency is a gap left by a recovery. It is replaced with the closest lower
    /// instance of the same replica on the same dkey:
    ///
    /// ```text
    /// R1
    /// |
    /// 5 NoOp  <- dep
    /// 4 y=1      skipped, other dkey
    /// 3 x=1      <- resolved
    /// |
    /// ```
    async fn resolve_dep(&self, dep: InstanceId, dkey: &str) -> Option<InstanceId> {
        self.prepare_till_committed(dep).await;
        let inst = self.lock().slots.snapshot(dep);

        if inst.state == SlotState::Executed {
            return None;
        }
        if !inst.is_noop() {
            return Some(dep);
        }

        let mut prev = dep.prev();
        while let Some(p) = prev {
            let inst = self.lock().slots.snapshot(p);

            if inst.state == SlotState::NotStarted || inst.dkey == dkey {
                self.prepare_till_committed(p).await;

                let inst = self.lock().slots.snapshot(p);
                if inst.dkey == dkey && !inst.is_noop() {
                    if inst.state == SlotState::Executed {
                        return None;
                    }
                    return Some(p);
                }
            }

            // a recovered NoOp or another dkey.
            prev = p.prev();
        }

        None
    }
}
