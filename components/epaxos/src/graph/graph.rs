use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::HashSet;

use crate::qpaxos::InstanceId;

/// DepGraph is the dependency graph of committed but not executed instances.
/// It is built for one execution pass and thrown away after it.
///
/// An edge `a -> b` means `a` depends on `b`, thus `b` must be executed first.
#[derive(Debug, Default, Clone)]
pub struct DepGraph {
    /// vertex to its seq.
    vertices: BTreeMap<InstanceId, i64>,
    edges: BTreeMap<InstanceId, BTreeSet<InstanceId>>,
}

impl DepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains(&self, iid: &InstanceId) -> bool {
        self.vertices.contains_key(iid)
    }

    /// add_vertex returns false if the vertex already exists.
    pub fn add_vertex(&mut self, iid: InstanceId, seq: i64) -> bool {
        if self.vertices.contains_key(&iid) {
            return false;
        }
        self.vertices.insert(iid, seq);
        true
    }

    /// add_edge records that `from` depends on `to`. A self loop is ignored.
    pub fn add_edge(&mut self, from: InstanceId, to: InstanceId) {
        if from == to {
            return;
        }
        self.edges.entry(from).or_default().insert(to);
    }

    fn successors(&self, v: &InstanceId) -> Vec<InstanceId> {
        match self.edges.get(v) {
            // an edge to an instance that is not in graph, e.g. an executed one, is ignored.
            Some(to) => to.iter().filter(|x| self.contains(x)).cloned().collect(),
            None => vec![],
        }
    }

    /// sccs returns strongly connected components, a component always comes after all
    /// components it depends on.
    pub fn sccs(&self) -> Vec<Vec<InstanceId>> {
        let mut tj = Tarjan::default();

        for v in self.vertices.keys() {
            if !tj.index.contains_key(v) {
                tj.run(self, *v);
            }
        }

        tj.components
    }

    /// sorted returns all vertices in execution order.
    /// Instances in one component are ordered by (seq, replica_id, idx), which is the same on
    /// every replica.
    pub fn sorted(&self) -> Vec<InstanceId> {
        let mut rst = Vec::with_capacity(self.len());

        for mut comp in self.sccs() {
            comp.sort_by_key(|iid| {
                let seq = self.vertices.get(iid).cloned().unwrap_or_default();
                (seq, *iid)
            });
            rst.extend(comp);
        }

        rst
    }
}

#[derive(Default)]
struct Tarjan {
    counter: usize,
    index: HashMap<InstanceId, usize>,
    lowlink: HashMap<InstanceId, usize>,
    stack: Vec<InstanceId>,
    on_stack: HashSet<InstanceId>,
    components: Vec<Vec<InstanceId>>,
}

impl Tarjan {
    fn visit(
        &mut self,
        g: &DepGraph,
        v: InstanceId,
        calls: &mut Vec<(InstanceId, Vec<InstanceId>, usize)>,
    ) {
        self.index.insert(v, self.counter);
        self.lowlink.insert(v, self.counter);
        self.counter += 1;

        self.stack.push(v);
        self.on_stack.insert(v);

        calls.push((v, g.successors(&v), 0));
    }

    fn low(&self, v: &InstanceId) -> usize {
        self.lowlink.get(v).cloned().unwrap_or_default()
    }

    /// run is an iterative tarjan, a deep dependency chain does not overflow the stack.
    fn run(&mut self, g: &DepGraph, root: InstanceId) {
        let mut calls = vec![];
        self.visit(g, root, &mut calls);

        while let Some((v, succs, pos)) = calls.last_mut() {
            let v = *v;

            if *pos < succs.len() {
                let w = succs[*pos];
                *pos += 1;

                if !self.index.contains_key(&w) {
                    self.visit(g, w, &mut calls);
                } else if self.on_stack.contains(&w) {
                    let l = std::cmp::min(self.low(&v), self.index[&w]);
                    self.lowlink.insert(v, l);
                }
                continue;
            }

            calls.pop();

            if let Some((parent, _, _)) = calls.last() {
                let l = std::cmp::min(self.low(parent), self.low(&v));
                self.lowlink.insert(*parent, l);
            }

            if self.low(&v) == self.index[&v] {
                let mut comp = vec![];
                while let Some(w) = self.stack.pop() {
                    self.on_stack.remove(&w);
                    comp.push(w);
                    if w == v {
                        break;
                    }
                }
                self.components.push(comp);
            }
        }
    }
}
