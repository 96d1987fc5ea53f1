use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::qpaxos::{fast_quorum, quorum, Ballot, QuorumReply, ReplicaId};

/// QuorumEvent collects the replies of one round from all peers of a leader.
///
/// The leader itself is not a sender: it always votes for its own proposal, which is why a
/// majority needs `quorum(n) - 1` peer acknowledgements.
/// A peer that can not be reached delivers a `None`, so that a round finishes as soon as every
/// peer is heard from.
pub struct QuorumEvent<R> {
    n_replicas: i32,
    n_peers: i32,

    rx: mpsc::UnboundedReceiver<(ReplicaId, Option<R>)>,

    replies: Vec<(ReplicaId, R)>,
    n_ok: i32,
    n_identical: i32,
    n_lost: i32,
}

impl<R: QuorumReply> QuorumEvent<R> {
    pub fn new(
        n_replicas: i32,
        n_peers: i32,
        rx: mpsc::UnboundedReceiver<(ReplicaId, Option<R>)>,
    ) -> QuorumEvent<R> {
        QuorumEvent {
            n_replicas,
            n_peers,
            rx,
            replies: vec![],
            n_ok: 0,
            n_identical: 0,
            n_lost: 0,
        }
    }

    /// add counts one reply, or a lost one if `reply` is None.
    pub fn add(&mut self, from: ReplicaId, reply: Option<R>) {
        match reply {
            Some(r) => {
                if r.ok() {
                    self.n_ok += 1;
                }
                if r.ok() && r.identical() {
                    self.n_identical += 1;
                }
                self.replies.push((from, r));
            }
            None => self.n_lost += 1,
        }
    }

    /// wait receives replies until the round outcome is known or `timeout` expires.
    /// A timeout is not an error: the caller inspects the outcome afterwards.
    pub async fn wait(&mut self, timeout: Duration) {
        self.recv_until(timeout, |ev| ev.ready()).await
    }

    /// wait_all receives replies until every peer is heard from or `timeout` expires.
    pub async fn wait_all(&mut self, timeout: Duration) {
        self.recv_until(timeout, |ev| ev.n_heard() >= ev.n_peers).await
    }

    async fn recv_until<F: Fn(&Self) -> bool>(&mut self, timeout: Duration, done: F) {
        // None: the timeout is too large to be a deadline, wait without one.
        let deadline = Instant::now().checked_add(timeout);

        while !done(&*self) {
            let got = match deadline {
                Some(d) => match tokio::time::timeout_at(d, self.rx.recv()).await {
                    Ok(got) => got,
                    // timeout
                    Err(_) => break,
                },
                None => self.rx.recv().await,
            };

            match got {
                Some((from, reply)) => self.add(from, reply),
                // all senders are gone.
                None => break,
            }
        }
    }

    /// ready returns true when more replies can not change the outcome of this round.
    ///
    /// A round that can not reach a majority still waits for the other peers, so that the
    /// ballots they carry are learnt.
    pub fn ready(&self) -> bool {
        if self.fast_path() || self.n_heard() >= self.n_peers {
            return true;
        }

        self.yes() && !self.fast_path_possible()
    }

    /// fast_path returns true if enough peers agreed without changing any attribute.
    pub fn fast_path(&self) -> bool {
        self.n_identical >= fast_quorum(self.n_replicas)
    }

    pub fn fast_path_possible(&self) -> bool {
        self.n_identical + self.n_pending() >= fast_quorum(self.n_replicas)
    }

    /// slow_path returns true if a majority acknowledged but the fast path is not reached.
    pub fn slow_path(&self) -> bool {
        self.yes() && !self.fast_path()
    }

    /// yes returns true if a majority, counting the leader, acknowledged.
    pub fn yes(&self) -> bool {
        self.n_ok + 1 >= quorum(self.n_replicas)
    }

    /// no returns true if a majority can never be reached.
    pub fn no(&self) -> bool {
        self.n_ok + self.n_pending() + 1 < quorum(self.n_replicas)
    }

    pub fn n_ok(&self) -> i32 {
        self.n_ok
    }

    pub fn n_heard(&self) -> i32 {
        self.replies.len() as i32 + self.n_lost
    }

    fn n_pending(&self) -> i32 {
        std::cmp::max(self.n_peers - self.n_heard(), 0)
    }

    /// max_ballot returns the highest ballot carried by any reply.
    pub fn max_ballot(&self) -> Option<Ballot> {
        self.replies.iter().map(|(_, r)| r.last_ballot()).max()
    }

    pub fn replies(&self) -> &[(ReplicaId, R)] {
        &self.replies
    }

    pub fn into_replies(self) -> Vec<(ReplicaId, R)> {
        self.replies
    }
}
