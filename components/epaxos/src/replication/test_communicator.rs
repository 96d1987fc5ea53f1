use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::qpaxos::*;
use crate::replication::*;

/// Answers every request with ok, except requests to replica 3, which is unreachable.
struct FakeTransport {
    committed: Mutex<Vec<ReplicaId>>,
}

#[async_trait]
impl Transport for FakeTransport {
    async fn pre_accept(
        &self,
        to: ReplicaId,
        req: PreAcceptRequest,
    ) -> Result<PreAcceptReply, TransportError> {
        if to == 3 {
            return Err(TransportError::Disconnected(0, to));
        }
        let status = if to == 2 {
            PreAcceptStatus::NonIdentical
        } else {
            PreAcceptStatus::Identical
        };
        Ok(PreAcceptReply {
            status: status as i32,
            ballot: req.ballot,
            seq: req.seq,
            deps: req.deps,
        })
    }

    async fn accept(
        &self,
        to: ReplicaId,
        req: AcceptRequest,
    ) -> Result<AcceptReply, TransportError> {
        if to == 3 {
            return Err(TransportError::Disconnected(0, to));
        }
        Ok(MakeReply::accept(true, req.get_ballot()))
    }

    async fn commit(&self, to: ReplicaId, _req: CommitRequest) -> Result<(), TransportError> {
        self.committed.lock().unwrap().push(to);
        Ok(())
    }

    async fn prepare(
        &self,
        to: ReplicaId,
        _req: PrepareRequest,
    ) -> Result<PrepareReply, TransportError> {
        Err(TransportError::NoSuchReplica(to))
    }
}

fn new_communicator(t: Arc<FakeTransport>) -> Communicator {
    let peers = vec![
        ReplicaPeer::new(1, "127.0.0.1:4442"),
        ReplicaPeer::new(2, "127.0.0.1:4443"),
        ReplicaPeer::new(3, "127.0.0.1:4444"),
    ];
    let logger = slog::Logger::root(slog::Discard, o!());
    Communicator::new(0, peers, t, logger)
}

#[tokio::test]
async fn test_communicator_pre_accept() {
    let t = Arc::new(FakeTransport {
        committed: Mutex::new(vec![]),
    });
    let c = new_communicator(t);
    assert_eq!(4, c.n_replicas);

    let inst = inst!((0, 1), "x", "k", 1, {}, SlotState::PreAccepted);
    let mut ev = c.send_pre_accept(MakeRequest::pre_accept(&inst, ballot!(0, 0, 0), false));
    ev.wait(Duration::from_secs(5)).await;

    assert_eq!(3, ev.n_heard());
    assert_eq!(2, ev.replies().len());
    assert!(ev.yes());
    // fast quorum of 4 is 2, only replica 1 is identical.
    assert!(ev.slow_path());
}

#[tokio::test]
async fn test_communicator_accept() {
    let t = Arc::new(FakeTransport {
        committed: Mutex::new(vec![]),
    });
    let c = new_communicator(t);

    let inst = inst!((0, 1), "x", "k", 1, {}, SlotState::Accepted);
    let mut ev = c.send_accept(MakeRequest::accept(&inst, ballot!(0, 0, 0)));
    ev.wait(Duration::from_secs(5)).await;

    assert!(ev.yes());
    assert!(!ev.no());
}

#[tokio::test]
async fn test_communicator_prepare_lost() {
    let t = Arc::new(FakeTransport {
        committed: Mutex::new(vec![]),
    });
    let c = new_communicator(t);

    let mut ev = c.send_prepare(MakeRequest::prepare(instid!(1, 1), ballot!(0, 1, 0)));
    ev.wait(Duration::from_secs(5)).await;

    assert!(ev.replies().is_empty());
    assert!(ev.no());
}

#[tokio::test]
async fn test_communicator_commit() {
    let t = Arc::new(FakeTransport {
        committed: Mutex::new(vec![]),
    });
    let c = new_communicator(t.clone());

    let inst = inst!((0, 1), "x", "k", 1, {}, SlotState::Committed);
    c.send_commit(MakeRequest::commit(&inst));

    for _ in 0..100 {
        if t.committed.lock().unwrap().len() == 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let mut got = t.committed.lock().unwrap().clone();
    got.sort();
    assert_eq!(vec![1, 2, 3], got);
}
