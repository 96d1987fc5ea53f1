use std::time::Duration;

use tokio::sync::mpsc;

use crate::qpaxos::*;
use crate::replication::QuorumEvent;

fn identical() -> Option<PreAcceptReply> {
    Some(PreAcceptReply {
        status: PreAcceptStatus::Identical as i32,
        ballot: Some(ballot!(0, 0, 0)),
        ..Default::default()
    })
}

fn non_identical() -> Option<PreAcceptReply> {
    Some(PreAcceptReply {
        status: PreAcceptStatus::NonIdentical as i32,
        ballot: Some(ballot!(0, 0, 0)),
        seq: 3,
        ..Default::default()
    })
}

fn failed(b: Ballot) -> Option<PreAcceptReply> {
    Some(MakeReply::pre_accept_failed(b))
}

#[test]
fn test_quorum_event_fast_path() {
    let (_tx, rx) = mpsc::unbounded_channel();
    let mut ev: QuorumEvent<PreAcceptReply> = QuorumEvent::new(5, 4, rx);

    ev.add(1, identical());
    ev.add(2, identical());
    assert!(!ev.fast_path());
    assert!(ev.yes());
    assert!(!ev.ready(), "fast path is still possible");

    ev.add(3, identical());
    assert!(ev.fast_path());
    assert!(!ev.slow_path());
    assert!(ev.ready());
}

#[test]
fn test_quorum_event_slow_path() {
    let (_tx, rx) = mpsc::unbounded_channel();
    let mut ev: QuorumEvent<PreAcceptReply> = QuorumEvent::new(5, 4, rx);

    ev.add(1, identical());
    ev.add(2, non_identical());
    ev.add(3, None);
    assert!(ev.yes());
    assert!(ev.slow_path());
    // 1 identical + 1 pending can not reach 3.
    assert!(!ev.fast_path_possible());
    assert!(ev.ready());
}

#[test]
fn test_quorum_event_no() {
    let (_tx, rx) = mpsc::unbounded_channel();
    let mut ev: QuorumEvent<PreAcceptReply> = QuorumEvent::new(5, 4, rx);

    ev.add(1, failed(ballot!(0, 2, 1)));
    ev.add(2, None);
    assert!(!ev.no());

    ev.add(3, failed(ballot!(0, 5, 3)));
    assert!(ev.no());
    assert!(!ev.yes());
    assert!(!ev.ready(), "peer 4 may still carry a higher ballot");

    ev.add(4, failed(ballot!(0, 7, 4)));
    assert!(ev.ready());
    assert_eq!(Some(ballot!(0, 7, 4)), ev.max_ballot());
}

#[tokio::test]
async fn test_quorum_event_wait_after_no() {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut ev: QuorumEvent<PreAcceptReply> = QuorumEvent::new(5, 4, rx);

    tx.send((2, None)).unwrap();
    tx.send((3, None)).unwrap();
    tx.send((4, None)).unwrap();
    tx.send((1, identical())).unwrap();

    ev.wait(Duration::from_secs(5)).await;

    assert!(ev.no());
    assert_eq!(4, ev.n_heard());
    assert_eq!(1, ev.n_ok());
}

#[tokio::test]
async fn test_quorum_event_wait_all() {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut ev: QuorumEvent<PreAcceptReply> = QuorumEvent::new(5, 4, rx);

    for rid in 1..5 {
        tx.send((rid, identical())).unwrap();
    }

    ev.wait_all(Duration::from_secs(5)).await;

    assert!(ev.fast_path());
    assert_eq!(4, ev.replies().len());
}

#[tokio::test]
async fn test_quorum_event_wait_huge_timeout() {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut ev: QuorumEvent<AcceptReply> = QuorumEvent::new(3, 2, rx);

    tx.send((1, Some(MakeReply::accept(true, ballot!(0, 1, 0)))))
        .unwrap();
    tx.send((2, Some(MakeReply::accept(true, ballot!(0, 1, 0)))))
        .unwrap();

    ev.wait(Duration::MAX).await;
    assert!(ev.fast_path());

    // all senders are gone before every peer is heard.
    let (tx, rx) = mpsc::unbounded_channel();
    let mut ev: QuorumEvent<AcceptReply> = QuorumEvent::new(5, 4, rx);
    tx.send((1, None)).unwrap();
    drop(tx);

    ev.wait_all(Duration::MAX).await;
    assert_eq!(1, ev.n_heard());
}

#[test]
fn test_quorum_event_single_replica() {
    let (_tx, rx) = mpsc::unbounded_channel::<(ReplicaId, Option<PreAcceptReply>)>();
    let ev: QuorumEvent<PreAcceptReply> = QuorumEvent::new(1, 0, rx);

    assert!(ev.ready());
    assert!(ev.fast_path());
    assert!(ev.yes());
}

#[tokio::test]
async fn test_quorum_event_wait() {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut ev: QuorumEvent<AcceptReply> = QuorumEvent::new(3, 2, rx);

    tx.send((1, Some(MakeReply::accept(true, ballot!(0, 1, 0)))))
        .unwrap();
    tx.send((2, None)).unwrap();

    ev.wait(Duration::from_secs(5)).await;

    assert!(ev.yes());
    assert_eq!(1, ev.replies().len());
    assert_eq!(1, ev.replies()[0].0);
}

#[tokio::test]
async fn test_quorum_event_wait_timeout() {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut ev: QuorumEvent<AcceptReply> = QuorumEvent::new(5, 4, rx);

    tx.send((1, Some(MakeReply::accept(true, ballot!(0, 1, 0)))))
        .unwrap();

    ev.wait(Duration::from_millis(50)).await;

    assert!(!ev.yes());
    assert!(!ev.no());
    assert_eq!(1, ev.n_heard());
    drop(tx);
}
