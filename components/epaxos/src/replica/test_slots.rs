use maplit::btreemap;

use crate::qpaxos::*;
use crate::replica::SlotStore;

#[test]
fn test_slots_get_or_create() {
    let mut s = SlotStore::new();
    assert!(s.is_empty());
    assert!(s.get(&instid!(1, 2)).is_none());

    {
        let inst = s.get_or_create(instid!(1, 2));
        assert_eq!(SlotState::NotStarted, inst.state);
        assert_eq!(Ballot::initial(), inst.highest_seen);
        inst.seq = 5;
    }

    // not overwritten
    assert_eq!(5, s.get_or_create(instid!(1, 2)).seq);
    assert_eq!(1, s.len());
}

#[test]
fn test_slots_snapshot_does_not_create() {
    let s = SlotStore::new();
    let inst = s.snapshot(instid!(3, 4));
    assert_eq!(instid!(3, 4), inst.instance_id);
    assert_eq!(SlotState::NotStarted, inst.state);
    assert!(s.is_empty());
}

#[test]
fn test_slots_last_instances() {
    let mut s = SlotStore::new();
    for iid in instids![(0, 3), (0, 1), (2, 0), (2, 7), (1, 4)] {
        s.get_or_create(iid);
    }

    assert_eq!(btreemap! {0 => 3, 1 => 4, 2 => 7}, s.last_instances());
}
