use crate::qpaxos::*;

#[test]
fn test_instance_empty() {
    let inst = Instance::empty(instid!(2, 5));
    assert_eq!(instid!(2, 5), inst.instance_id);
    assert_eq!(SlotState::NotStarted, inst.state);
    assert_eq!(ballot!(0, -1, 0), inst.highest_seen);
    assert_eq!(ballot!(0, -1, 0), inst.value_ballot);
    assert!(inst.is_noop());
    assert!(!inst.preparing);
}

#[test]
fn test_instance_adopt() {
    let mut inst = Instance::empty(instid!(0, 1));
    let cmd = Command::from("a");
    let d = deps! {1 => 2};

    let changed = inst.adopt(&cmd, "k", 3, &d, ballot!(0, 0, 0), SlotState::PreAccepted);
    assert!(changed);
    assert_eq!(cmd, inst.cmd);
    assert_eq!("k", inst.dkey);
    assert_eq!(3, inst.seq);
    assert_eq!(d, inst.deps);
    assert_eq!(SlotState::PreAccepted, inst.state);

    // a lower ballot does not lower highest_seen
    inst.see_ballot(ballot!(0, 3, 1));
    inst.adopt(&cmd, "k", 4, &d, ballot!(0, 1, 1), SlotState::Accepted);
    assert_eq!(ballot!(0, 3, 1), inst.highest_seen);
    assert_eq!(ballot!(0, 1, 1), inst.value_ballot);
    assert_eq!(4, inst.seq);

    inst.state = SlotState::Committed;
    let changed = inst.adopt(&Command::noop(), "", 9, &deps! {}, ballot!(0, 9, 2), SlotState::Accepted);
    assert!(!changed);
    assert_eq!(cmd, inst.cmd);
    assert_eq!(4, inst.seq);
    assert_eq!(SlotState::Committed, inst.state);
}

#[test]
fn test_instance_see_ballot() {
    let mut inst = Instance::empty(instid!(0, 1));
    let seq = vec![ballot!(0, 1, 0), ballot!(0, 0, 3), ballot!(1, 0, 0), ballot!(0, 7, 7)];
    let mut prev = inst.highest_seen;
    for b in seq {
        inst.see_ballot(b);
        assert!(inst.highest_seen >= prev);
        prev = inst.highest_seen;
    }
    assert_eq!(ballot!(1, 0, 0), inst.highest_seen);
}

#[test]
fn test_instance_same_value() {
    let a = inst!((0, 1), "x", "k", 1, {1 => 0}, SlotState::Committed);
    let mut b = inst!((0, 1), "x", "k", 1, {1 => 0}, SlotState::Executed);
    b.highest_seen = ballot!(0, 3, 2);
    assert!(a.same_value(&b));

    b.deps.insert(2, 0);
    assert!(!a.same_value(&b));
}
