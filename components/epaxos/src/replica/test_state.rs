use maplit::btreemap;

use crate::qpaxos::*;
use crate::replica::ReplicaState;

#[test]
fn test_state_receive() {
    let mut st = ReplicaState::new();
    st.receive(instid!(1, 3));
    st.receive(instid!(1, 1));
    st.receive(instid!(2, 0));

    assert_eq!(btreemap! {1 => 3, 2 => 0}, st.received_till);
}

#[test]
fn test_state_update_internal() {
    let mut st = ReplicaState::new();

    st.update_internal(&Command::from("a"), "x", instid!(0, 4), 7, &deps! {1 => 2});
    assert_eq!(7, st.keys.seq_of("x"));
    assert_eq!(deps! {0 => 4, 1 => 2}, st.keys.deps_of("x"));
    assert_eq!(btreemap! {0 => 4, 1 => 2}, st.received_till);

    // NoOp only advances received_till
    st.update_internal(&Command::noop(), "", instid!(2, 9), 100, &deps! {3 => 3});
    assert_eq!(Deps::new(), st.keys.deps_of(""));
    assert_eq!(btreemap! {0 => 4, 1 => 2, 2 => 9}, st.received_till);
}

#[test]
fn test_state_update_attributes() {
    let mut st = ReplicaState::new();
    {
        let inst = st.slots.get_or_create(instid!(0, 1));
        inst.adopt(
            &Command::from("a"),
            "x",
            2,
            &deps! {1 => 0},
            ballot!(0, 0, 0),
            SlotState::PreAccepted,
        );
    }

    let d1 = deps! {1 => 3};
    let d2 = deps! {1 => 1, 2 => 5};
    st.update_attributes(instid!(0, 1), vec![(4, &d1), (3, &d2)].into_iter());

    let inst = st.slots.snapshot(instid!(0, 1));
    assert_eq!(4, inst.seq);
    assert_eq!(deps! {1 => 3, 2 => 5}, inst.deps);
    assert_eq!(4, st.keys.seq_of("x"));
    assert_eq!(Some(5), st.keys.dep_of("x", 2));
    assert_eq!(Some(&5), st.received_till.get(&2));
}

#[test]
fn test_state_update_attributes_skip_decided() {
    let mut st = ReplicaState::new();
    {
        let inst = st.slots.get_or_create(instid!(0, 1));
        inst.adopt(
            &Command::from("a"),
            "x",
            2,
            &deps! {},
            ballot!(0, 0, 0),
            SlotState::Committed,
        );
    }

    let d = deps! {1 => 3};
    st.update_attributes(instid!(0, 1), vec![(9, &d)].into_iter());

    let inst = st.slots.snapshot(instid!(0, 1));
    assert_eq!(2, inst.seq);
    assert_eq!(Deps::new(), inst.deps);
}

#[test]
fn test_state_update_highest_seen() {
    let mut st = ReplicaState::new();
    let replies = vec![
        (1, MakeReply::accept(false, ballot!(0, 3, 1))),
        (2, MakeReply::accept(false, ballot!(0, 5, 2))),
        (3, MakeReply::accept(true, ballot!(0, 1, 0))),
    ];
    st.update_highest_seen(instid!(0, 1), &replies);
    assert_eq!(ballot!(0, 5, 2), st.slots.snapshot(instid!(0, 1)).highest_seen);

    // never decreases
    st.update_highest_seen(instid!(0, 1), &replies[2..]);
    assert_eq!(ballot!(0, 5, 2), st.slots.snapshot(instid!(0, 1)).highest_seen);
}
