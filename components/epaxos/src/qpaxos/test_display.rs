use crate::qpaxos::*;

#[test]
fn test_display_instance_id() {
    assert_eq!("(1, 2)", format!("{}", instid!(1, 2)));
}

#[test]
fn test_display_ballot() {
    assert_eq!("(1, 2, 3)", format!("{}", ballot!(1, 2, 3)));
}

#[test]
fn test_display_command() {
    assert_eq!("NoOp", format!("{}", Command::noop()));
    assert_eq!("Apply:foo", format!("{}", Command::from("foo")));
}

#[test]
fn test_display_instance() {
    let inst = inst!((1, 2), "x", "k", 3, {0 => 1, 2 => 4}, SlotState::Committed);
    assert_eq!(
        "{id:(1, 2), blt:(0, -1, 0), cmd:Apply:x, dkey:k, seq:3, deps:{0:1, 2:4}, st:Committed}",
        format!("{}", inst)
    );
}
