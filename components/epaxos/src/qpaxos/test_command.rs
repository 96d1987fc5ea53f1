use std::convert::TryFrom;

use crate::qpaxos::*;

#[test]
fn test_command_noop() {
    let c = Command::noop();
    assert!(c.is_noop());
    assert_eq!(OpCode::NoOp, c.kind());
    assert!(c.payload.is_empty());
}

#[test]
fn test_command_from() {
    let c = Command::from("set x=1");
    assert!(!c.is_noop());
    assert_eq!(OpCode::Apply, c.kind());
    assert_eq!(b"set x=1".to_vec(), c.payload);

    let raw: &[u8] = &[1, 2, 3];
    assert_eq!(Command::apply(raw), Command::from(raw));
}

#[test]
fn test_command_unknown_op() {
    let c = Command {
        op: 100,
        payload: vec![1],
    };
    assert!(OpCode::try_from(100).is_err());
    assert!(c.is_noop());
}

#[test]
fn test_slot_state_order() {
    assert!(SlotState::NotStarted < SlotState::PreAccepted);
    assert!(SlotState::PreAccepted < SlotState::Accepted);
    assert!(SlotState::Accepted < SlotState::Committed);
    assert!(SlotState::Committed < SlotState::Executed);

    assert!(!SlotState::Accepted.is_decided());
    assert!(SlotState::Committed.is_decided());
    assert!(SlotState::Executed.is_decided());
}

#[test]
fn test_instance_id_prev() {
    assert_eq!(Some(instid!(1, 2)), instid!(1, 3).prev());
    assert_eq!(None, instid!(1, 0).prev());
    assert!(instid!(0, 9) < instid!(1, 0));
}
