use crate::qpaxos::*;
use crate::replica::KeyTracker;

#[test]
fn test_keys_empty() {
    let k = KeyTracker::new();
    assert_eq!(0, k.seq_of("x"));
    assert_eq!(Deps::new(), k.deps_of("x"));
    assert_eq!(None, k.dep_of("x", 1));
}

#[test]
fn test_keys_merge_never_decreases() {
    let mut k = KeyTracker::new();

    k.merge("x", 3, &deps! {0 => 2, 1 => 5});
    k.merge("x", 2, &deps! {0 => 4, 1 => 1, 2 => 0});

    assert_eq!(3, k.seq_of("x"));
    assert_eq!(deps! {0 => 4, 1 => 5, 2 => 0}, k.deps_of("x"));

    // other keys are not affected
    assert_eq!(0, k.seq_of("y"));
    assert_eq!(Deps::new(), k.deps_of("y"));
}

#[test]
fn test_keys_see_instance() {
    let mut k = KeyTracker::new();

    k.see_instance("x", instid!(1, 3));
    k.see_instance("x", instid!(1, 2));
    assert_eq!(Some(3), k.dep_of("x", 1));

    k.see_instance("x", instid!(1, 4));
    assert_eq!(Some(4), k.dep_of("x", 1));
}

#[test]
fn test_keys_set_dep() {
    let mut k = KeyTracker::new();
    k.see_instance("x", instid!(0, 5));

    // set_dep overwrites, even with a smaller value.
    k.set_dep("x", 0, 1);
    assert_eq!(Some(1), k.dep_of("x", 0));
}
