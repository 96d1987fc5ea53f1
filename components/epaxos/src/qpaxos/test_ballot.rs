use crate::qpaxos::*;

#[test]
fn test_ballot_order() {
    assert!(ballot!(1, 2, 3) < ballot!(1, 3, 0));
    assert!(ballot!(1, 9, 9) < ballot!(2, 0, 0));
    assert!(ballot!(1, 2, 3) < ballot!(1, 2, 4));
    assert!(Ballot::initial() < Ballot::default());
    assert!(Ballot::initial() < Ballot::default_of(0, 0));
    assert_eq!(ballot!(1, 2, 3), Ballot::from((1, 2, 3)));
    assert_ne!(ballot!(1, 2, 3), ballot!(1, 2, 4));
}

#[test]
fn test_ballot_default_of() {
    let b = Ballot::default_of(3, 1);
    assert_eq!(ballot!(3, 0, 1), b);
    assert!(b.is_default());
    assert!(!ballot!(3, 1, 1).is_default());
}

#[test]
fn test_ballot_next() {
    let cases = vec![
        (ballot!(0, -1, 0), 2, 4, ballot!(2, 1, 4)),
        (ballot!(0, 0, 0), 0, 1, ballot!(0, 1, 1)),
        (ballot!(1, 5, 2), 1, 3, ballot!(1, 6, 3)),
    ];

    for (b, epoch, rid, want) in cases {
        let got = b.next(epoch, rid);
        assert_eq!(want, got, "next of {}", b);
        assert!(got > b);
    }
}
