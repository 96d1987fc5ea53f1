#[macro_export]
#[allow(unused_macros)]
macro_rules! instid {
    ($replica_id:expr, $idx:expr) => {
        $crate::qpaxos::InstanceId::from(($replica_id as i64, $idx as i64))
    };
}

#[macro_export]
#[allow(unused_macros)]
macro_rules! instids {
    [$(($replica_id:expr, $idx:expr)),* $(,)*] => {
        vec![$($crate::qpaxos::InstanceId::from(($replica_id as i64, $idx as i64))),*]
    }
}

#[macro_export]
#[allow(unused_macros)]
macro_rules! ballot {
    ($epoch:expr, $num:expr, $replica_id:expr) => {
        $crate::qpaxos::Ballot {
            epoch: $epoch as i64,
            ballot_no: $num as i64,
            replica_id: $replica_id as i64,
        }
    };
}

/// Build a `Deps` from `replica_id => idx` pairs.
///
/// ```
/// #[macro_use] extern crate epaxos;
///
/// let d = deps! {0 => 3, 2 => 1};
/// assert_eq!(Some(&3), d.get(&0));
/// ```
#[macro_export]
#[allow(unused_macros)]
macro_rules! deps {
    {$($rid:expr => $idx:expr),* $(,)*} => {
        {
            #[allow(unused_mut)]
            let mut d = $crate::qpaxos::Deps::new();
            $( d.insert($rid as i64, $idx as i64); )*
            d
        }
    }
}

/// Create an instance in a given state:
/// inst!((replica_id, idx), "payload", "dkey", seq, {deps}, state)
///
/// A payload of `"NoOp"` creates a NoOp instance.
#[macro_export]
#[allow(unused_macros)]
macro_rules! inst {
    ($id:expr, $payload:expr, $dkey:expr, $seq:expr, {$($rid:expr => $idx:expr),* $(,)*}, $state:expr $(,)*) => {
        {
            let mut i = $crate::qpaxos::Instance::empty($crate::qpaxos::InstanceId::from($id));
            i.cmd = if $payload == "NoOp" {
                $crate::qpaxos::Command::noop()
            } else {
                $crate::qpaxos::Command::from($payload)
            };
            i.dkey = String::from($dkey);
            i.seq = $seq;
            i.deps = $crate::deps! {$($rid => $idx),*};
            i.state = $state;
            i
        }
    };
}
