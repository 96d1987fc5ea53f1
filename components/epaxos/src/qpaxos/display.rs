use std::fmt;

use crate::qpaxos::{Ballot, Command, Deps, Instance, InstanceId, OpCode};

pub trait ToStringExt {
    fn tostr_ext(&self) -> String;
}

impl ToStringExt for Deps {
    fn tostr_ext(&self) -> String {
        let items: Vec<String> = self.iter().map(|(r, i)| format!("{}:{}", r, i)).collect();
        format!("{{{}}}", items.join(", "))
    }
}

impl ToStringExt for Command {
    fn tostr_ext(&self) -> String {
        match self.kind() {
            OpCode::NoOp => "NoOp".into(),
            OpCode::Apply => format!("Apply:{}", String::from_utf8_lossy(&self.payload)),
        }
    }
}

macro_rules! impl_tostr_ext {
    ($typ:path) => {
        impl ToStringExt for $typ {
            fn tostr_ext(&self) -> String {
                format!("{}", self)
            }
        }
    };

    ($typ:path, $fmt:expr, $($field:tt),*) => {
        impl ToStringExt for $typ {
            fn tostr_ext(&self) -> String {
                format!($fmt, $(self.$field.tostr_ext()),*)
            }
        }
    };
}

impl_tostr_ext!(i64);
impl_tostr_ext!(InstanceId, "({}, {})", replica_id, idx);
impl_tostr_ext!(Ballot, "({}, {}, {})", epoch, ballot_no, replica_id);

impl ToStringExt for Instance {
    fn tostr_ext(&self) -> String {
        format!(
            "{{id:{}, blt:{}, cmd:{}, dkey:{}, seq:{}, deps:{}, st:{:?}}}",
            self.instance_id.tostr_ext(),
            self.highest_seen.tostr_ext(),
            self.cmd.tostr_ext(),
            self.dkey,
            self.seq,
            self.deps.tostr_ext(),
            self.state,
        )
    }
}

macro_rules! impl_display {
    ($typ:path) => {
        impl fmt::Display for $typ {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.tostr_ext())
            }
        }
    };
}

impl_display!(InstanceId);
impl_display!(Ballot);
impl_display!(Command);
impl_display!(Instance);
