#[macro_use]
extern crate quick_error;

#[macro_use]
extern crate slog;

#[macro_use]
extern crate lazy_static;

#[macro_use]
pub mod qpaxos;

pub mod conf;
pub mod graph;
pub mod replica;
pub mod replication;
pub mod testutil;
pub mod transport;
