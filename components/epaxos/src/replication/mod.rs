mod errors;
pub use errors::*;

mod quorum_event;
pub use quorum_event::*;

mod transport;
pub use transport::*;

mod communicator;
pub use communicator::*;

#[cfg(test)]
mod test_quorum_event;

#[cfg(test)]
mod test_communicator;
