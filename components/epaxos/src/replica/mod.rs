mod errors;
pub use errors::*;

mod slots;
pub use slots::*;

mod keys;
pub use keys::*;

mod state;
pub use state::*;

mod replica;
pub use replica::*;

mod exec;
mod handlers;
mod leader;
mod recovery;

#[cfg(test)]
mod test_slots;

#[cfg(test)]
mod test_keys;

#[cfg(test)]
mod test_state;
