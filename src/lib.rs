#[macro_use]
extern crate clap;

#[macro_use]
extern crate quick_error;

#[macro_use]
extern crate slog;

mod errors;
pub use errors::*;

mod cluster;
pub use cluster::*;

pub mod cli;
pub mod setup;

#[cfg(test)]
mod test_cli;
