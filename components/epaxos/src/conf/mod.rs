mod conf;
mod errors;

pub use self::conf::*;
pub use errors::*;

#[cfg(test)]
mod test_conf;
