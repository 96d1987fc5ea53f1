mod format;
pub use format::*;

mod logger;
pub use logger::*;
