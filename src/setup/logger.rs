use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

use slog::Drain;

use super::format::OrdoFormat;

/// init_logger builds a logger that appends to file `path` asynchronously.
/// The parent dir is created if absent.
pub fn init_logger<P: AsRef<Path>>(path: P) -> io::Result<slog::Logger> {
    let file = open_log_file(path.as_ref())?;

    let decorator = slog_term::PlainDecorator::new(file);
    let drain = OrdoFormat::new(decorator).fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    let logger = slog::Logger::root(drain, o!("app" => "ordo"));

    info!(logger, "logger ready: {}", path.as_ref().display());
    Ok(logger)
}

/// init_term_logger builds a logger that writes to stderr.
pub fn init_term_logger() -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = OrdoFormat::new(decorator).fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog::Logger::root(drain, o!())
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            fs::create_dir_all(parent)?
        }
    }
    OpenOptions::new().append(true).create(true).open(path)
}
