use std::fmt;
use std::io;

use slog::{Drain, OwnedKVList, Record, KV};
use slog_term::{Decorator, RecordDecorator};

pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f %:z";

/// OrdoFormat writes one line per record:
///
/// ```text
/// [2021/03/04 10:13:55.035 +08:00] [INFO] [components/epaxos/src/replica/leader.rs:160] commit (0, 1) replica_id: 0
/// ```
///
/// Record fields come in the order they are written, followed by the fields of the logger.
pub struct OrdoFormat<D: Decorator> {
    decorator: D,
    timestamp: bool,
}

impl<D: Decorator> OrdoFormat<D> {
    pub fn new(decorator: D) -> OrdoFormat<D> {
        OrdoFormat {
            decorator,
            timestamp: true,
        }
    }

    /// without_timestamp drops the leading timestamp, for output that has to be compared.
    pub fn without_timestamp(mut self) -> OrdoFormat<D> {
        self.timestamp = false;
        self
    }
}

impl<D: Decorator> Drain for OrdoFormat<D> {
    type Ok = ();
    type Err = io::Error;

    fn log(&self, record: &Record, values: &OwnedKVList) -> io::Result<()> {
        let fields = Fields::collect(record, values)?;

        self.decorator.with_record(record, values, |rd| {
            if self.timestamp {
                rd.start_timestamp()?;
                write!(rd, "[{}]", chrono::Local::now().format(TIMESTAMP_FORMAT))?;
                rd.start_whitespace()?;
                write!(rd, " ")?;
            }

            rd.start_level()?;
            write!(rd, "[{}]", record.level().as_short_str())?;
            rd.start_whitespace()?;
            write!(rd, " ")?;

            // slog_term has no start_file(), the location is written as a message part.
            rd.start_msg()?;
            write!(rd, "[{}:{}]", record.file(), record.line())?;
            rd.start_whitespace()?;
            write!(rd, " ")?;

            rd.start_msg()?;
            write!(rd, "{}", record.msg())?;

            fields.write(rd)?;

            rd.start_whitespace()?;
            writeln!(rd)?;
            rd.flush()
        })
    }
}

/// Fields collects key-values of a record and of its logger.
#[derive(Default)]
struct Fields {
    kvs: Vec<(String, String)>,
}

impl slog::Serializer for Fields {
    fn emit_arguments(&mut self, key: slog::Key, val: &fmt::Arguments) -> slog::Result {
        self.kvs.push((key.to_string(), val.to_string()));
        Ok(())
    }

    fn emit_none(&mut self, key: slog::Key) -> slog::Result {
        self.kvs.push((key.to_string(), "None".to_string()));
        Ok(())
    }

    fn emit_unit(&mut self, key: slog::Key) -> slog::Result {
        self.kvs.push((key.to_string(), "()".to_string()));
        Ok(())
    }
}

impl Fields {
    /// collect returns fields in written order. slog serializes both lists last-written first.
    fn collect(record: &Record, values: &OwnedKVList) -> io::Result<Fields> {
        let mut rec = Fields::default();
        record.kv().serialize(record, &mut rec).map_err(to_io)?;
        rec.kvs.reverse();

        let mut owned = Fields::default();
        values.serialize(record, &mut owned).map_err(to_io)?;
        owned.kvs.reverse();

        rec.kvs.extend(owned.kvs);
        Ok(rec)
    }

    fn write(&self, rd: &mut dyn RecordDecorator) -> io::Result<()> {
        for (i, (k, v)) in self.kvs.iter().enumerate() {
            if i == 0 {
                rd.start_whitespace()?;
                write!(rd, " ")?;
            } else {
                rd.start_comma()?;
                write!(rd, ", ")?;
            }

            rd.start_key()?;
            write!(rd, "{}", k)?;
            rd.start_separator()?;
            write!(rd, ":")?;
            rd.start_whitespace()?;
            write!(rd, " ")?;
            rd.start_value()?;
            write!(rd, "{}", v)?;
        }
        rd.reset()
    }
}

fn to_io(e: slog::Error) -> io::Error {
    match e {
        slog::Error::Io(e) => e,
        other => io::Error::new(io::ErrorKind::Other, format!("{}", other)),
    }
}
