use std::ffi::OsString;

use clap::{App, Arg, ArgMatches};

/// RunArgs is what the ordo command runs a local cluster with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    pub cluster: String,
    pub n_cmds: usize,
    pub keys: Vec<String>,
    pub timeout_ms: u64,
    pub log: Option<String>,
}

pub fn new_app() -> App<'static, 'static> {
    App::new("ordo")
        .version("0.1.0")
        .author("openacid")
        .about("run a leaderless replicated cluster in one process")
        .arg(
            Arg::with_name("cluster")
                .long("cluster")
                .takes_value(true)
                .required(true)
                .help("cluster config in yaml"),
        )
        .arg(
            Arg::with_name("commands")
                .long("commands")
                .takes_value(true)
                .default_value("10")
                .help("number of commands to propose"),
        )
        .arg(
            Arg::with_name("keys")
                .long("keys")
                .takes_value(true)
                .default_value("x")
                .help("comma separated keys commands are on"),
        )
        .arg(
            Arg::with_name("timeout")
                .long("timeout")
                .takes_value(true)
                .default_value("10000")
                .help("milliseconds to wait for all commands to be executed"),
        )
        .arg(
            Arg::with_name("log")
                .long("log")
                .takes_value(true)
                .help("log file path, log to stderr if absent"),
        )
}

/// parse_args parses a command line. The first item is the program name.
pub fn parse_args<I, T>(args: I) -> Result<RunArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = new_app().get_matches_from_safe(args)?;
    from_matches(&matches)
}

fn from_matches(matches: &ArgMatches) -> Result<RunArgs, clap::Error> {
    let n_cmds = value_t!(matches, "commands", usize)?;
    let timeout_ms = value_t!(matches, "timeout", u64)?;

    let keys = matches
        .value_of("keys")
        .unwrap_or_default()
        .split(',')
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect();

    Ok(RunArgs {
        cluster: matches.value_of("cluster").unwrap_or_default().to_string(),
        n_cmds,
        keys,
        timeout_ms,
        log: matches.value_of("log").map(String::from),
    })
}
