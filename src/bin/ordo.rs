#[macro_use]
extern crate slog;

use std::time::Duration;

use epaxos::conf::ClusterInfo;
use ordo::cli;
use ordo::setup;
use ordo::LocalCluster;
use ordo::OrdoError;

#[tokio::main]
async fn main() -> Result<(), OrdoError> {
    let args = cli::parse_args(std::env::args_os()).unwrap_or_else(|e| e.exit());

    let logger = match args.log {
        Some(ref path) => setup::init_logger(path)?,
        None => setup::init_term_logger(),
    };

    let cluster = ClusterInfo::from_file(&args.cluster)?;

    let local = LocalCluster::new(&cluster, &logger)?;
    let proposals = local.run(args.n_cmds, &args.keys).await?;

    let n_failed = proposals.iter().filter(|p| p.result.is_err()).count();
    info!(logger, "proposed: {}, failed: {}", proposals.len(), n_failed);

    local
        .wait_executed(args.n_cmds, Duration::from_millis(args.timeout_ms))
        .await?;

    println!("{}", local.report());

    local.check_consistent()
}
