use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

use pretty_assertions::assert_eq;

use crate::conf::*;
use crate::replication::ReplicaPeer;

fn load_conf(cont: &str) -> Result<(tempfile::NamedTempFile, ClusterInfo), ConfError> {
    let mut f = tempfile::NamedTempFile::new()?;
    f.write_all(cont.as_bytes()).unwrap();
    f.as_file().sync_all().unwrap();

    let ci = ClusterInfo::from_file(f.path())?;
    Ok((f, ci))
}

#[test]
fn test_conf_serde_yaml() {
    let cont = "
replicas:
    0: 127.0.0.1:4441
    1: 127.0.0.1:4442
    2: 127.0.0.1:4443
epoch: 2
conf:
    quorum_timeout_ms: 300
    exec: false
";

    let (_tmpf, ci) = load_conf(cont).unwrap();
    assert_eq!(3, ci.n_replicas());
    assert_eq!(2, ci.quorum());
    assert_eq!(2, ci.fast_quorum());
    assert_eq!(2, ci.epoch);
    assert_eq!(Duration::from_millis(300), ci.conf.quorum_timeout());
    assert_eq!(false, ci.conf.exec);

    // not listed fields keep their defaults
    assert_eq!(10, ci.conf.recovery_grace_ms);
    assert_eq!(100, ci.conf.recovery_poll_ms);
    assert_eq!(1, ci.conf.exec_poll_ms);
}

#[test]
fn test_conf_default() {
    let ci = ClusterInfo::from_str("replicas:\n    0: 127.0.0.1:4441\n").unwrap();
    assert_eq!(0, ci.epoch);
    assert_eq!(ReplicaConf::default(), ci.conf);
    assert_eq!(0, ci.fast_quorum());
}

#[test]
fn test_conf_errors() {
    assert_eq!(
        ConfError::NoReplica,
        ClusterInfo::from_str("replicas: {}").unwrap_err()
    );

    let cont = "
replicas:
    0: 127.0.0.1:4441
conf:
    quorum_timeout_ms: 0
";
    assert_eq!(
        ConfError::BadQuorumTimeout,
        ClusterInfo::from_str(cont).unwrap_err()
    );

    let e = ClusterInfo::from_str("replicas: [1, 2").unwrap_err();
    assert!(matches!(e, ConfError::BadYaml(_)));

    let e = ClusterInfo::from_file("/no/such/file.yaml").unwrap_err();
    assert!(matches!(e, ConfError::IOError(_)));
}

#[test]
fn test_conf_peers_of() {
    let ci = ClusterInfo::from_str("replicas: {0: a, 1: b, 2: c}").unwrap();

    assert_eq!(
        vec![ReplicaPeer::new(0, "a"), ReplicaPeer::new(2, "c")],
        ci.peers_of(1).unwrap()
    );
    assert_eq!(ConfError::UnknownReplica(5), ci.peers_of(5).unwrap_err());
}

#[test]
fn test_conf_recovery_backoff() {
    let mut c = ReplicaConf::default();
    for _ in 0..100 {
        let d = c.recovery_backoff();
        assert!(d >= Duration::from_millis(100));
        assert!(d < Duration::from_millis(150));
    }

    c.recovery_jitter_ms = 0;
    assert_eq!(Duration::from_millis(100), c.recovery_backoff());
}
