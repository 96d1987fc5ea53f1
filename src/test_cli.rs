use pretty_assertions::assert_eq;

use crate::cli::parse_args;
use crate::cli::RunArgs;

#[test]
fn test_parse_args_default() {
    let got = parse_args(vec!["ordo", "--cluster", "cluster.yaml"]).unwrap();
    assert_eq!(
        RunArgs {
            cluster: "cluster.yaml".to_string(),
            n_cmds: 10,
            keys: vec!["x".to_string()],
            timeout_ms: 10000,
            log: None,
        },
        got
    );
}

#[test]
fn test_parse_args() {
    let got = parse_args(vec![
        "ordo",
        "--cluster",
        "c.yaml",
        "--commands",
        "5",
        "--keys",
        "a, b,,c",
        "--timeout",
        "20",
        "--log",
        "ordo.log",
    ])
    .unwrap();

    assert_eq!("c.yaml", got.cluster);
    assert_eq!(5, got.n_cmds);
    assert_eq!(vec!["a", "b", "c"], got.keys);
    assert_eq!(20, got.timeout_ms);
    assert_eq!(Some("ordo.log".to_string()), got.log);
}

#[test]
fn test_parse_args_invalid() {
    let e = parse_args(vec!["ordo", "--cluster", "c.yaml", "--commands", "many"]).unwrap_err();
    assert_eq!(clap::ErrorKind::ValueValidation, e.kind);

    let e = parse_args(vec!["ordo", "--cluster", "c.yaml", "--timeout", "-1"]).unwrap_err();
    assert_eq!(clap::ErrorKind::ValueValidation, e.kind);

    let e = parse_args(vec!["ordo"]).unwrap_err();
    assert_eq!(clap::ErrorKind::MissingRequiredArgument, e.kind);
}
