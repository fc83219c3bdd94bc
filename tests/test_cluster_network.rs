mod common;

use std::collections::HashMap;
use std::path::PathBuf;

#[cfg(feature = "clap")]
fn run_network(prefix: &str, threshold: f64) -> HashMap<i64, usize> {
    let mut args = common::standard_args(prefix);
    args.file = PathBuf::from(common::EDGES);

    let cmd = pedtk::clap::SubCommand::ClusterNetwork {
        args,
        log_and_verbosity: common::silent_verbosity(),
        threshold,
    };
    pedtk::clap::run_cmd(cmd).unwrap();

    let res =
        std::fs::read_to_string(format!("tests/results/{prefix}_clusters.csv")).unwrap();
    res.lines()
        .skip(1)
        .map(|line| {
            let (node, cluster) = line.split_once(',').unwrap();
            (node.parse().unwrap(), cluster.parse().unwrap())
        })
        .collect()
}

#[test]
#[cfg(feature = "clap")]
fn cluster_network_cmd() {
    let clusters = run_network("network", 0.0);

    // components: {1,5,6,7,8,12,15,18,20}, {3,13,16,17}, {4,10}, {11,14}
    assert_eq!(clusters.len(), 17);
    assert_eq!(clusters[&1], clusters[&20]);
    assert_eq!(clusters[&5], clusters[&12]);
    assert_eq!(clusters[&3], clusters[&17]);
    assert_eq!(clusters[&4], clusters[&10]);
    assert_eq!(clusters[&11], clusters[&14]);
    assert_ne!(clusters[&1], clusters[&3]);
    assert_ne!(clusters[&1], clusters[&4]);
    assert_ne!(clusters[&4], clusters[&11]);
}

#[test]
#[cfg(feature = "clap")]
fn cluster_network_cmd_with_threshold() {
    let clusters = run_network("network_thr", 0.5);

    // the 4-10 edge at weight 0.3 is dropped, its endpoints fall apart,
    // the 13-17 edge at exactly 0.5 is kept
    assert_ne!(clusters[&4], clusters[&10]);
    assert_eq!(clusters[&13], clusters[&17]);
    assert_eq!(clusters[&1], clusters[&20]);
}
