#![allow(dead_code)]
use std::path::PathBuf;

use pedtk::args::StandardArgs;
#[cfg(feature = "clap")]
use pedtk::clap::LogAndVerbosity;

pub const TEST_PED: &str = "tests/data/test.ped";
pub const TEST_PED_GZ: &str = "tests/data/test.ped.gz";
pub const BAD_PED: &str = "tests/data/bad.ped";
pub const FOUNDER_KINSHIP: &str = "tests/data/founder_kinship.txt";
pub const INTEREST: &str = "tests/data/interest.txt";
pub const EDGES: &str = "tests/data/edges.csv";
pub const BAD_EDGES: &str = "tests/data/edges_bad.csv";
pub const OUTDIR: &str = "tests/results";

pub fn standard_args(prefix: &str) -> StandardArgs {
    std::fs::create_dir_all(OUTDIR).unwrap();
    StandardArgs {
        file: PathBuf::from(TEST_PED),
        output: PathBuf::from(OUTDIR),
        prefix: Some(prefix.to_string()),
    }
}

#[cfg(feature = "clap")]
pub fn silent_verbosity() -> LogAndVerbosity {
    LogAndVerbosity {
        verbosity: 1,
        log_file: None,
        silent: false,
    }
}

/// Parse a kinship output table into (family_id, id_a, id_b, coefficient)
pub fn read_kinship_table(path: &str) -> Vec<(i64, i64, i64, f64)> {
    let text = std::fs::read_to_string(path).unwrap();
    text.lines()
        .skip(1)
        .map(|line| {
            let fields: Vec<&str> = line.split('\t').collect();
            (
                fields[0].parse().unwrap(),
                fields[1].parse().unwrap(),
                fields[2].parse().unwrap(),
                fields[3].parse().unwrap(),
            )
        })
        .collect()
}

pub fn coefficient_of(rows: &[(i64, i64, i64, f64)], family_id: i64, id_a: i64, id_b: i64) -> f64 {
    rows.iter()
        .find(|(f, a, b, _)| *f == family_id && *a == id_a && *b == id_b)
        .map(|(_, _, _, c)| *c)
        .unwrap()
}
