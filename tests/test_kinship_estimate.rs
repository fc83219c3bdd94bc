mod common;

use rand::rngs::StdRng;
use rand::SeedableRng;

use pedtk::structs::PedigreeSet;
use pedtk::subcommands::kinship::compute_kinship;
use pedtk::subcommands::kinship_estimate::sample_kinship;

#[test]
fn estimate_converges_to_exact() {
    let set = PedigreeSet::from_trios(
        &[1; 5],
        &[1, 2, 3, 4, 5],
        &[0, 0, 1, 1, 3],
        &[0, 0, 2, 2, 0],
        &[1, 2, 1, 1, 2],
    )
    .unwrap();
    let family = set.family(1).unwrap();

    let exact = compute_kinship(family);
    let mut rng = StdRng::seed_from_u64(1234);
    let estimate = sample_kinship(family, 20_000, &mut rng).unwrap();

    // sibs 3 and 4, and 5 below 3 through an unlisted mother
    assert!((exact[[2, 3]] - 0.25).abs() < f64::EPSILON);
    assert!((estimate[[2, 3]] - 0.25).abs() < 0.03);
    assert!((exact[[3, 4]] - 0.125).abs() < f64::EPSILON);
    assert!((estimate[[3, 4]] - 0.125).abs() < 0.03);
    // an outbred leaf never draws coinciding labels
    assert_eq!(estimate[[3, 3]], 0.0);
}

#[test]
fn founder_redraw_shares_labels() {
    // seeded founder kinship shows up as inbreeding of the child
    let set = PedigreeSet::from_trios(
        &[1; 3],
        &[1, 2, 3],
        &[0, 0, 1],
        &[0, 0, 2],
        &[1, 2, 2],
    )
    .unwrap();
    let mut family = set.family(1).unwrap().clone();
    family.set_founder_kinship(1, 2, 0.25).unwrap();

    let mut rng = StdRng::seed_from_u64(99);
    let estimate = sample_kinship(&family, 20_000, &mut rng).unwrap();
    let exact = compute_kinship(&family);

    assert!((exact[[2, 2]] - 0.25).abs() < f64::EPSILON);
    assert!((estimate[[2, 2]] - 0.25).abs() < 0.03);
}

#[test]
#[cfg(feature = "clap")]
fn kinship_estimate_cmd() {
    let args = common::standard_args("estimate");

    let cmd = pedtk::clap::SubCommand::KinshipEstimate {
        args,
        log_and_verbosity: common::silent_verbosity(),
        iterations: 20_000,
        seed: Some(42),
        founder_kinship: None,
        interest: None,
    };
    pedtk::clap::run_cmd(cmd).unwrap();

    let rows = common::read_kinship_table("tests/results/estimate_kinship_estimate.tsv");

    // all pairs of both families, self-pairs included
    assert_eq!(rows.len(), 21 + 6);
    for (_, _, _, coefficient) in &rows {
        assert!(*coefficient >= 0.0 && *coefficient <= 1.0);
    }

    // the trio in family 2 estimates parent-child kinship
    let parent_child = common::coefficient_of(&rows, 2, 1, 3);
    assert!((parent_child - 0.25).abs() < 0.03);
}
