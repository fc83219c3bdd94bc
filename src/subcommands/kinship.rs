use std::path::PathBuf;

use color_eyre::Result;
use ndarray::Array2;
use rayon::prelude::*;
use serde::Serialize;

use crate::args::StandardArgs;
use crate::io::{open_strict_tsv_writer, push_to_output, read_pedigree_file};
use crate::structs::{Family, PedigreeSet};

#[derive(Debug, Clone, Serialize)]
pub struct KinshipRow {
    pub family_id: i64,
    pub id_a: i64,
    pub id_b: i64,
    pub coefficient: f64,
}

/// Exact kinship matrix for one family by top-down dynamic programming.
///
/// The founder block is seeded from the family's founder kinship matrix
/// (diagonal as (1+k)/2), every other entry starts at the unset marker -1
/// and is filled by averaging over parents, walking the outer index in
/// top-down order. The diagonal of the result holds inbreeding
/// coefficients (2φ-1), off-diagonal entries are kinship coefficients.
/// O(n²) time and space for a family of n members.
pub fn compute_kinship(family: &Family) -> Array2<f64> {
    let n = family.members.len();
    let anc = family.ancestor_matrix();
    let mut phi = Array2::from_elem((n, n), -1.0);

    for &f in &family.founders {
        for &g in &family.founders {
            if f == g {
                phi[[f, f]] = (1.0 + family.founder_kinship[[f, f]]) / 2.0;
            } else {
                phi[[f, g]] = family.founder_kinship[[f, g]];
            }
        }
    }

    let order = &family.top_down;
    for x in 0..order.len() {
        let j = order[x];
        for &i in &order[x..] {
            if family.is_founder(i) && i != j && !family.is_founder(j) {
                if family.is_child_of_founders(j) {
                    let value = (phi_at(family.members[j].mother, i, &phi)
                        + phi_at(family.members[j].father, i, &phi))
                        / 2.0;
                    phi[[j, i]] = value;
                    phi[[i, j]] = value;
                } else if !anc[[j, i]] {
                    phi[[i, j]] = 0.0;
                }
            }
            if family.is_founder(j) && i != j && !family.is_founder(i) {
                if family.is_child_of_founders(i) {
                    let value = (phi_at(family.members[i].mother, j, &phi)
                        + phi_at(family.members[i].father, j, &phi))
                        / 2.0;
                    phi[[i, j]] = value;
                    phi[[j, i]] = value;
                } else if !anc[[i, j]] {
                    phi[[j, i]] = 0.0;
                }
            }

            if phi[[i, j]] == -1.0 {
                if i == j {
                    let parents =
                        phi_pair(family.members[i].mother, family.members[i].father, &phi);
                    phi[[i, i]] = (1.0 + parents) / 2.0;
                }
                if !anc[[j, i]] {
                    let value = (phi_at(family.members[i].mother, j, &phi)
                        + phi_at(family.members[i].father, j, &phi))
                        / 2.0;
                    phi[[i, j]] = value;
                    phi[[j, i]] = value;
                }
            }
        }
    }

    // kinship with self becomes the inbreeding coefficient
    for i in 0..n {
        phi[[i, i]] = 2.0 * phi[[i, i]] - 1.0;
    }
    phi
}

// kinship against an unrepresented parent is zero
fn phi_at(parent: Option<usize>, j: usize, phi: &Array2<f64>) -> f64 {
    match parent {
        Some(p) => phi[[p, j]],
        None => 0.0,
    }
}

fn phi_pair(a: Option<usize>, b: Option<usize>, phi: &Array2<f64>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => phi[[a, b]],
        _ => 0.0,
    }
}

/// Flatten a kinship matrix to one row per unordered pair of individuals
/// of interest, self-pairs included
pub fn kinship_rows(family: &Family, phi: &Array2<f64>) -> Vec<KinshipRow> {
    let interest = family.interest_indices();
    let mut rows = Vec::with_capacity(interest.len() * (interest.len() + 1) / 2);

    for (a, &i) in interest.iter().enumerate() {
        for &j in &interest[a..] {
            rows.push(KinshipRow {
                family_id: family.id,
                id_a: family.members[i].id,
                id_b: family.members[j].id,
                coefficient: phi[[i, j]],
            });
        }
    }
    rows
}

pub fn write_kinship_rows(
    rows: Vec<KinshipRow>,
    mut writer: csv::Writer<Box<dyn std::io::Write>>,
) -> Result<()> {
    writer.write_record(["family_id", "id_a", "id_b", "coefficient"])?;
    for row in rows {
        writer.serialize(row)?;
    }
    Ok(())
}

pub fn read_and_seed_pedigrees(
    args: &StandardArgs,
    founder_kinship: &Option<PathBuf>,
    interest: &Option<PathBuf>,
) -> Result<PedigreeSet> {
    let rows = read_pedigree_file(&args.file)?;
    tracing::info!("Read {} pedigree rows from {:?}", rows.len(), args.file);

    let mut set = PedigreeSet::from_rows(rows)?;
    tracing::info!("Built {} families", set.families.len());

    if let Some(path) = founder_kinship {
        let seeds = crate::io::read_founder_kinship_file(path)?;
        set.apply_founder_kinship(&seeds)?;
        tracing::info!("Applied {} founder kinship coefficients", seeds.len());
        for seed in &seeds {
            tracing::debug!(
                "Founder kinship {}: ({}, {}) = {}",
                seed.family_id,
                seed.id_a,
                seed.id_b,
                seed.coefficient
            );
        }
    }

    if let Some(path) = interest {
        let picks = crate::io::read_interest_file(path)?;
        set.apply_interest(&picks)?;
        tracing::info!("Restricted output to {} individuals of interest", picks.len());
    }

    Ok(set)
}

#[doc(hidden)]
pub fn run(
    args: StandardArgs,
    founder_kinship: Option<PathBuf>,
    interest: Option<PathBuf>,
) -> Result<()> {
    let set = read_and_seed_pedigrees(&args, &founder_kinship, &interest)?;

    // families are independent
    let families: Vec<&Family> = set.families.values().collect();
    let rows: Vec<KinshipRow> = families
        .par_iter()
        .flat_map_iter(|family| {
            let phi = compute_kinship(family);
            kinship_rows(family, &phi)
        })
        .collect();

    let mut output = args.output.clone();
    push_to_output(&args, &mut output, "kinship", "tsv");
    let writer = open_strict_tsv_writer(output)?;
    write_kinship_rows(rows, writer)?;

    Ok(())
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use super::*;
    use crate::structs::PedigreeSet;

    fn sib_pair() -> Family {
        // founders 1,2 with full sibs 3,4
        let set = PedigreeSet::from_trios(
            &[1; 4],
            &[1, 2, 3, 4],
            &[0, 0, 1, 1],
            &[0, 0, 2, 2],
            &[1, 2, 1, 2],
        ).unwrap();
        set.family(1).unwrap().clone()
    }

    #[test]
    fn test_sib_pair_kinship() {
        let family = sib_pair();
        let phi = compute_kinship(&family);

        assert_eq!(phi[[2, 3]], 0.25);
        assert_eq!(phi[[3, 2]], 0.25);
        assert_eq!(phi[[0, 2]], 0.25);
        assert_eq!(phi[[0, 1]], 0.0);
        // nobody is inbred
        for i in 0..4 {
            assert_eq!(phi[[i, i]], 0.0);
        }
    }

    #[test]
    fn test_grandparent_kinship() {
        // 1,2 -> 3; 3,4 -> 5
        let set = PedigreeSet::from_trios(
            &[1; 5],
            &[1, 2, 3, 4, 5],
            &[0, 0, 1, 0, 3],
            &[0, 0, 2, 0, 4],
            &[1, 2, 1, 2, 2],
        ).unwrap();
        let phi = compute_kinship(set.family(1).unwrap());

        assert_eq!(phi[[0, 4]], 0.125);
        assert_eq!(phi[[4, 0]], 0.125);
        assert_eq!(phi[[3, 4]], 0.25);
        assert_eq!(phi[[0, 3]], 0.0);
    }

    #[test]
    fn test_founder_seed_is_preserved() {
        let mut family = sib_pair();
        family.set_founder_kinship(1, 2, 0.125).unwrap();
        let phi = compute_kinship(&family);

        assert_eq!(phi[[0, 1]], 0.125);
        // related parents make the children inbred: (1 + phi_mf)/2 doubled
        // minus one is phi_mf
        assert_eq!(phi[[2, 2]], 0.125);
    }

    #[test]
    fn test_kinship_rows_interest() {
        let mut family = sib_pair();
        family.mark_interest(&[3, 4]).unwrap();
        let phi = compute_kinship(&family);
        let rows = kinship_rows(&family, &phi);

        assert_eq!(rows.len(), 3);
        assert_eq!((rows[0].id_a, rows[0].id_b), (3, 3));
        assert_eq!((rows[1].id_a, rows[1].id_b), (3, 4));
        assert_eq!(rows[1].coefficient, 0.25);
        assert_eq!((rows[2].id_a, rows[2].id_b), (4, 4));
    }
}
