use color_eyre::Result;

use crate::args::StandardArgs;
use crate::cluster::{compact_labels, propagate_to_fixpoint, resolve_ids};
use crate::error::Error;
use crate::io::{open_csv_writer, push_to_output, read_pedigree_file};

/// Group individuals into families by propagating the smallest label over
/// the parent links until a fixpoint.
///
/// Individuals sharing a non-missing father or mother id are merged before
/// the propagation, so the grouping does not depend on the record order.
/// Parent ids absent from `ids` are treated as founders outside the set.
pub fn cluster_families(
    ids: &[i64],
    father_ids: &[i64],
    mother_ids: &[i64],
) -> Result<Vec<usize>, Error> {
    let n = ids.len();
    for (name, len) in [
        ("father id", father_ids.len()),
        ("mother id", mother_ids.len()),
    ] {
        if len != n {
            return Err(Error::LengthMismatch {
                name,
                expected: n,
                found: len,
            });
        }
    }

    let father = resolve_ids(ids, father_ids);
    let mother = resolve_ids(ids, mother_ids);

    // labels[n] is a neutral slot for the missing-parent sentinel
    let mut labels: Vec<usize> = (0..=n).collect();

    // merge half sibs sharing a parent id up front, the propagation below
    // would miss them when the shared parent is not in the id vector; run
    // to a fixpoint so a late merge reaches every earlier partner in a
    // chain of shared parents
    propagate_to_fixpoint(&mut labels, n.max(1), |labels| {
        let mut changed = false;
        for i in 0..n {
            for j in (i + 1)..n {
                let shared = (father_ids[i] != 0 && father_ids[i] == father_ids[j])
                    || (mother_ids[i] != 0 && mother_ids[i] == mother_ids[j]);
                if shared && labels[i] != labels[j] {
                    let low = labels[i].min(labels[j]);
                    labels[i] = low;
                    labels[j] = low;
                    changed = true;
                }
            }
        }
        changed
    });

    let passes = propagate_to_fixpoint(&mut labels, n.max(1), |labels| {
        let mut changed = false;
        for j in 0..n {
            let low = labels[j].min(labels[father[j]]).min(labels[mother[j]]);
            for slot in [j, father[j], mother[j]] {
                if slot < n && labels[slot] > low {
                    labels[slot] = low;
                    changed = true;
                }
            }
        }
        changed
    });
    tracing::debug!("family label propagation converged after {passes} passes");

    Ok(compact_labels(&labels[..n]))
}

#[doc(hidden)]
pub fn run(args: StandardArgs) -> Result<()> {
    let rows = read_pedigree_file(&args.file)?;
    tracing::info!("Read {} pedigree rows from {:?}", rows.len(), args.file);

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let father_ids: Vec<i64> = rows.iter().map(|r| r.father_id).collect();
    let mother_ids: Vec<i64> = rows.iter().map(|r| r.mother_id).collect();

    let labels = cluster_families(&ids, &father_ids, &mother_ids)?;
    tracing::info!(
        "Found {} families among {} individuals",
        labels.iter().max().map_or(0, |m| m + 1),
        ids.len()
    );

    let mut output = args.output.clone();
    push_to_output(&args, &mut output, "families", "csv");
    let mut writer = open_csv_writer(output)?;

    writer.write_record(["id", "family"])?;
    for (id, label) in ids.iter().zip(labels.iter()) {
        writer.write_record([id.to_string(), label.to_string()])?;
    }

    Ok(())
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use super::*;

    #[test]
    fn test_two_trios() {
        let ids = vec![1, 2, 3, 4, 5, 6];
        let fid = vec![0, 0, 1, 0, 0, 4];
        let mid = vec![0, 0, 2, 0, 0, 5];
        let labels = cluster_families(&ids, &fid, &mid).unwrap();
        assert_eq!(labels, vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_half_sibs_through_external_parent() {
        // 1 and 2 share father 99 who has no row of his own
        let ids = vec![1, 2];
        let fid = vec![99, 99];
        let mid = vec![0, 0];
        let labels = cluster_families(&ids, &fid, &mid).unwrap();
        assert_eq!(labels, vec![0, 0]);
    }

    #[test]
    fn test_half_sib_chain_through_external_parents() {
        // 1-4 and 2-3 share fathers, 2-4 share a mother, all parents
        // external, so the groups only connect through the chain
        let ids = vec![1, 2, 3, 4];
        let fid = vec![100, 200, 200, 100];
        let mid = vec![0, 300, 0, 300];
        let labels = cluster_families(&ids, &fid, &mid).unwrap();
        assert_eq!(labels, vec![0, 0, 0, 0]);

        // the same pedigree in reverse row order partitions identically
        let labels = cluster_families(&[4, 3, 2, 1], &[100, 200, 200, 100], &[300, 0, 300, 0]).unwrap();
        assert_eq!(labels, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_singletons() {
        let ids = vec![1, 2, 3];
        let fid = vec![0, 0, 0];
        let mid = vec![0, 0, 0];
        let labels = cluster_families(&ids, &fid, &mid).unwrap();
        assert_eq!(labels, vec![0, 1, 2]);
    }

    #[test]
    fn test_length_mismatch() {
        let result = cluster_families(&[1, 2], &[0], &[0, 0]);
        assert!(matches!(result, Err(Error::LengthMismatch { name: "father id", .. })));
    }
}
