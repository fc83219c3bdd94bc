use std::collections::HashMap;

use itertools::Itertools;

/// Resolve external parent ids against an ordered id vector.
///
/// Returns, for every position, the index of the row carrying the parent id.
/// A missing parent (id 0) or an id absent from the vector resolves to the
/// sentinel index `ids.len()`. The first occurrence wins on duplicate ids.
pub fn resolve_ids(ids: &[i64], parents: &[i64]) -> Vec<usize> {
    let n = ids.len();

    let mut lookup: HashMap<i64, usize> = HashMap::with_capacity(n);
    for (i, &id) in ids.iter().enumerate() {
        lookup.entry(id).or_insert(i);
    }

    parents
        .iter()
        .map(|&p| {
            if p == 0 {
                n
            } else {
                lookup.get(&p).copied().unwrap_or(n)
            }
        })
        .collect()
}

/// Run a label propagation pass until no pass changes a label, bounded by
/// `max_passes`. Returns the number of passes run.
pub fn propagate_to_fixpoint<F>(labels: &mut [usize], max_passes: usize, mut pass: F) -> usize
where
    F: FnMut(&mut [usize]) -> bool,
{
    for done in 1..=max_passes {
        if !pass(labels) {
            return done;
        }
    }
    max_passes
}

/// Renumber labels to consecutive integers starting at 0, preserving the
/// relative order of the label values.
pub fn compact_labels(labels: &[usize]) -> Vec<usize> {
    let names: Vec<usize> = labels.iter().copied().sorted().dedup().collect();
    let index: HashMap<usize, usize> = names.iter().enumerate().map(|(i, &l)| (l, i)).collect();

    labels.iter().map(|l| index[l]).collect()
}
