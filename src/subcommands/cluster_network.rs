use std::collections::HashMap;

use color_eyre::Result;
use itertools::Itertools;

use crate::args::StandardArgs;
use crate::cluster::{compact_labels, propagate_to_fixpoint};
use crate::error::Error;
use crate::io::{open_csv_writer, push_to_output, read_edge_list_file};

/// Cluster a symmetric weighted network given as an edge list.
///
/// Edges with a weight below `threshold` are ignored. The remaining edges
/// are visited in ascending order of the `from` endpoint and the endpoint
/// with the larger label takes the smaller one, repeated to a fixpoint.
/// Returns one `(node id, cluster)` pair per referenced node, ascending.
pub fn cluster_network(
    from: &[i64],
    to: &[i64],
    weight: &[f64],
    threshold: f64,
) -> Result<Vec<(i64, usize)>, Error> {
    let n_edges = from.len();
    for (name, len) in [("to", to.len()), ("weight", weight.len())] {
        if len != n_edges {
            return Err(Error::LengthMismatch {
                name,
                expected: n_edges,
                found: len,
            });
        }
    }

    let nodes: Vec<i64> = from
        .iter()
        .chain(to.iter())
        .copied()
        .sorted()
        .dedup()
        .collect();
    let index: HashMap<i64, usize> = nodes.iter().enumerate().map(|(i, &id)| (id, i)).collect();

    // stable, ties keep the input edge order
    let mut order: Vec<usize> = (0..n_edges).collect();
    order.sort_by_key(|&e| from[e]);

    let max_passes = nodes.last().map_or(1, |&id| id.max(1) as usize);

    let mut labels: Vec<usize> = (0..nodes.len()).collect();
    let passes = propagate_to_fixpoint(&mut labels, max_passes, |labels| {
        let mut changed = false;
        for &e in &order {
            if weight[e] < threshold {
                continue;
            }
            let a = index[&from[e]];
            let b = index[&to[e]];
            if labels[a] < labels[b] {
                labels[b] = labels[a];
                changed = true;
            } else if labels[b] < labels[a] {
                labels[a] = labels[b];
                changed = true;
            }
        }
        changed
    });
    tracing::debug!("network label propagation converged after {passes} passes");

    let labels = compact_labels(&labels);
    Ok(nodes.into_iter().zip(labels).collect())
}

#[doc(hidden)]
pub fn run(args: StandardArgs, threshold: f64) -> Result<()> {
    let (from, to, weight) = read_edge_list_file(&args.file)?;
    tracing::info!("Read {} edges from {:?}", from.len(), args.file);

    let clusters = cluster_network(&from, &to, &weight, threshold)?;
    tracing::info!(
        "Found {} clusters among {} nodes",
        clusters.iter().map(|(_, c)| c + 1).max().unwrap_or(0),
        clusters.len()
    );

    let mut output = args.output.clone();
    push_to_output(&args, &mut output, "clusters", "csv");
    let mut writer = open_csv_writer(output)?;

    writer.write_record(["node", "cluster"])?;
    for (node, cluster) in clusters {
        writer.write_record([node.to_string(), cluster.to_string()])?;
    }

    Ok(())
}
