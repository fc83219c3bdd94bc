/// Group individuals into families from pedigree parent links
pub mod cluster_families;

/// Find clusters in a weighted network given as an edge list
pub mod cluster_network;

/// Exact kinship and inbreeding coefficients per family
pub mod kinship;

/// Monte Carlo kinship estimation
pub mod kinship_estimate;
