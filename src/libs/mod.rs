// PEDTK - Pedigree analysis toolkit
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

//! PEDTK - Pedigree analysis toolkit
//!
//! This library and program provides tools for working with pedigree data:
//! grouping individuals into families from parent links, clustering weighted
//! networks, and computing kinship and inbreeding coefficients either exactly
//! or by Monte Carlo sampling of inheritance paths.
//!
//! PEDTK toolkit commands
//!
//! * Exact kinship and inbreeding coefficients per family
//! * Monte Carlo kinship estimation
//! * Family clustering from pedigree trios
//! * Cluster detection in weighted networks
//!
//! ## Running PEDTK
//!
//! To print the available commands use:
//! ```bash
//! pedtk --help
//! ```
//! To compute kinship coefficients for all pairs of individuals in a pedigree:
//! ```bash
//! pedtk kinship pedigree.ped -k founder_kinship.txt -o ${outdir}
//! ```
//!

#[doc(hidden)]
pub mod args;

/// Label propagation primitives shared by the clustering commands
pub mod cluster;

#[doc(hidden)]
pub mod error;

#[doc(hidden)]
pub mod io;

/// PEDTK structs
pub mod structs;

#[doc(hidden)]
pub mod utils;

#[cfg(feature = "clap")]
pub mod clap;
