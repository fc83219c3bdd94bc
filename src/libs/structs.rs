use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Sex {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Male,
            2 => Self::Female,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One line of a pedigree file before link resolution
#[derive(Debug, Clone)]
pub struct PedRow {
    pub family_id: i64,
    pub id: i64,
    pub father_id: i64,
    pub mother_id: i64,
    pub sex: Sex,
    pub affection: i64,
    pub is_typed: bool,
}

/// A family member with parent and child links resolved to member indices
#[derive(Debug, Clone)]
pub struct Individual {
    pub id: i64,
    pub father_id: i64,
    pub mother_id: i64,
    pub sex: Sex,
    pub affection: i64,
    pub is_typed: bool,
    pub father: Option<usize>,
    pub mother: Option<usize>,
    pub children: Vec<usize>,
    pub depth: usize,
}

/// A pedigree for a single family.
///
/// Members are addressed by their index in `members`. The traversal orders
/// are fixed at construction: `top_down` visits parents before children
/// (non-decreasing depth), `bottom_up` visits children before parents.
#[derive(Debug, Clone)]
pub struct Family {
    pub id: i64,
    pub members: Vec<Individual>,
    pub founders: Vec<usize>,
    pub nonfounders: Vec<usize>,
    pub interest: Vec<bool>,
    pub founder_kinship: Array2<f64>,
    pub top_down: Vec<usize>,
    pub bottom_up: Vec<usize>,
    index: HashMap<i64, usize>,
}

impl Family {
    pub fn new(family_id: i64, rows: Vec<PedRow>) -> Result<Self, Error> {
        let n = rows.len();

        let mut index: HashMap<i64, usize> = HashMap::with_capacity(n);
        for (i, row) in rows.iter().enumerate() {
            if index.insert(row.id, i).is_some() {
                tracing::warn!(
                    "Duplicate individual id {} in family {family_id}, links resolve to the last row",
                    row.id
                );
            }
        }

        let mut members: Vec<Individual> = rows
            .into_iter()
            .map(|row| {
                let father = resolve_parent(&index, row.father_id);
                let mother = resolve_parent(&index, row.mother_id);
                Individual {
                    id: row.id,
                    father_id: row.father_id,
                    mother_id: row.mother_id,
                    sex: row.sex,
                    affection: row.affection,
                    is_typed: row.is_typed,
                    father,
                    mother,
                    children: vec![],
                    depth: 0,
                }
            })
            .collect();

        for i in 0..n {
            if let Some(f) = members[i].father {
                if members[f].sex != Sex::Male {
                    tracing::warn!(
                        "Sex disagreement in family {family_id}: {} individual {} is the father of {}",
                        members[f].sex,
                        members[f].id,
                        members[i].id
                    );
                }
                members[f].children.push(i);
            }
            if let Some(m) = members[i].mother {
                if members[m].sex != Sex::Female {
                    tracing::warn!(
                        "Sex disagreement in family {family_id}: {} individual {} is the mother of {}",
                        members[m].sex,
                        members[m].id,
                        members[i].id
                    );
                }
                members[m].children.push(i);
            }
        }

        let mut founders = vec![];
        let mut nonfounders = vec![];
        for (i, member) in members.iter().enumerate() {
            if member.father.is_none() && member.mother.is_none() {
                founders.push(i);
            } else {
                nonfounders.push(i);
            }
        }

        set_depths(family_id, &mut members, &founders)?;

        let mut top_down: Vec<usize> = (0..n).collect();
        top_down.sort_by_key(|&i| members[i].depth);

        let bottom_up = bottom_up_order(family_id, &members)?;

        Ok(Self {
            id: family_id,
            founder_kinship: Array2::zeros((n, n)),
            interest: vec![true; n],
            members,
            founders,
            nonfounders,
            top_down,
            bottom_up,
            index,
        })
    }

    pub fn index_of(&self, id: i64) -> Result<usize, Error> {
        self.index.get(&id).copied().ok_or(Error::UnknownIndividual {
            family_id: self.id,
            id,
        })
    }

    pub fn is_founder(&self, i: usize) -> bool {
        self.members[i].father.is_none() && self.members[i].mother.is_none()
    }

    /// A non-founder whose resolved parents are all founders
    pub fn is_child_of_founders(&self, i: usize) -> bool {
        let member = &self.members[i];
        !self.is_founder(i)
            && member.father.map_or(true, |f| self.is_founder(f))
            && member.mother.map_or(true, |m| self.is_founder(m))
    }

    /// Set the kinship seed for a pair of founders, symmetrically
    pub fn set_founder_kinship(&mut self, id_a: i64, id_b: i64, coefficient: f64) -> Result<(), Error> {
        let a = self.index_of(id_a)?;
        let b = self.index_of(id_b)?;

        for (idx, id) in [(a, id_a), (b, id_b)] {
            if !self.is_founder(idx) {
                return Err(Error::NotAFounder {
                    family_id: self.id,
                    id,
                });
            }
        }

        self.founder_kinship[[a, b]] = coefficient;
        self.founder_kinship[[b, a]] = coefficient;
        Ok(())
    }

    /// Restrict the individuals of interest to the given ids
    pub fn mark_interest(&mut self, ids: &[i64]) -> Result<(), Error> {
        self.interest.iter_mut().for_each(|v| *v = false);
        for &id in ids {
            let i = self.index_of(id)?;
            self.interest[i] = true;
        }
        Ok(())
    }

    pub fn interest_indices(&self) -> Vec<usize> {
        (0..self.members.len())
            .filter(|&i| self.interest[i])
            .collect()
    }

    /// Ancestor closure: `anc[[i, j]]` is true when j is an ancestor of i or
    /// i == j. Rows are inherited from parents in top-down order.
    pub fn ancestor_matrix(&self) -> Array2<bool> {
        let n = self.members.len();
        let mut anc = Array2::from_elem((n, n), false);

        for i in 0..n {
            anc[[i, i]] = true;
        }

        for &i in &self.top_down {
            for parent in [self.members[i].father, self.members[i].mother]
                .into_iter()
                .flatten()
            {
                for j in 0..n {
                    if anc[[parent, j]] {
                        anc[[i, j]] = true;
                    }
                }
            }
        }
        anc
    }
}

fn resolve_parent(index: &HashMap<i64, usize>, parent_id: i64) -> Option<usize> {
    // an id that never appears in the member set is an implicit founder
    if parent_id == 0 {
        None
    } else {
        index.get(&parent_id).copied()
    }
}

// Raise-only depth assignment from every founder: the final depth is the
// longest founder-to-individual path.
fn set_depths(family_id: i64, members: &mut [Individual], founders: &[usize]) -> Result<(), Error> {
    let n = members.len();
    let mut stack: Vec<usize> = founders.to_vec();

    while let Some(i) = stack.pop() {
        let next = members[i].depth + 1;
        let children = members[i].children.clone();
        for c in children {
            if members[c].depth < next {
                if next >= n {
                    return Err(Error::Topology {
                        family_id,
                        id: members[c].id,
                    });
                }
                members[c].depth = next;
                stack.push(c);
            }
        }
    }
    Ok(())
}

// Children-before-parents order via a work queue. A member never popped
// means its descendants form a cycle.
fn bottom_up_order(family_id: i64, members: &[Individual]) -> Result<Vec<usize>, Error> {
    let n = members.len();
    let mut pending: Vec<usize> = members.iter().map(|m| m.children.len()).collect();

    let mut queue: VecDeque<usize> = (0..n).filter(|&i| pending[i] == 0).collect();
    let mut order = Vec::with_capacity(n);

    while let Some(i) = queue.pop_front() {
        order.push(i);
        for parent in [members[i].father, members[i].mother].into_iter().flatten() {
            pending[parent] -= 1;
            if pending[parent] == 0 {
                queue.push_back(parent);
            }
        }
    }

    if order.len() != n {
        let unvisited = pending
            .iter()
            .position(|&p| p > 0)
            .map_or(0, |i| members[i].id);
        return Err(Error::Topology {
            family_id,
            id: unvisited,
        });
    }
    Ok(order)
}

/// All families of one input batch, keyed by family id in first-seen order
#[derive(Debug, Clone)]
pub struct PedigreeSet {
    pub families: IndexMap<i64, Family>,
}

impl PedigreeSet {
    pub fn from_rows(rows: Vec<PedRow>) -> Result<Self, Error> {
        let mut grouped: IndexMap<i64, Vec<PedRow>> = IndexMap::new();
        for row in rows {
            grouped.entry(row.family_id).or_default().push(row);
        }

        let mut families = IndexMap::with_capacity(grouped.len());
        for (family_id, rows) in grouped {
            families.insert(family_id, Family::new(family_id, rows)?);
        }
        Ok(Self { families })
    }

    /// Vector entry point mirroring the trio shape of a pedigree file
    pub fn from_trios(
        family_ids: &[i64],
        ids: &[i64],
        father_ids: &[i64],
        mother_ids: &[i64],
        sexes: &[i64],
    ) -> Result<Self, Error> {
        let n = ids.len();
        for (name, len) in [
            ("family id", family_ids.len()),
            ("father id", father_ids.len()),
            ("mother id", mother_ids.len()),
            ("sex", sexes.len()),
        ] {
            if len != n {
                return Err(Error::LengthMismatch {
                    name,
                    expected: n,
                    found: len,
                });
            }
        }

        let rows = (0..n)
            .map(|i| PedRow {
                family_id: family_ids[i],
                id: ids[i],
                father_id: father_ids[i],
                mother_id: mother_ids[i],
                sex: Sex::from_code(sexes[i]),
                affection: 0,
                is_typed: false,
            })
            .collect();
        Self::from_rows(rows)
    }

    pub fn family(&self, family_id: i64) -> Result<&Family, Error> {
        self.families
            .get(&family_id)
            .ok_or(Error::UnknownFamily { family_id })
    }

    pub fn family_mut(&mut self, family_id: i64) -> Result<&mut Family, Error> {
        self.families
            .get_mut(&family_id)
            .ok_or(Error::UnknownFamily { family_id })
    }

    /// Apply founder kinship seeds read from a founder-kinship file
    pub fn apply_founder_kinship(&mut self, seeds: &[FounderKinshipRow]) -> Result<(), Error> {
        for seed in seeds {
            self.family_mut(seed.family_id)?.set_founder_kinship(
                seed.id_a,
                seed.id_b,
                seed.coefficient,
            )?;
        }
        Ok(())
    }

    /// Restrict interest per family; families absent from `picks` keep all
    /// of their members of interest
    pub fn apply_interest(&mut self, picks: &[(i64, i64)]) -> Result<(), Error> {
        let mut by_family: IndexMap<i64, Vec<i64>> = IndexMap::new();
        for &(family_id, id) in picks {
            by_family.entry(family_id).or_default().push(id);
        }

        for (family_id, ids) in by_family {
            self.family_mut(family_id)?.mark_interest(&ids)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FounderKinshipRow {
    pub family_id: i64,
    pub id_a: i64,
    pub id_b: i64,
    pub coefficient: f64,
}
