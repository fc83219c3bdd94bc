use std::io::{self, BufRead};
use std::path::PathBuf;

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use csv::{Reader, ReaderBuilder, Writer, WriterBuilder};

use crate::args::StandardArgs;
use crate::error::Error;
use crate::structs::{FounderKinshipRow, PedRow, Sex};
use crate::utils::{parse_coefficient, parse_id, parse_optional_id, strip_prefix};

/// Read a whitespace-separated pedigree file.
///
/// One line per individual: `family_id individual_id father_id mother_id sex
/// affection [alleles...]`. Missing parents are 0, NA or `.`, and an
/// individual is typed when any trailing allele column is non-zero.
pub fn read_pedigree_file(path: &PathBuf) -> Result<Vec<PedRow>> {
    let input = io::BufReader::new(get_input(Some(path.clone()))?);
    let mut rows = vec![];

    for (i, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let number = i + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            return Err(Error::TruncatedRecord {
                line: number,
                expected: 6,
                found: fields.len(),
            })
            .wrap_err(eyre!("failed to read pedigree file {path:?}"));
        }

        let mut is_typed = false;
        for field in &fields[6..] {
            if parse_id(field, number)? != 0 {
                is_typed = true;
                break;
            }
        }

        rows.push(PedRow {
            family_id: parse_id(fields[0], number)?,
            id: parse_id(fields[1], number)?,
            father_id: parse_optional_id(fields[2], number)?,
            mother_id: parse_optional_id(fields[3], number)?,
            sex: Sex::from_code(parse_id(fields[4], number)?),
            affection: parse_id(fields[5], number)?,
            is_typed,
        });
    }
    Ok(rows)
}

/// Read founder kinship seeds: `family_id founder_id founder_id coefficient`
pub fn read_founder_kinship_file(path: &PathBuf) -> Result<Vec<FounderKinshipRow>> {
    let input = io::BufReader::new(get_input(Some(path.clone()))?);
    let mut rows = vec![];

    for (i, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let number = i + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(Error::TruncatedRecord {
                line: number,
                expected: 4,
                found: fields.len(),
            })
            .wrap_err(eyre!("failed to read founder kinship file {path:?}"));
        }

        rows.push(FounderKinshipRow {
            family_id: parse_id(fields[0], number)?,
            id_a: parse_id(fields[1], number)?,
            id_b: parse_id(fields[2], number)?,
            coefficient: parse_coefficient(fields[3], number)?,
        });
    }
    Ok(rows)
}

/// Read individuals of interest: `family_id individual_id` per line
pub fn read_interest_file(path: &PathBuf) -> Result<Vec<(i64, i64)>> {
    let input = io::BufReader::new(get_input(Some(path.clone()))?);
    let mut picks = vec![];

    for (i, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let number = i + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(Error::TruncatedRecord {
                line: number,
                expected: 2,
                found: fields.len(),
            })
            .wrap_err(eyre!("failed to read interest file {path:?}"));
        }
        picks.push((parse_id(fields[0], number)?, parse_id(fields[1], number)?));
    }
    Ok(picks)
}

#[derive(Debug, Clone, serde::Deserialize)]
struct EdgeRow {
    from: i64,
    to: i64,
    weight: f64,
}

/// Read a `from,to,weight` edge list csv with a header row
pub fn read_edge_list_file(path: &PathBuf) -> Result<(Vec<i64>, Vec<i64>, Vec<f64>)> {
    let mut rdr = get_csv_reader(get_input(Some(path.clone()))?);

    let (mut from, mut to, mut weight) = (vec![], vec![], vec![]);
    for line in rdr.deserialize() {
        let row: EdgeRow =
            line.wrap_err(eyre!("Make sure the edge list {path:?} has a from,to,weight header"))?;
        from.push(row.from);
        to.push(row.to);
        weight.push(row.weight);
    }
    Ok((from, to, weight))
}

pub fn push_to_output(args: &StandardArgs, output: &mut PathBuf, name: &str, suffix: &str) {
    if let Some(prefix) = &strip_prefix(args.prefix.clone()) {
        output.push(format!("{prefix}_{name}.{suffix}"));
    } else {
        output.push(format!("{name}.{suffix}"));
    }
}

pub fn get_csv_reader<R: io::Read>(input: R) -> Reader<R> {
    ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(false)
        .from_reader(input)
}

pub fn get_csv_writer<W: io::Write>(output: W) -> Writer<W> {
    WriterBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_writer(output)
}

pub fn get_strict_tsv_writer<W: io::Write>(output: W) -> Writer<W> {
    WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_writer(output)
}

pub fn get_input(filename: Option<PathBuf>) -> Result<Box<dyn io::Read>> {
    let input: Box<dyn io::Read> = match filename {
        Some(name) => match name.to_str() {
            Some("-") => Box::new(io::stdin()),
            Some(name) => {
                let r = match niffler::from_path(name) {
                    Ok(x) => x.0,
                    Err(err) => {
                        let msg = format!("failed to open \"{name}\": {err}");
                        return Err(eyre!(msg))?;
                    }
                };
                Box::new(r)
            }
            None => return Err(eyre!("Unknown I/O error")),
        },
        None => Box::new(io::stdin()),
    };
    Ok(input)
}

pub fn get_output(filename: Option<PathBuf>) -> Result<Box<dyn io::Write>> {
    let output: Box<dyn io::Write> = match filename {
        Some(name) => match name.to_str() {
            Some("-") => Box::new(io::stdout()),
            Some(name) => Box::new(
                match std::fs::File::options()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(name)
                {
                    Ok(x) => x,
                    Err(err) => return Err(eyre!("failed to open \"{name}\": {err}"))?,
                },
            ),
            None => return Err(eyre!("Unknown I/O error")),
        },
        None => Box::new(io::stdout()),
    };
    Ok(output)
}

pub fn open_csv_writer(name: PathBuf) -> Result<Writer<Box<dyn io::Write>>> {
    Ok(get_csv_writer(get_output(Some(name))?))
}

pub fn open_strict_tsv_writer(name: PathBuf) -> Result<Writer<Box<dyn io::Write>>> {
    Ok(get_strict_tsv_writer(get_output(Some(name))?))
}
