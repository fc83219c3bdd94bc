use thiserror::Error as ThisError;

#[rustfmt::skip]
#[derive(ThisError, Debug)]
pub enum Error {
    #[error("The {name} vector length {found} does not match the id vector length {expected}")]
    LengthMismatch { name: &'static str, expected: usize, found: usize },

    #[error("Family {family_id} does not exist")]
    UnknownFamily { family_id: i64 },

    #[error("Individual {id} does not exist in family {family_id}")]
    UnknownIndividual { family_id: i64, id: i64 },

    #[error("Individual {id} is not a founder of family {family_id}")]
    NotAFounder { family_id: i64, id: i64 },

    #[error("The parent links of family {family_id} form a cycle involving individual {id}")]
    Topology { family_id: i64, id: i64 },

    #[error("Invalid field {value:?} on line {line}")]
    FieldParse { line: usize, value: String },

    #[error("Line {line} has {found} fields, expected at least {expected}")]
    TruncatedRecord { line: usize, expected: usize, found: usize },

    #[error("The sampler needs at least one iteration")]
    NoIterations,
}
