use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;

use crate::error::Error;

//NOTE: This should be parsed by clap automatically, but Option<String> parsing is not supported out of the box as of now
pub fn strip_prefix(prefix: Option<String>) -> Option<String> {
    if let Some(prefix) = prefix {
        match prefix.as_ref() {
            "" => None,
            "\\0" => None,
            v => Some(v.to_string()),
        }
    } else {
        None
    }
}

// Ids in the legacy whitespace formats encode a missing parent as 0, NA or .
pub fn parse_optional_id(field: &str, line: usize) -> Result<i64> {
    if field == "." || field.eq_ignore_ascii_case("na") {
        return Ok(0);
    }
    parse_id(field, line)
}

pub fn parse_id(field: &str, line: usize) -> Result<i64> {
    field.parse::<i64>().wrap_err(eyre!(Error::FieldParse {
        line,
        value: field.into()
    }))
}

pub fn parse_coefficient(field: &str, line: usize) -> Result<f64> {
    field.parse::<f64>().wrap_err(eyre!(Error::FieldParse {
        line,
        value: field.into()
    }))
}
