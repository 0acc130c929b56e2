//! Utility module for command line interfaces

use std::{error::Error, fmt, fmt::Display, str::FromStr};

/// An error struct to wrap simple static error messages
#[derive(Debug, PartialEq)]
pub struct CliErr(pub &'static str);

impl Display for CliErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Error for CliErr {}

/// Parse an optional argument value, falling back to `default` when it is absent.
/// A present but malformed value yields `CliErr(err)`.
pub fn parse_or<T: FromStr>(value: Option<String>, default: T, err: &'static str) -> Result<T, CliErr> {
    match value {
        Some(value) => value.trim().parse().map_err(|_| CliErr(err)),
        None => Ok(default),
    }
}

/// Like `parse_or` but additionally rejects values which are not strictly positive and finite.
pub fn parse_positive_or(value: Option<String>, default: f64, err: &'static str) -> Result<f64, CliErr> {
    let parsed = parse_or(value, default, err)?;
    if parsed > 0.0 && parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(CliErr(err))
    }
}
