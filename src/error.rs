use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for grid construction, configuration loading and integration.
///
/// Degenerate grid cells and points outside the domain are not errors; they are
/// resolved by the index repair rule and the boundary policy. What remains here is
/// either bad input (fatal before a run starts) or an unchecked lookup outside the grid.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid numeric parameter (non-positive mass, NaN velocity, ...).
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Malformed or inconsistent configuration (bad flag, non-monotonic grid, empty time range).
    #[error("configuration error: {0}")]
    Config(String),

    /// A data file row could not be understood.
    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },

    /// A lookup addressed grid samples outside the stored field.
    #[error("out of bounds: {0}")]
    OutOfBounds(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_and_bounds_errors_carry_context() {
        let e = Error::Config("axis maximum -1 must exceed its minimum 2".into());
        assert_eq!(e.to_string(), "configuration error: axis maximum -1 must exceed its minimum 2");
        let e = Error::OutOfBounds("grid index 2.000 outside [0, 2]".into());
        assert!(e.to_string().starts_with("out of bounds:"));
        assert!(e.to_string().contains("[0, 2]"));
    }

    #[test]
    fn parse_error_names_file_and_line() {
        let e = Error::Parse {
            path: PathBuf::from("field.csv"),
            line: 12,
            message: "expected 6 columns, found 4".into(),
        };
        assert_eq!(e.to_string(), "field.csv:12: expected 6 columns, found 4");
    }

    #[test]
    fn json_errors_convert() {
        let err: Result<serde_json::Value> = serde_json::from_str("{ \"time_data\": ").map_err(Error::from);
        assert!(matches!(err, Err(Error::Json(_))));
    }
}
