use thiserror::Error;

// ---------------------------------------------------------------------------
// DataError – validation failures of the record set and selections
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}, column '{column}': '{value}' is not a valid value")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: missing value for column '{column}'")]
    MissingValue { row: usize, column: &'static str },

    #[error("dataset contains no records")]
    Empty,

    #[error("year range is reversed: {start} > {end}")]
    InvertedYearRange { start: i32, end: i32 },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}
