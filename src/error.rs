use thiserror::Error;

/// Structural problems found while reading a gallery manifest or residue log.
///
/// I/O and parser failures are carried as `anyhow` context on top of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("missing '{0}' column")]
    MissingColumn(&'static str),

    #[error("row {row}: missing '{field}'")]
    MissingField { row: usize, field: &'static str },

    #[error("expected a top-level JSON array")]
    NotAnArray,
}
