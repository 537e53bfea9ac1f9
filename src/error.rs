use std::io;

use thiserror::Error;

/// Reasons a marks CSV could not be turned into a table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unable to read file: {0}")]
    Io(#[from] io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),

    #[error("row {row}: '{value}' in column '{column}' is not a number")]
    InvalidMark {
        row: usize,
        column: &'static str,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unable to write PDF: {0}")]
    Io(#[from] io::Error),

    #[error("PDF generation failed: {0}")]
    Pdf(#[from] printpdf::Error),
}
