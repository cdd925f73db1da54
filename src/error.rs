//! Error types of this crate.
use std::io;
use thiserror::Error;

/// The error type returned by the fallible operations of this crate.
#[derive(Error, Debug)]
pub enum TreeError {
    /// The master string of a context cannot be parsed.
    #[error("Invalid master `{0}`: expected `local`, `local[N]`, or `local[*]`")]
    InvalidMaster(String),

    /// A strategy parameter is out of its valid range.
    #[error("Invalid strategy: {0}")]
    InvalidStrategy(String),

    /// Training was requested on a dataset without rows.
    #[error("The input dataset has no rows")]
    EmptyDataset,

    /// A feature vector has a size different from the first one.
    #[error("Row {row} has {found} features, expected {expected}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A classification label is not an integer in `[0, num_classes)`.
    #[error("Label {label} is not a class in [0, {num_classes})")]
    InvalidLabel {
        label: f64,
        num_classes: usize,
    },

    /// A categorical value is not an integer in `[0, arity)`.
    #[error("Feature {feature} has value {value}, \
             but it is declared categorical with {arity} categories")]
    InvalidCategory {
        feature: usize,
        value: f64,
        arity: usize,
    },

    /// A categorical feature has more categories than the bins allow.
    #[error("Feature {feature} has {arity} categories, \
             but at most {max_bins} bins are available. \
             Increase `max_bins`")]
    TooFewBins {
        feature: usize,
        arity: usize,
        max_bins: usize,
    },

    /// Two datasets zipped together are partitioned differently.
    #[error("Cannot zip datasets: {0}")]
    PartitionMismatch(String),

    /// A line of an input file or string cannot be parsed.
    #[error("Parse error at line {line}: {message}")]
    Parse {
        line: usize,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, TreeError>;
