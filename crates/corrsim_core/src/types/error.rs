//! Error types for structured error handling.
//!
//! This module provides:
//! - `CorrelationError`: malformed or non-PSD correlation matrices
//! - `DomainError`: values escaping `[0, 1]` and batch shape problems
//! - `DistributionError`: degenerate or invalid marginal parameters
//! - `DateError`: calendar construction and parsing failures
//! - `SimulationError`: umbrella error returned by end-to-end runs
//!
//! None of these are retryable: a simulation is deterministic given its seed,
//! so a failure recurs identically and aborts the run.

use thiserror::Error;

/// Invalid correlation structure.
///
/// Raised at construction time only. A correlation matrix that fails any of
/// these checks is a caller bug.
///
/// # Examples
/// ```
/// use corrsim_core::types::CorrelationError;
///
/// let err = CorrelationError::NotSymmetric { i: 0, j: 1, upper: 0.5, lower: 0.3 };
/// assert!(format!("{}", err).contains("not symmetric"));
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CorrelationError {
    /// Dimension zero was requested.
    #[error("Correlation matrix must have dimension at least 1")]
    Empty,

    /// Entry count does not match `dim * dim` (or the upper-triangle count).
    #[error("Invalid matrix dimensions: expected {expected} elements, got {got}")]
    InvalidDimensions {
        /// Expected number of elements
        expected: usize,
        /// Supplied number of elements
        got: usize,
    },

    /// NaN or infinite entry.
    #[error("Correlation entry at ({i}, {j}) is not finite")]
    NonFinite {
        /// Row index
        i: usize,
        /// Column index
        j: usize,
    },

    /// Diagonal entry differs from 1.
    #[error("Diagonal element at index {index} is {value}, expected 1.0")]
    InvalidDiagonal {
        /// Diagonal index
        index: usize,
        /// Offending value
        value: f64,
    },

    /// `C[i][j] != C[j][i]` beyond tolerance.
    #[error("Matrix is not symmetric at ({i}, {j}): {upper} vs {lower}")]
    NotSymmetric {
        /// Row index
        i: usize,
        /// Column index
        j: usize,
        /// Value at (i, j)
        upper: f64,
        /// Value at (j, i)
        lower: f64,
    },

    /// Off-diagonal coefficient outside `[-1, 1]`.
    #[error("Correlation at ({i}, {j}) is {value}, must be in [-1, 1]")]
    OutOfRange {
        /// Row index
        i: usize,
        /// Column index
        j: usize,
        /// Offending value
        value: f64,
    },

    /// Cholesky factorisation found a negative pivot.
    #[error("Correlation matrix is not positive semi-definite (pivot {pivot} = {value:e})")]
    NotPositiveSemiDefinite {
        /// Pivot index where factorisation failed
        pivot: usize,
        /// Residual diagonal value at that pivot
        value: f64,
    },
}

/// A value escaped the domain a stage expects.
///
/// Given the sampler's output range these indicate an upstream logic bug.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainError {
    /// Quantile input outside `[0, 1]` (NaN included).
    #[error("Probability {value} is outside [0, 1]")]
    ProbabilityOutOfRange {
        /// Offending value
        value: f64,
    },

    /// Buffer length does not match the declared batch shape.
    #[error("Shape mismatch for {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        /// Which buffer or axis
        what: &'static str,
        /// Expected length
        expected: usize,
        /// Actual length
        got: usize,
    },

    /// Column index beyond the batch dimension.
    #[error("Column {column} is out of range for dimension {dim}")]
    ColumnOutOfRange {
        /// Requested column
        column: usize,
        /// Batch dimension
        dim: usize,
    },

    /// A reduction was asked for over no values.
    #[error("Cannot compute {what} of an empty input")]
    EmptyInput {
        /// Which statistic
        what: &'static str,
    },

    /// Percentile level outside `[0, 100]` (NaN included).
    #[error("Percentile level {level} is outside [0, 100]")]
    InvalidPercentile {
        /// Offending level
        level: f64,
    },

    /// Aggregation window of length zero.
    #[error("Aggregation window {index} has zero length")]
    EmptyWindow {
        /// Window index
        index: usize,
    },
}

/// Invalid or degenerate marginal distribution parameters.
///
/// # Examples
/// ```
/// use corrsim_core::types::DistributionError;
///
/// let err = DistributionError::DegenerateRange { minimum: 5.0, maximum: 5.0 };
/// assert_eq!(format!("{}", err), "Degenerate range: minimum 5 equals maximum 5");
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DistributionError {
    /// Bounded distribution with `minimum == maximum`.
    #[error("Degenerate range: minimum {minimum} equals maximum {maximum}")]
    DegenerateRange {
        /// Lower bound
        minimum: f64,
        /// Upper bound
        maximum: f64,
    },

    /// Bounded distribution with `minimum > maximum`.
    #[error("Invalid range: minimum {minimum} exceeds maximum {maximum}")]
    InvalidRange {
        /// Lower bound
        minimum: f64,
        /// Upper bound
        maximum: f64,
    },

    /// Mode outside `[minimum, maximum]`.
    #[error("Mode {mode} is outside [{minimum}, {maximum}]")]
    ModeOutOfRange {
        /// Lower bound
        minimum: f64,
        /// Most likely value
        mode: f64,
        /// Upper bound
        maximum: f64,
    },

    /// Gate probability outside `[0, 1]`.
    #[error("Invalid probability {p}: must be in [0, 1]")]
    InvalidProbability {
        /// Offending probability
        p: f64,
    },

    /// Family parameter rejected.
    #[error("Invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
        /// Why it was rejected
        reason: String,
    },

    /// Horizon rescaling requested for a family that is not location-scale.
    #[error("Horizon rescaling is not supported for the {family} family")]
    UnsupportedRescale {
        /// Family name
        family: &'static str,
    },
}

/// Date-related errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateError {
    /// Failed to parse an ISO 8601 date string.
    #[error("Date parse error: {0}")]
    ParseError(String),

    /// Month arithmetic left chrono's representable range.
    #[error("Date overflow adding {months} months to {start}")]
    Overflow {
        /// Start date (ISO 8601)
        start: String,
        /// Months added
        months: usize,
    },
}

/// Umbrella error for end-to-end simulation runs.
///
/// Lower-level errors convert into this via `?`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulationError {
    /// Invalid correlation structure.
    #[error(transparent)]
    Correlation(#[from] CorrelationError),

    /// Domain violation during sampling, transform or reduction.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Invalid marginal parameters.
    #[error(transparent)]
    Distribution(#[from] DistributionError),

    /// Calendar failure.
    #[error(transparent)]
    Date(#[from] DateError),

    /// Run configuration rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
