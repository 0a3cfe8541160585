use thiserror::Error;

use crate::roles::Role;

/// Broad classification of a [`FlightError`].
///
/// Variants
/// -----------------
/// * `Configuration` – raised while building an object (missing/ambiguous role,
///   non time-like index, missing optional capability).
/// * `Usage` – raised at call time for an invalid request (bad ordinal, empty
///   grouping, transformation after a terminal step).
/// * `UnboundRole` – a role accessor was called on an unbound role.
/// * `Data` – the table engine rejected the operation (length or type mismatch,
///   unknown column, I/O or CSV failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Usage,
    UnboundRole,
    Data,
}

#[derive(Error, Debug)]
pub enum FlightError {
    #[error("{0} is required but no matching column was found")]
    MissingRequiredRole(Role),

    #[error("{role} is ambiguous: column '{column}' appears {count} times")]
    AmbiguousRole {
        role: Role,
        column: String,
        count: usize,
    },

    #[error("Table has no geometry column")]
    MissingGeometry,

    #[error("Table has {0} geometry columns, expected exactly one")]
    AmbiguousGeometry(usize),

    #[error("Index must be time-like to {0}; use `set_time_index` to convert it")]
    NonTimeIndex(&'static str),

    #[error("Missing capability: {0}")]
    MissingCapability(&'static str),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid frequency string: {0}")]
    InvalidFrequency(String),

    #[error("You have to supply at least one grouping key or the index level")]
    MissingGroupKeys,

    #[error("Only integer indexing is supported: index {index} out of range for {len} groups; use `flight(key)` for keyed access")]
    GroupIndexOutOfRange { index: usize, len: usize },

    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("Cannot apply further transformations after simplifying to a linestring")]
    TerminalPipeline,

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("{0} column is not set")]
    RoleNotConfigured(Role),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column '{0}' is ambiguous: it appears more than once")]
    AmbiguousColumn(String),

    #[error("Column '{column}' has type {found}, expected {expected}")]
    ColumnTypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Length mismatch: expected {expected} rows, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Incompatible tables: {0}")]
    IncompatibleFrames(String),

    #[error("Unable to parse time value: {0}")]
    TimeParse(String),

    #[error("Reprojection failed: {0}")]
    Reprojection(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),
}

impl FlightError {
    /// Classify this error according to the crate error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        use FlightError::*;
        match self {
            MissingRequiredRole(_)
            | AmbiguousRole { .. }
            | MissingGeometry
            | AmbiguousGeometry(_)
            | NonTimeIndex(_)
            | MissingCapability(_)
            | InvalidParameter(_)
            | InvalidFrequency(_) => ErrorKind::Configuration,

            MissingGroupKeys
            | GroupIndexOutOfRange { .. }
            | GroupNotFound(_)
            | TerminalPipeline
            | Unsupported(_) => ErrorKind::Usage,

            RoleNotConfigured(_) => ErrorKind::UnboundRole,

            ColumnNotFound(_)
            | AmbiguousColumn(_)
            | ColumnTypeMismatch { .. }
            | LengthMismatch { .. }
            | IncompatibleFrames(_)
            | TimeParse(_)
            | Reprojection(_)
            | Csv(_)
            | IoError(_) => ErrorKind::Data,
        }
    }
}

impl PartialEq for FlightError {
    fn eq(&self, other: &Self) -> bool {
        use FlightError::*;
        match (self, other) {
            (MissingRequiredRole(a), MissingRequiredRole(b)) => a == b,
            (
                AmbiguousRole {
                    role: ra,
                    column: ca,
                    count: na,
                },
                AmbiguousRole {
                    role: rb,
                    column: cb,
                    count: nb,
                },
            ) => ra == rb && ca == cb && na == nb,
            (AmbiguousGeometry(a), AmbiguousGeometry(b)) => a == b,
            (NonTimeIndex(a), NonTimeIndex(b)) => a == b,
            (MissingCapability(a), MissingCapability(b)) => a == b,
            (InvalidParameter(a), InvalidParameter(b)) => a == b,
            (InvalidFrequency(a), InvalidFrequency(b)) => a == b,
            (
                GroupIndexOutOfRange { index: ia, len: la },
                GroupIndexOutOfRange { index: ib, len: lb },
            ) => ia == ib && la == lb,
            (GroupNotFound(a), GroupNotFound(b)) => a == b,
            (Unsupported(a), Unsupported(b)) => a == b,
            (RoleNotConfigured(a), RoleNotConfigured(b)) => a == b,
            (ColumnNotFound(a), ColumnNotFound(b)) => a == b,
            (AmbiguousColumn(a), AmbiguousColumn(b)) => a == b,
            (
                ColumnTypeMismatch {
                    column: ca,
                    expected: ea,
                    found: fa,
                },
                ColumnTypeMismatch {
                    column: cb,
                    expected: eb,
                    found: fb,
                },
            ) => ca == cb && ea == eb && fa == fb,
            (
                LengthMismatch {
                    expected: ea,
                    found: fa,
                },
                LengthMismatch {
                    expected: eb,
                    found: fb,
                },
            ) => ea == eb && fa == fb,
            (IncompatibleFrames(a), IncompatibleFrames(b)) => a == b,
            (TimeParse(a), TimeParse(b)) => a == b,
            (Reprojection(a), Reprojection(b)) => a == b,

            // Wrapped foreign errors are not comparable: same variant is enough.
            (Csv(_), Csv(_)) => true,
            (IoError(_), IoError(_)) => true,

            (MissingGeometry, MissingGeometry) => true,
            (MissingGroupKeys, MissingGroupKeys) => true,
            (TerminalPipeline, TerminalPipeline) => true,

            _ => false,
        }
    }
}
