//! Error taxonomy for the structured memory engine.
//!
//! Mirrors `spec.md` §7: per-op failures are first-class data (an `ok:
//! false` result carrying a rendered message), never exceptions that unwind
//! a batch. These types are the *typed* reasons behind that message — the
//! executor renders them with `Display` rather than matching strings.

use thiserror::Error;

use crate::path::Path;

/// Failures in locating or traversing a path against the schema (§4.C, §7
/// "Path errors").
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PathError {
    #[error("unknown top-level field '{0}'")]
    UnknownField(String),

    #[error("'{field}' does not declare property '{property}' and additionalProperties is false")]
    DisallowedProperty { field: String, property: String },

    #[error("'{0}' is not a valid array index")]
    NonIntegerIndex(String),

    #[error("cannot traverse into primitive at '{0}'")]
    TraverseIntoPrimitive(Path),

    #[error("'{0}' does not exist")]
    NotFound(Path),

    #[error("topic root cannot be targeted by this operation")]
    TopicRoot,
}

/// Failures validating a candidate value against a resolved schema step
/// (§4.D, §7 "Shape errors").
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ShapeError {
    #[error("expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("value does not match enum")]
    EnumViolation,

    #[error("value does not match const")]
    ConstViolation,

    #[error("string length {len} outside [{min:?}, {max:?}]")]
    StringLength {
        len: usize,
        min: Option<usize>,
        max: Option<usize>,
    },

    #[error("string does not match pattern '{0}'")]
    PatternMismatch(String),

    #[error("string does not match format {0:?}")]
    FormatMismatch(String),

    #[error("numeric value {value} outside declared bounds")]
    NumericBounds { value: f64 },

    #[error("value {value} is not a multiple of {multiple_of}")]
    NotMultipleOf { value: f64, multiple_of: f64 },

    #[error("array length {len} outside [{min:?}, {max:?}]")]
    ArrayLength {
        len: usize,
        min: Option<usize>,
        max: Option<usize>,
    },

    #[error("uniqueItems violated: element is structurally equal to an existing one")]
    DuplicateItem,

    #[error("missing required properties: {0:?}")]
    MissingRequired(Vec<String>),

    #[error("additionalProperties is false: unexpected key '{0}'")]
    ClosedObjectExtraKey(String),

    #[error("map has {len} entries, outside [{min:?}, {max:?}]")]
    MapSize {
        len: usize,
        min: Option<usize>,
        max: Option<usize>,
    },

    #[error("map key '{0}' does not match keyPattern")]
    KeyPatternMismatch(String),

    #[error("map already has an entry for key '{0}'")]
    DuplicateKey(String),
}

/// Topic-tree-specific failures (§7 "Topic errors").
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TopicError {
    #[error("maxDepth {max_depth} exceeded at depth {attempted}")]
    MaxDepthExceeded { max_depth: usize, attempted: usize },

    #[error("maxBreadthPerNode {max_breadth} exceeded")]
    MaxBreadthExceeded { max_breadth: usize },

    #[error("cannot mutate the topic root directly")]
    CannotTargetRoot,

    #[error("subtopic '{0}' already exists")]
    DuplicateSubtopic(String),

    #[error("invalid TopicNode literal")]
    InvalidNodeLiteral,
}

/// Failures caused by the op batch shape itself (§7 "Batch errors").
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BatchError {
    #[error("wildcard paths are not permitted on mutating actions")]
    WildcardOnMutation,

    #[error("op is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("batch must contain at least one op")]
    EmptyBatch,

    #[error("target '{0}' is not visible; add a view op first")]
    NotVisible(Path),
}

/// Failure returned by a bound DB hook (§7 "DB-binding errors").
#[derive(Debug, Clone, Error, PartialEq)]
#[error("DB binding failed for '{path}': {reason}")]
pub struct DbBindingError {
    pub path: Path,
    pub reason: String,
}

/// Master error type for all structured-memory-engine operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MemoryError {
    #[error("path error: {0}")]
    Path(#[from] PathError),

    #[error("shape error: {0}")]
    Shape(#[from] ShapeError),

    #[error("topic error: {0}")]
    Topic(#[from] TopicError),

    #[error("batch error: {0}")]
    Batch(#[from] BatchError),

    #[error("db binding error: {0}")]
    DbBinding(#[from] DbBindingError),
}

pub type MemoryResult<T> = Result<T, MemoryError>;
