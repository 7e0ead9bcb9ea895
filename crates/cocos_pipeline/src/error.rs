//! Error types for the processing pipeline.
//!
//! Only validation failures travel as Rust errors. Network-origin failures are
//! carried inside [`ApiResponse`](crate::ApiResponse) with `success: false` and
//! never surface here.

/// A request was rejected before it reached the editor.
///
/// Raised by validators, and deliberately by preprocessors when a precondition
/// is known to be violated (a reparent cycle, an unknown asset path). Always
/// fatal to the current invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{module}/{action}] {field}: {message}")]
pub struct ValidationError {
    pub module: String,
    pub action: String,
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(
        module: impl Into<String>,
        action: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            action: action.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors surfaced by a pipeline-routed invocation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    /// A validator or preprocessor rejected the request
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The module/action pair is not known to the editor
    #[error("Invalid module or action: {module} {action} (available: {available})")]
    UnknownAction {
        module: String,
        action: String,
        available: String,
    },
}

impl PipelineError {
    /// Returns the validation payload, if this is a validation failure.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            PipelineError::Validation(err) => Some(err),
            PipelineError::UnknownAction { .. } => None,
        }
    }
}

/// Malformed identifier text handed to the codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// Input length matches none of the supported forms
    #[error("Unsupported identifier length {length}: {input}")]
    InvalidLength { input: String, length: usize },

    /// Input contains a character outside the form's alphabet
    #[error("Invalid character in identifier: {0}")]
    InvalidCharacter(String),

    /// Input is 36 characters long but not hyphenated hexadecimal
    #[error("Malformed canonical identifier: {0}")]
    InvalidCanonical(String),
}

/// A node-type table that cannot be expanded safely.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeTypeTableError {
    /// Child specifications loop back to a type already being expanded
    #[error("Node type expansion cycle: {0}")]
    Cycle(String),
}
