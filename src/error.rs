//! Error handling for the ID analysis workbench
//!
//! This module defines the error taxonomy surfaced to the user and a Result
//! alias used throughout the crate. Every error is non-fatal: the engine
//! reports it through [`crate::workbench::UiHost`] and leaves project state
//! untouched.

use thiserror::Error;

use crate::types::AnalysisKind;

/// Main error type for workbench operations
#[derive(Error, Debug)]
pub enum WorkbenchError {
    /// An analysis was requested for a device that already has it
    #[error("{analysis} was already computed for '{device}'")]
    AlreadyComputed { analysis: String, device: String },

    /// The tree references a device the registry does not know
    #[error("Unknown device: '{0}'")]
    UnknownDevice(String),

    /// A rename or insert would produce a duplicate device name
    #[error("A device named '{0}' already exists")]
    NameCollision(String),

    /// A prerequisite analysis has not been computed yet
    #[error("{analysis} requires {requires} for '{device}'; compute it first")]
    MissingDependency {
        analysis: AnalysisKind,
        requires: AnalysisKind,
        device: String,
    },

    /// Vectors plotted against each other differ in length
    #[error("Cannot plot vectors of different lengths ({x_len} vs {y_len})")]
    ShapeMismatch { x_len: usize, y_len: usize },

    /// A cache entry already exists for this key
    #[error("Duplicate {kind} result for '{device}'")]
    DuplicateResult { kind: AnalysisKind, device: String },

    /// Reserved feature without a compute path
    #[error("{0} is not implemented")]
    NotImplemented(String),

    /// Errors reported by the compute service
    #[error("Compute error: {0}")]
    Compute(String),

    /// Errors while parsing measurement files
    #[error("Parse error: {0}")]
    Parse(String),

    /// Rejected analysis or model parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<WorkbenchError>,
    },
}

impl WorkbenchError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        WorkbenchError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Title of the dialog that reports this error
    pub fn title(&self) -> String {
        match self {
            WorkbenchError::AlreadyComputed { analysis, .. } => analysis.clone(),
            WorkbenchError::UnknownDevice(_) => "Unknown Device".to_string(),
            WorkbenchError::NameCollision(_) => "Name Collision".to_string(),
            WorkbenchError::MissingDependency { analysis, .. } => {
                analysis.display_name().to_string()
            }
            WorkbenchError::ShapeMismatch { .. } => "Plot".to_string(),
            WorkbenchError::DuplicateResult { kind, .. } => kind.display_name().to_string(),
            WorkbenchError::NotImplemented(_) => "Not Implemented".to_string(),
            WorkbenchError::Compute(_) => "Computation Failed".to_string(),
            WorkbenchError::Parse(_) | WorkbenchError::Io(_) => "Open File".to_string(),
            WorkbenchError::InvalidParameter(_) => "Parameters".to_string(),
            WorkbenchError::Config(_) | WorkbenchError::Serialization(_) => {
                "Configuration".to_string()
            }
            WorkbenchError::WithContext { source, .. } => source.title(),
        }
    }

    /// Innermost error, skipping context wrappers
    pub fn root(&self) -> &WorkbenchError {
        match self {
            WorkbenchError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether this is a warning about a duplicate request rather than a failure
    pub fn is_already_computed(&self) -> bool {
        matches!(self.root(), WorkbenchError::AlreadyComputed { .. })
    }
}

impl From<toml::de::Error> for WorkbenchError {
    fn from(err: toml::de::Error) -> Self {
        WorkbenchError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for WorkbenchError {
    fn from(err: toml::ser::Error) -> Self {
        WorkbenchError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for WorkbenchError {
    fn from(err: serde_json::Error) -> Self {
        WorkbenchError::Serialization(err.to_string())
    }
}

/// Result type alias for workbench operations
pub type Result<T> = std::result::Result<T, WorkbenchError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
