use papertrail_core_types::RequestId;
use thiserror::Error;

/// Result type alias using PaperTrailError
pub type Result<T> = std::result::Result<T, PaperTrailError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used in logs, CLI output and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input / schema
    InvalidInput,
    InvalidSchema,
    InvalidPattern,
    InvalidConfig,
    NotFound,

    // Diff
    DepthExceeded,

    // Review workflow
    InvalidTransition,
    UnknownFieldPath,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    ExternalService,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidSchema => "ERR_INVALID_SCHEMA",
            ExErrorKind::InvalidPattern => "ERR_INVALID_PATTERN",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::DepthExceeded => "ERR_DEPTH_EXCEEDED",
            ExErrorKind::InvalidTransition => "ERR_INVALID_TRANSITION",
            ExErrorKind::UnknownFieldPath => "ERR_UNKNOWN_FIELD_PATH",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus the audit
/// context (content type, record, trail, diff path) needed to debug a failure
/// from a single log line.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    content_type: Option<String>,
    record_id: Option<String>,
    trail_id: Option<String>,
    path: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            content_type: None,
            record_id: None,
            trail_id: None,
            path: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add content-type uid context
    pub fn with_content_type(mut self, uid: impl Into<String>) -> Self {
        self.content_type = Some(uid.into());
        self
    }

    /// Add record id context
    pub fn with_record_id(mut self, id: impl Into<String>) -> Self {
        self.record_id = Some(id.into());
        self
    }

    /// Add trail id context
    pub fn with_trail_id(mut self, id: impl Into<String>) -> Self {
        self.trail_id = Some(id.into());
        self
    }

    /// Add dotted content path context (e.g. `blocks.2.title`)
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    pub fn trail_id(&self) -> Option<&str> {
        self.trail_id.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(uid) = &self.content_type {
            write!(f, " (content_type: {})", uid)?;
        }
        if let Some(id) = &self.record_id {
            write!(f, " (record_id: {})", id)?;
        }
        if let Some(id) = &self.trail_id {
            write!(f, " (trail_id: {})", id)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(source) = &self.source {
            write!(f, " <- {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for the change-detection pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaperTrailError {
    /// No content-type schema registered under this uid
    #[error("Schema not found: {uid}")]
    SchemaNotFound { uid: String },

    /// A component or dynamic-zone attribute points at an unregistered component
    #[error("Component schema not found: {uid}")]
    ComponentNotFound { uid: String },

    /// Attribute declaration could not be interpreted
    #[error("Invalid attribute {attribute}: {reason}")]
    InvalidAttribute { attribute: String, reason: String },

    /// Trail record not found in the store
    #[error("Trail not found: {trail_id}")]
    TrailNotFound { trail_id: String },

    /// Content nesting is deeper than the configured diff limit
    #[error("Diff depth {max_depth} exceeded at {path}")]
    DepthExceeded { path: String, max_depth: usize },

    /// A configured path pattern is not a valid regular expression
    #[error("Invalid path pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Review status change not permitted from the current status
    #[error("Trail {trail_id} cannot move from {from} to {to}")]
    InvalidReviewTransition {
        trail_id: String,
        from: String,
        to: String,
    },

    /// A field comment targets a path that is not part of the change set
    #[error("Trail {trail_id} has no changed field at {path}")]
    UnknownFieldPath { trail_id: String, path: String },

    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<PaperTrailError> for ExError {
    fn from(err: PaperTrailError) -> Self {
        let message = err.to_string();
        match err {
            PaperTrailError::SchemaNotFound { uid } => ExError::new(ExErrorKind::NotFound)
                .with_content_type(uid)
                .with_message(message),

            PaperTrailError::ComponentNotFound { uid } => ExError::new(ExErrorKind::InvalidSchema)
                .with_content_type(uid)
                .with_message(message),

            PaperTrailError::InvalidAttribute { attribute, .. } => {
                ExError::new(ExErrorKind::InvalidSchema)
                    .with_path(attribute)
                    .with_message(message)
            }

            PaperTrailError::TrailNotFound { trail_id } => ExError::new(ExErrorKind::NotFound)
                .with_trail_id(trail_id)
                .with_message(message),

            PaperTrailError::DepthExceeded { path, .. } => {
                ExError::new(ExErrorKind::DepthExceeded)
                    .with_op("diff")
                    .with_path(path)
                    .with_message(message)
            }

            PaperTrailError::InvalidPattern { .. } => {
                ExError::new(ExErrorKind::InvalidPattern).with_message(message)
            }

            PaperTrailError::InvalidReviewTransition { trail_id, .. } => {
                ExError::new(ExErrorKind::InvalidTransition)
                    .with_trail_id(trail_id)
                    .with_message(message)
            }

            PaperTrailError::UnknownFieldPath { trail_id, path } => {
                ExError::new(ExErrorKind::UnknownFieldPath)
                    .with_trail_id(trail_id)
                    .with_path(path)
                    .with_message(message)
            }

            PaperTrailError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            PaperTrailError::Internal { .. } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for PaperTrailError {
    fn from(err: serde_json::Error) -> Self {
        PaperTrailError::Serialization {
            message: err.to_string(),
        }
    }
}
