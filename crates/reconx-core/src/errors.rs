use crate::facts::DocumentKind;
use reconx_core_types::RunId;
use thiserror::Error;

/// Result type alias using ReconError
pub type Result<T> = std::result::Result<T, ReconError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and the JSON report emitted by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    InvalidSettings,

    // Document lifecycle
    Parse,
    AnchorNotFound,
    FactApplication,
    Serialization,

    // Integration/IO
    Io,
    Persistence,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidSettings => "ERR_INVALID_SETTINGS",
            ExErrorKind::Parse => "ERR_PARSE",
            ExErrorKind::AnchorNotFound => "ERR_ANCHOR_NOT_FOUND",
            ExErrorKind::FactApplication => "ERR_FACT_APPLICATION",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling and optional
/// context about which document and operation failed.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    document: Option<DocumentKind>,
    path: Option<String>,
    fact: Option<String>,
    run_id: Option<RunId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            document: None,
            path: None,
            fact: None,
            run_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add document kind context
    pub fn with_document(mut self, document: DocumentKind) -> Self {
        self.document = Some(document);
        self
    }

    /// Add document path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add fact context
    pub fn with_fact(mut self, fact: impl Into<String>) -> Self {
        self.fact = Some(fact.into());
        self
    }

    /// Add run ID context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
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

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the document kind context, if any
    pub fn document(&self) -> Option<DocumentKind> {
        self.document
    }

    /// Get the document path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the fact context, if any
    pub fn fact(&self) -> Option<&str> {
        self.fact.as_deref()
    }

    /// Get the run ID context, if any
    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
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
        if let Some(document) = &self.document {
            write!(f, " (document: {})", document)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(fact) = &self.fact {
            write!(f, " (fact: {})", fact)?;
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

/// Error taxonomy for reconciliation operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconError {
    /// The document could not be read from disk
    #[error("Failed to load {path}: {reason}")]
    Load { path: String, reason: String },

    /// The document bytes are not a well-formed document of the expected kind
    #[error("Malformed {document} document: {reason}")]
    Parse {
        document: DocumentKind,
        reason: String,
    },

    /// No element satisfied the anchor predicate
    #[error("Anchor not found in {document} document: no element matched {predicate}")]
    AnchorNotFound {
        document: DocumentKind,
        predicate: String,
    },

    /// A single fact could not be applied; the remaining facts still run
    #[error("Could not apply {fact}: {reason}")]
    FactApplication { fact: String, reason: String },

    /// The mutated document could not be serialized
    #[error("Failed to serialize {document} document: {reason}")]
    Serialize {
        document: DocumentKind,
        reason: String,
    },

    /// The serialized document could not be written back
    #[error("Failed to persist {path}: {reason}")]
    Persist { path: String, reason: String },

    /// Settings failed validation
    #[error("Invalid settings: {reason}")]
    InvalidSettings { reason: String },
}

impl ReconError {
    /// Convenience constructor for per-fact failures
    pub fn fact(fact: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        ReconError::FactApplication {
            fact: fact.to_string(),
            reason: reason.into(),
        }
    }
}

/// Conversion from ReconError to the canonical ExError
impl From<ReconError> for ExError {
    fn from(err: ReconError) -> Self {
        match err {
            ReconError::Load { path, reason } => ExError::new(ExErrorKind::Io)
                .with_op("load_document")
                .with_path(path)
                .with_message(reason),

            ReconError::Parse { document, reason } => ExError::new(ExErrorKind::Parse)
                .with_op("parse_document")
                .with_document(document)
                .with_message(reason),

            ReconError::AnchorNotFound {
                document,
                predicate,
            } => ExError::new(ExErrorKind::AnchorNotFound)
                .with_op("locate_anchor")
                .with_document(document)
                .with_message(format!("no element matched {}", predicate)),

            ReconError::FactApplication { fact, reason } => {
                ExError::new(ExErrorKind::FactApplication)
                    .with_op("apply_fact")
                    .with_fact(fact)
                    .with_message(reason)
            }

            ReconError::Serialize { document, reason } => {
                ExError::new(ExErrorKind::Serialization)
                    .with_op("serialize_document")
                    .with_document(document)
                    .with_message(reason)
            }

            ReconError::Persist { path, reason } => ExError::new(ExErrorKind::Persistence)
                .with_op("persist_document")
                .with_path(path)
                .with_message(reason),

            ReconError::InvalidSettings { reason } => {
                ExError::new(ExErrorKind::InvalidSettings)
                    .with_op("load_settings")
                    .with_message(reason)
            }
        }
    }
}
