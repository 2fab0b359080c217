//! Domain error types
//!
//! This module defines the error hierarchy for pimbridge. Each pipeline phase
//! has its own error type so the coordinator can map a failure to the matching
//! journal status. All errors are domain-specific and don't expose third-party
//! types.

use thiserror::Error;

/// Main pimbridge error type
///
/// This is the primary error type used throughout the application.
/// It wraps the phase and collaborator errors and provides context for error handling.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Journal errors
    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),

    /// Extraction phase errors
    #[error("Extract error: {0}")]
    Extract(#[from] ExtractError),

    /// Transform phase errors
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Load phase errors
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Staging store errors
    #[error("Staging store error: {0}")]
    Store(#[from] StoreError),

    /// Source API errors
    #[error("Source API error: {0}")]
    Source(#[from] SourceError),

    /// Target API errors
    #[error("Target API error: {0}")]
    Target(#[from] TargetError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Staging store errors
///
/// Raised by any implementation of the four staging primitives.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect to the store
    #[error("Failed to connect to staging store: {0}")]
    ConnectionFailed(String),

    /// A read (find or aggregate) failed
    #[error("Query on collection '{collection}' failed: {message}")]
    QueryFailed { collection: String, message: String },

    /// A write (replace or bulk insert) failed
    #[error("Write to collection '{collection}' failed: {message}")]
    WriteFailed { collection: String, message: String },

    /// A stored document could not be decoded
    #[error("Invalid document in collection '{collection}': {message}")]
    InvalidDocument { collection: String, message: String },
}

/// Source (PIM) API errors
///
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to connect to the source API
    #[error("Failed to connect to source API: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Non-success HTTP status
    #[error("Request to {url} failed with status {status}: {message}")]
    RequestFailed {
        url: String,
        status: u16,
        message: String,
    },

    /// Invalid response body
    #[error("Invalid response from source API: {0}")]
    InvalidResponse(String),

    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl SourceError {
    /// Transport-level failures worth retrying; HTTP errors are not
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ConnectionFailed(_) | Self::Timeout(_))
    }
}

/// Target (commerce platform) API errors
#[derive(Debug, Error)]
pub enum TargetError {
    /// Failed to connect to the target API
    #[error("Failed to connect to target API: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Non-success HTTP status
    #[error("Submission failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    /// The target answered but rejected the batch
    #[error("Submission rejected: {0}")]
    Rejected(String),

    /// Invalid response body
    #[error("Invalid response from target API: {0}")]
    InvalidResponse(String),
}

/// Journal errors
#[derive(Debug, Error)]
pub enum JournalError {
    /// A terminal status was already recorded for this run
    #[error("Run {run_id} already finished with status {status}")]
    AlreadyFinished { run_id: String, status: String },

    /// RUNNING is not a terminal status
    #[error("Status {0} is not a terminal status")]
    NotTerminal(String),

    /// Journal storage failed
    #[error("Journal storage failed: {0}")]
    Storage(#[from] StoreError),

    /// A stored journal record could not be decoded
    #[error("Corrupt journal record: {0}")]
    Corrupt(String),
}

/// Extraction phase errors
///
/// Any of these aborts the whole extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Fetching a resource (or one of its pages) failed
    #[error("Failed to fetch {resource}: {source}")]
    Fetch {
        resource: String,
        #[source]
        source: SourceError,
    },

    /// Replacing a staging collection failed
    #[error("Failed to stage {collection}: {source}")]
    Staging {
        collection: String,
        #[source]
        source: StoreError,
    },

    /// Reading wave-1 output to parameterize wave 2 failed
    #[error("Failed to read parents from {collection}: {source}")]
    Parents {
        collection: String,
        #[source]
        source: StoreError,
    },

    /// An extraction task panicked or was cancelled
    #[error("Extraction task for {resource} aborted: {message}")]
    TaskAborted { resource: String, message: String },
}

/// Transform phase errors
#[derive(Debug, Error)]
pub enum TransformError {
    /// A staged document lacks a field the mapping requires
    #[error("Pass '{pass}': document is missing required field '{field}'")]
    MissingField { pass: String, field: String },

    /// A staged field has an unexpected shape
    #[error("Pass '{pass}': field '{field}' is malformed: {message}")]
    MalformedField {
        pass: String,
        field: String,
        message: String,
    },

    /// Reading staging or ledger collections failed
    #[error("Pass '{pass}': {source}")]
    Store {
        pass: String,
        #[source]
        source: StoreError,
    },
}

/// Load phase errors
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the event log failed
    #[error("Failed to read event log: {0}")]
    EventLog(StoreError),

    /// A logged event could not be decoded
    #[error("Invalid event in log '{collection}': {message}")]
    InvalidEvent { collection: String, message: String },

    /// Downstream submission failed
    #[error("Submission failed: {0}")]
    Submission(#[from] TargetError),

    /// The target acknowledged a different number of events than submitted
    #[error("Submission mismatch: submitted {submitted} events, target acknowledged {acknowledged}")]
    Mismatch {
        submitted: usize,
        acknowledged: usize,
    },

    /// Appending to the ledger failed after a successful submission
    #[error("Failed to record submitted events in ledger: {0}")]
    Ledger(StoreError),
}

// Conversion from std::io::Error
impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::Configuration(format!("TOML parse error: {err}"))
    }
}
