//! Error types for interface model construction

use thiserror::Error;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Coarse classification of a [`ModelError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input could not be parsed at all; fatal for the whole document
    MalformedDocument,
    /// A required element, attribute, or deployment record is absent or invalid
    Structural,
    /// Type resolution reached a fixpoint with names still missing
    UnresolvableReference,
}

/// Error type for model construction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The input text is not well-formed XML
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// An element that must carry a SHORT-NAME has none
    #[error("missing SHORT-NAME in {context}")]
    MissingShortName { context: String },

    /// An argument, event, or field has no type reference
    #[error("{interface} - {member}: no type reference")]
    MissingTypeReference { interface: String, member: String },

    /// No package override was given and the interface declares no namespace
    #[error("{interface}: no package given and no namespace in the document")]
    MissingPackage { interface: String },

    /// No deployment record exists for the interface
    #[error("{interface}: no matching SOME/IP service interface deployment")]
    MissingDeployment { interface: String },

    /// The deployment record lacks a major or minor version
    #[error("{interface}: {which} version not specified")]
    MissingVersion { interface: String, which: String },

    /// The deployment record lacks a service interface id
    #[error("{interface}: no service interface id specified")]
    MissingServiceId { interface: String },

    /// A member declares a capability whose deployment sub-record is absent
    #[error("{interface} - {member}: {capability} declared but not deployed")]
    MissingMemberDeployment {
        interface: String,
        member: String,
        capability: String,
    },

    /// A deployment sub-record lacks its numeric identifier
    #[error("{interface} - {member}: no {what} specified")]
    MissingId {
        interface: String,
        member: String,
        what: String,
    },

    /// A provided instance lacks SERVICE-INSTANCE-ID
    #[error("{interface} - {instance}: no SERVICE-INSTANCE-ID specified")]
    MissingInstanceId { interface: String, instance: String },

    /// A numeric field could not be parsed or does not fit its target width
    #[error("{context}: invalid number '{text}'")]
    InvalidNumber { context: String, text: String },

    /// An event or notifier id collides with the event range once offset
    #[error("{interface} - {member}: id {id} does not fit the event id range")]
    EventIdOutOfRange {
        interface: String,
        member: String,
        id: u16,
    },

    /// A method matches different deployment records by name and by reference
    #[error("{interface} - {method}: conflicting method deployments {candidates:?}")]
    AmbiguousMethodDeployment {
        interface: String,
        method: String,
        candidates: Vec<String>,
    },

    /// Names still referenced after resolution stopped making progress
    #[error("{interface}: unresolvable reference(s): {}", .names.join(", "))]
    UnresolvableReference {
        interface: String,
        names: Vec<String>,
    },
}

impl ModelError {
    /// Returns the coarse kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::MalformedDocument(_) => ErrorKind::MalformedDocument,
            ModelError::UnresolvableReference { .. } => ErrorKind::UnresolvableReference,
            _ => ErrorKind::Structural,
        }
    }

    /// Returns the interface this error is attributed to, when known
    pub fn interface(&self) -> Option<&str> {
        match self {
            ModelError::MalformedDocument(_)
            | ModelError::MissingShortName { .. }
            | ModelError::InvalidNumber { .. } => None,
            ModelError::MissingTypeReference { interface, .. }
            | ModelError::MissingPackage { interface }
            | ModelError::MissingDeployment { interface }
            | ModelError::MissingVersion { interface, .. }
            | ModelError::MissingServiceId { interface }
            | ModelError::MissingMemberDeployment { interface, .. }
            | ModelError::MissingId { interface, .. }
            | ModelError::MissingInstanceId { interface, .. }
            | ModelError::EventIdOutOfRange { interface, .. }
            | ModelError::AmbiguousMethodDeployment { interface, .. }
            | ModelError::UnresolvableReference { interface, .. } => Some(interface),
        }
    }

    /// Returns a stable numeric code, used as the process exit status offset
    pub fn error_code(&self) -> u32 {
        match self.kind() {
            ErrorKind::MalformedDocument => 1,
            ErrorKind::Structural => 2,
            ErrorKind::UnresolvableReference => 3,
        }
    }
}
