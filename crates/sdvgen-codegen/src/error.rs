//! Error types for bridge and IDL generation

use thiserror::Error;

/// Result type alias for generation
pub type CodegenResult<T> = Result<T, CodegenError>;

/// Error type for generation.
///
/// Every variant is local to one member or one generated class; the
/// assembler records it and keeps generating the rest of the interface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    /// A type reached the marshaling engine without a supported shape
    #[error("{member}: '{field}' has unsupported type '{type_name}'")]
    Unsupported {
        member: String,
        field: String,
        type_name: String,
    },

    /// A composite name classified as struct or map but has no definition
    #[error("{member}: no definition for '{type_name}'")]
    MissingDefinition { member: String, type_name: String },
}

impl CodegenError {
    /// Member or class the error belongs to
    pub fn member(&self) -> &str {
        match self {
            CodegenError::Unsupported { member, .. } | CodegenError::MissingDefinition { member, .. } => member,
        }
    }
}
