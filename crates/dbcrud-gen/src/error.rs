//! Error types for the model compiler.
//!
//! Every variant is fatal: a run that hits one writes nothing.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for generator operations
pub type GenResult<T> = Result<T, GenError>;

#[derive(Debug, Error)]
pub enum GenError {
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: syn::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Config(String),

    /// A named field type with no declaration in the collected sources
    #[error("{entity}.{field}: cannot resolve type `{ty}`")]
    UnresolvedType {
        entity: String,
        field: String,
        ty: String,
    },

    /// A named type whose target is itself a named type
    #[error(
        "{entity}.{field}: `{ty}` refers to another named type `{target}`; only one level of indirection is supported"
    )]
    AliasChain {
        entity: String,
        field: String,
        ty: String,
        target: String,
    },

    #[error("{entity}.{field}: no conversion from rust type `{ty}` to a SQL column type")]
    NoSqlMapping {
        entity: String,
        field: String,
        ty: String,
    },

    #[error("{entity}.{field}: invalid column type override `{text}`: {reason}")]
    InvalidOverride {
        entity: String,
        field: String,
        text: String,
        reason: String,
    },

    #[error("{entity}: no identity field (expected `{identity}` or a field marked #[dbcrud(id)])")]
    MissingIdentity { entity: String, identity: String },

    #[error("{entity}: both `{first}` and `{second}` are marked #[dbcrud(id)]")]
    DuplicateIdentity {
        entity: String,
        first: String,
        second: String,
    },

    #[error("{entity}.{field}: identity must be i32 or i64, found `{ty}`")]
    IdentityNotInteger {
        entity: String,
        field: String,
        ty: String,
    },

    #[error("`{name}` is listed as an entity but is not a struct with named fields")]
    NotAStruct { name: String },
}

impl GenError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// The entity the error was raised for, when it belongs to one.
    pub fn entity(&self) -> Option<&str> {
        match self {
            Self::UnresolvedType { entity, .. }
            | Self::AliasChain { entity, .. }
            | Self::NoSqlMapping { entity, .. }
            | Self::InvalidOverride { entity, .. }
            | Self::MissingIdentity { entity, .. }
            | Self::DuplicateIdentity { entity, .. }
            | Self::IdentityNotInteger { entity, .. } => Some(entity),
            Self::NotAStruct { name } => Some(name),
            Self::Parse { .. } | Self::Io { .. } | Self::Config(_) => None,
        }
    }
}
