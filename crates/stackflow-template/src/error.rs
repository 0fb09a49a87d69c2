//! Template composition error types

use thiserror::Error;

/// Which template map a colliding name was inserted into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Resource,
    Output,
}

impl std::fmt::Display for NameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameKind::Resource => write!(f, "resource"),
            NameKind::Output => write!(f, "output"),
        }
    }
}

/// Errors raised while composing or building a template.
///
/// All of these surface before any remote call is made.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Invalid composition: {0}")]
    Composition(String),

    #[error("Invalid CIDR: {0}")]
    InvalidCidr(String),

    #[error("Address block {block} is too small: required {required} addresses, available {available}")]
    InsufficientAddresses {
        block: String,
        required: u64,
        available: u64,
    },

    #[error("Address block {block} is not within any approved range ({approved})")]
    UnapprovedRange { block: String, approved: String },

    #[error("Unsupported region: {0}")]
    UnsupportedRegion(String),

    #[error("Distributor error: {0}")]
    Distributor(String),

    #[error("Name collision: {kind} '{name}' is already defined in the template")]
    NameCollision { kind: NameKind, name: String },

    #[error("Transform conflict: template already uses '{existing}', composition requires '{requested}'")]
    TransformConflict { existing: String, requested: String },

    #[error("Unknown resource handle: {0}")]
    UnknownHandle(usize),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
