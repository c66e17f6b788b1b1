//! Error types for the Routemaster API client.
//!
//! # Design
//! The domain variants (`UnknownStateMachine`, `UnknownLabel`, `DeletedLabel`,
//! `LabelAlreadyExists`) carry the identity the caller asked about, so business
//! logic can match on them directly. Every other non-2xx response lands in
//! `Http` with the raw status code and body.
//!
//! `DeletedLabel` refines `UnknownLabel`: use [`ApiError::is_unknown_label`]
//! when "never existed" and "soft-deleted" should be handled alike.

use crate::types::{LabelRef, StateMachine};

/// Errors returned by `RoutemasterClient` parse methods and `RoutemasterApi`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The named state machine does not exist on the server.
    #[error("unknown state machine: {0}")]
    UnknownStateMachine(StateMachine),

    /// The label does not exist within its state machine.
    #[error("unknown label: {0}")]
    UnknownLabel(LabelRef),

    /// The label existed but has been soft-deleted (HTTP 410).
    #[error("deleted label: {0}")]
    DeletedLabel(LabelRef),

    /// A create was attempted for a label that already exists (HTTP 409).
    #[error("label already exists: {0}")]
    LabelAlreadyExists(LabelRef),

    /// The server returned a non-2xx status not mapped by the operation.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The base URL is unusable, or an endpoint URL could not be built from it.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The transport failed before a response was received.
    #[error("transport failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Client configuration could not be read.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// True for both `UnknownLabel` and its refinement `DeletedLabel`.
    pub fn is_unknown_label(&self) -> bool {
        matches!(self, ApiError::UnknownLabel(_) | ApiError::DeletedLabel(_))
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, ApiError::DeletedLabel(_))
    }

    /// The label carried by a label-level domain error.
    pub fn label(&self) -> Option<&LabelRef> {
        match self {
            ApiError::UnknownLabel(label)
            | ApiError::DeletedLabel(label)
            | ApiError::LabelAlreadyExists(label) => Some(label),
            _ => None,
        }
    }

    pub fn state_machine(&self) -> Option<&StateMachine> {
        match self {
            ApiError::UnknownStateMachine(state_machine) => Some(state_machine),
            _ => None,
        }
    }

    /// HTTP status of a generic failure. Domain errors return `None`.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
