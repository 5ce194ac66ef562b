//! Error types for the todo list client and store

use crate::types::Intent;
use tasklist_runtime::StoreError;
use thiserror::Error;

/// Errors returned by a [`TodoApi`](crate::api::TodoApi) implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The remote answered with a non-success status
    #[error("Remote returned status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The response body was not the expected JSON
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),
}

/// Errors raised while loading client configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable held an unparsable value
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name
        key: String,
        /// Raw value
        value: String,
    },

    /// The base URL cannot address a collection
    #[error("Invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl {
        /// Raw URL
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// The HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Errors returned by the [`TodoStore`](crate::store::TodoStore) intent methods
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    /// The intent settled as a failure; the message is also in `last_error`
    #[error("{0}")]
    Rejected(String),

    /// The store could not deliver the settlement
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The settlement did not belong to the intent that was sent
    #[error("Unexpected settlement for {0} intent")]
    UnexpectedSettlement(Intent),
}
