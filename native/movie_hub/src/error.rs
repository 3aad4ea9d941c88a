use std::error::Error as _;

use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failures of catalog requests and controller operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The request URL could not be built. Never happens with a valid base URL.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Transport error or non-success HTTP status.
    #[error("Network failure: {0}")]
    Network(String),
    /// The response body does not match the expected schema.
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Index {index} is out of bounds for {len} movies")]
    IndexOutOfBounds { index: usize, len: usize },
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        // The URL carries the API key
        let e = e.without_url();
        let message = error_chain(&e);
        if e.is_builder() {
            CatalogError::InvalidRequest(message)
        } else if e.is_decode() {
            CatalogError::Decode(message)
        } else {
            CatalogError::Network(message)
        }
    }
}

/// `e` followed by all of its sources, separated by `": "`.
fn error_chain(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
