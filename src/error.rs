//! Error types for the edge agent.
//!
//! Everything except `StartupTimeout` is local to a single tick: it is
//! logged and the next tick starts clean.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    /// Building the bearer token failed
    #[error("token generation failed: {0}")]
    Token(#[from] crate::token::TokenError),

    /// Encoding the upload payload failed
    #[error("payload serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// HTTP client could not be constructed
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote store never answered within the startup budget
    #[error("remote store not reachable after {minutes} minute(s)")]
    StartupTimeout { minutes: u64 },
}

pub type Result<T> = std::result::Result<T, AgentError>;
