//! Edge agent for a refrigerated truck.
//!
//! Each tick simulates the cargo-hold sensors, averages them and posts the
//! average to a PostgREST store with a freshly signed bearer token.

pub mod agent;
pub mod aggregate;
pub mod config;
pub mod error;
pub mod probe;
pub mod simulator;
pub mod token;
pub mod types;
pub mod upload;

pub use agent::Agent;
pub use config::Config;
pub use error::{AgentError, Result};
