// src/debatellm/mod.rs

pub mod client_wrapper;
pub mod clients;
pub mod config;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod prompt;
pub mod quota;
pub mod registry;
pub mod session;
pub mod verdict;

// Export the main entry points so callers reach them as
// debatellm::DebateOrchestrator instead of debatellm::orchestrator::DebateOrchestrator.
pub use orchestrator::{DebateOrchestrator, Phase};
pub use session::{DebateSession, SessionStore, SharedSession, Team};
