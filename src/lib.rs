//! # DebateLLM
//!
//! DebateLLM is the orchestration core of a structured two-team debate between remote Large
//! Language Models: an affirmative team and a negative team argue a topic over a fixed number
//! of rounds, deliver closing summaries, and a referee model returns a structured verdict.
//!
//! The crate provides carefully layered abstractions for:
//!
//! * **Provider Flexibility**: the [`ClientWrapper`] trait implemented for OpenAI, DeepSeek,
//!   and custom OpenAI-compatible endpoints, with a [`registry::ProviderRegistry`] mapping
//!   caller-facing provider ids to credentials and models
//! * **Resilient Calls**: [`gateway::ModelCallGateway`] wraps every provider invocation in a
//!   per-attempt timeout and bounded exponential backoff, retrying only faults that are worth
//!   retrying
//! * **Caller Budgets**: [`quota::QuotaGuard`] meters successful model calls per caller token;
//!   failed calls never consume budget
//! * **Debate State**: [`DebateSession`] holds both teams' options, per-round statements, and
//!   closing summaries; phases may be replayed and individual rounds regenerated
//! * **Structured Judging**: [`verdict::parse_verdict`] extracts the referee's strict-JSON
//!   decision out of real-world completions wrapped in fences or commentary
//!
//! ## Quick Start
//!
//! Drive a full debate with the high-level [`DebateOrchestrator`]:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use debatellm::{DebateOrchestrator, Phase, Team};
//! use debatellm::quota::QuotaGuard;
//! use debatellm::registry::{ProviderConfig, ProviderRegistry, ProviderSelector};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     debatellm::init_logger();
//!
//!     let registry = Arc::new(ProviderRegistry::new(vec![ProviderConfig {
//!         id: "openai-mini".into(),
//!         provider: "openai".into(),
//!         model: "gpt-4o-mini".into(),
//!         credential: std::env::var("OPENAI_API_KEY")?,
//!         base_url: None,
//!         temperature: 0.7,
//!     }]));
//!
//!     let quota = Arc::new(QuotaGuard::new());
//!     quota.register("caller-1", 50);
//!
//!     let orchestrator = DebateOrchestrator::new(registry, quota);
//!     let session = orchestrator.new_session("Should homework be banned?");
//!     let selector = ProviderSelector::Default;
//!
//!     for team in [Team::Affirmative, Team::Negative] {
//!         orchestrator
//!             .advance(&session, Phase::TeamOptions(team), &selector, "caller-1")
//!             .await?;
//!     }
//!     for round in 0..orchestrator.config().num_rounds {
//!         for team in [Team::Affirmative, Team::Negative] {
//!             orchestrator
//!                 .advance(&session, Phase::Statement { team, round }, &selector, "caller-1")
//!                 .await?;
//!         }
//!     }
//!     for team in [Team::Affirmative, Team::Negative] {
//!         orchestrator
//!             .advance(&session, Phase::Closing(team), &selector, "caller-1")
//!             .await?;
//!     }
//!
//!     let verdict = orchestrator.judge(&session, &selector, "caller-1").await?;
//!     println!("Winner: {} ({}-{})", verdict.winner.label(),
//!         verdict.affirmative_score, verdict.negative_score);
//!     println!("Reason: {}", verdict.reason);
//!     Ok(())
//! }
//! ```
//!
//! ## Talking to a Provider Directly
//!
//! The vendor adapters are usable on their own when you only need a raw completion:
//!
//! ```rust,no_run
//! use debatellm::client_wrapper::{ClientWrapper, Message, Role};
//! use debatellm::clients::openai::OpenAIClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenAIClient::new_with_model_string(
//!         &std::env::var("OPENAI_API_KEY")?,
//!         "gpt-4o-mini",
//!     );
//!
//!     let reply = client
//!         .send_message(
//!             &[
//!                 Message { role: Role::System, content: "You are terse.".into() },
//!                 Message { role: Role::User, content: "Summarise debate club in one sentence.".into() },
//!             ],
//!             0.7,
//!         )
//!         .await?;
//!
//!     println!("{}", reply.content);
//!     Ok(())
//! }
//! ```
//!
//! Continue exploring the modules re-exported from the crate root for the lower-level pieces:
//! the retry gateway, the quota guard, the prompt assembler, and the verdict parser.

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// The helper is intentionally lightweight so that applications embedding DebateLLM can opt-in
/// to simple `RUST_LOG` driven diagnostics without having to choose a specific logging backend
/// upfront.
///
/// ```rust
/// debatellm::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::init();
    });
}

// Import the top-level `debatellm` module.
pub mod debatellm;

// Re-exporting key items for easier external access.
pub use debatellm::client_wrapper;
pub use debatellm::client_wrapper::{ClientWrapper, Message, ProviderFault, Role};
pub use debatellm::clients;
pub use debatellm::config;
pub use debatellm::config::DebateConfig;
pub use debatellm::error;
pub use debatellm::error::DebateError;
pub use debatellm::gateway;
pub use debatellm::gateway::{FaultClass, ModelCallGateway, RetryPolicy};
pub use debatellm::orchestrator;
pub use debatellm::orchestrator::{DebateOrchestrator, Phase};
pub use debatellm::prompt;
pub use debatellm::prompt::{PromptAssembler, PromptContext, PromptTemplates};
pub use debatellm::quota;
pub use debatellm::quota::{QuotaGuard, QuotaPermit, QuotaStatus};
pub use debatellm::registry;
pub use debatellm::registry::{ClientFactory, ProviderConfig, ProviderRegistry, ProviderSelector};
pub use debatellm::session;
pub use debatellm::session::{DebateSession, SessionStore, SharedSession, Team};
pub use debatellm::verdict;
pub use debatellm::verdict::{parse_verdict, parse_verdict_with_range, Verdict};
