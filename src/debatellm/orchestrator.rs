//! The debate state machine.
//!
//! Every phase transition runs the same pipeline: validate the phase
//! against current session state, snapshot the context it needs, resolve
//! the provider, render the prompt, authorize quota, invoke the gateway,
//! and — only on success — write the artifact back and settle the quota.
//! A failed call leaves the session exactly as it was and costs no budget.
//!
//! Locks around the session are held only while snapshotting and
//! committing, never across the provider call, so independent sessions and
//! independent phases of one session proceed concurrently. Because the
//! commit re-validates the slot under the write lock, a call that was
//! abandoned by its caller and completes late cannot corrupt state: the
//! worst case is the documented last-writer-wins on a regenerated slot.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use debatellm::orchestrator::{DebateOrchestrator, Phase};
//! use debatellm::registry::{ProviderConfig, ProviderRegistry, ProviderSelector};
//! use debatellm::quota::QuotaGuard;
//! use debatellm::session::Team;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(ProviderRegistry::new(vec![ProviderConfig {
//!         id: "primary".into(),
//!         provider: "openai".into(),
//!         model: "gpt-4o-mini".into(),
//!         credential: std::env::var("OPENAI_API_KEY")?,
//!         base_url: None,
//!         temperature: 0.7,
//!     }]));
//!     let quota = Arc::new(QuotaGuard::new());
//!     quota.register("demo-token", 20);
//!
//!     let orchestrator = DebateOrchestrator::new(registry, quota);
//!     let session = orchestrator.new_session("Should homework be banned?");
//!
//!     let options = orchestrator
//!         .advance(
//!             &session,
//!             Phase::TeamOptions(Team::Affirmative),
//!             &ProviderSelector::Default,
//!             "demo-token",
//!         )
//!         .await?;
//!     println!("Affirmative options:\n{}", options);
//!     Ok(())
//! }
//! ```

use std::sync::{Arc, RwLock};

use crate::debatellm::config::DebateConfig;
use crate::debatellm::error::DebateError;
use crate::debatellm::gateway::{ModelCallGateway, RetryPolicy};
use crate::debatellm::prompt::{PromptAssembler, PromptContext, PromptTemplates};
use crate::debatellm::quota::QuotaGuard;
use crate::debatellm::registry::{ClientFactory, ProviderRegistry, ProviderSelector, VendorClientFactory};
use crate::debatellm::session::{DebateSession, SharedSession, Team};
use crate::debatellm::verdict::{parse_verdict_with_range, Verdict};

/// A generation phase a caller can request on a session. Judging is the
/// separate [`DebateOrchestrator::judge`] operation because its artifact is
/// structured rather than free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Generate a team's stated position from the topic.
    TeamOptions(Team),
    /// Generate a team's statement for an explicit round index (0-based).
    /// Targeting a filled slot overwrites it; that is how regeneration
    /// after manual editing works.
    Statement { team: Team, round: usize },
    /// Generate a team's closing summary.
    Closing(Team),
}

/// Orchestrates debate sessions across providers, prompts, and quotas.
pub struct DebateOrchestrator {
    registry: Arc<ProviderRegistry>,
    quota: Arc<QuotaGuard>,
    factory: Arc<dyn ClientFactory>,
    gateway: ModelCallGateway,
    assembler: PromptAssembler,
    config: DebateConfig,
}

impl DebateOrchestrator {
    /// Build an orchestrator over the given provider registry and quota
    /// guard, with the bundled vendor adapters and default policies.
    pub fn new(registry: Arc<ProviderRegistry>, quota: Arc<QuotaGuard>) -> Self {
        DebateOrchestrator {
            registry,
            quota,
            factory: Arc::new(VendorClientFactory),
            gateway: ModelCallGateway::new(),
            assembler: PromptAssembler::default(),
            config: DebateConfig::default(),
        }
    }

    /// Replace the client factory. Tests use this to inject scripted
    /// clients; embedders use it to add vendors.
    pub fn with_client_factory(mut self, factory: Arc<dyn ClientFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.gateway = ModelCallGateway::with_policy(policy);
        self
    }

    pub fn with_templates(mut self, templates: PromptTemplates) -> Self {
        self.assembler = PromptAssembler::new(templates);
        self
    }

    pub fn with_config(mut self, config: DebateConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DebateConfig {
        &self.config
    }

    /// Create a session with the configured round count.
    pub fn new_session(&self, topic: impl Into<String>) -> SharedSession {
        Arc::new(RwLock::new(DebateSession::new(topic, self.config.num_rounds)))
    }

    /// Run one generation phase: produce the artifact, write it into the
    /// session, and return it.
    ///
    /// On any failure the session is untouched and the caller's quota is
    /// not consumed.
    pub async fn advance(
        &self,
        session: &SharedSession,
        phase: Phase,
        selector: &ProviderSelector,
        token: &str,
    ) -> Result<String, DebateError> {
        let context = {
            let guard = session.read().unwrap();
            build_phase_context(&guard, phase)?
        };

        let provider = self.registry.resolve(selector)?.clone();
        let client = self.factory.connect(&provider)?;
        let messages = self.assembler.messages(&context)?;
        let permit = self.quota.authorize(token)?;

        log::debug!(
            "DebateOrchestrator::advance(...): phase {:?} via provider '{}' ({})",
            phase,
            provider.id,
            provider.model
        );

        match self
            .gateway
            .invoke(client.as_ref(), &messages, provider.temperature)
            .await
        {
            Ok(text) => {
                let committed = {
                    let mut guard = session.write().unwrap();
                    commit_artifact(&mut guard, phase, text.clone())
                };
                match committed {
                    Ok(()) => {
                        self.quota.commit(permit);
                        Ok(text)
                    }
                    Err(err) => {
                        self.quota.release(permit);
                        Err(err)
                    }
                }
            }
            Err(err) => {
                self.quota.release(permit);
                Err(err)
            }
        }
    }

    /// Judge the finished debate and store the structured verdict.
    ///
    /// Fails with `IncompleteDebate` unless both teams have statements on
    /// record and both closing summaries are set. Re-judging a judged
    /// session is allowed and overwrites the previous verdict.
    pub async fn judge(
        &self,
        session: &SharedSession,
        selector: &ProviderSelector,
        token: &str,
    ) -> Result<Verdict, DebateError> {
        let context = {
            let guard = session.read().unwrap();
            ensure_judgeable(&guard)?;
            build_judge_context(&guard)
        };

        let provider = self.registry.resolve(selector)?.clone();
        let client = self.factory.connect(&provider)?;
        let messages = self.assembler.messages(&context)?;
        let permit = self.quota.authorize(token)?;

        let raw = match self
            .gateway
            .invoke(client.as_ref(), &messages, provider.temperature)
            .await
        {
            Ok(raw) => {
                // The provider served the logical request; the verdict may
                // still fail to parse, but the quota unit is spent.
                self.quota.commit(permit);
                raw
            }
            Err(err) => {
                self.quota.release(permit);
                return Err(err);
            }
        };

        let verdict = parse_verdict_with_range(&raw, self.config.score_min, self.config.score_max)?;

        {
            let mut guard = session.write().unwrap();
            // A session reset while the call was in flight must not gain a
            // verdict for a debate that no longer exists.
            ensure_judgeable(&guard)?;
            guard.set_verdict(verdict.clone());
        }

        log::info!(
            "DebateOrchestrator::judge(...): winner={} scores={}/{}",
            verdict.winner.label(),
            verdict.affirmative_score,
            verdict.negative_score
        );
        Ok(verdict)
    }
}

/// Snapshot the context a generation phase needs, validating its
/// preconditions against current state.
fn build_phase_context(session: &DebateSession, phase: Phase) -> Result<PromptContext, DebateError> {
    match phase {
        Phase::TeamOptions(team) => Ok(PromptContext::TopicGeneration {
            topic: session.topic().to_string(),
            stance: team,
        }),
        Phase::Statement { team, round } => {
            let rounds = session.rounds();
            if round >= rounds {
                return Err(DebateError::RoundOutOfRange { round, rounds });
            }
            Ok(PromptContext::Statement {
                team,
                topic: session.topic().to_string(),
                options: session.team(team).options.clone(),
                own_statements: session.team(team).filled_statements(),
                opponent_statements: session.team(team.opponent()).filled_statements(),
            })
        }
        Phase::Closing(team) => Ok(PromptContext::Closing {
            team,
            topic: session.topic().to_string(),
            options: session.team(team).options.clone(),
            opponent_options: session.team(team.opponent()).options.clone(),
            own_statements: session.team(team).filled_statements(),
            opponent_statements: session.team(team.opponent()).filled_statements(),
        }),
    }
}

/// Write a successful phase artifact into its session slot. Runs under the
/// session's write lock and re-validates the slot, so a stale call cannot
/// write into a session whose shape changed.
fn commit_artifact(
    session: &mut DebateSession,
    phase: Phase,
    text: String,
) -> Result<(), DebateError> {
    match phase {
        Phase::TeamOptions(team) => {
            session.team_mut(team).options = text;
            Ok(())
        }
        Phase::Statement { team, round } => session.team_mut(team).set_statement(round, text),
        Phase::Closing(team) => {
            session.team_mut(team).final_summary = Some(text);
            Ok(())
        }
    }
}

/// Judging preconditions: statements and a closing summary on record for
/// both teams.
fn ensure_judgeable(session: &DebateSession) -> Result<(), DebateError> {
    for team in [Team::Affirmative, Team::Negative].iter().copied() {
        let context = session.team(team);
        if !context.has_statements() {
            return Err(DebateError::IncompleteDebate(format!(
                "{} team has no statements",
                team.label()
            )));
        }
        let summary_set = context
            .final_summary
            .as_ref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false);
        if !summary_set {
            return Err(DebateError::IncompleteDebate(format!(
                "{} team has no closing summary",
                team.label()
            )));
        }
    }
    Ok(())
}

/// Snapshot the full transcript for the referee.
fn build_judge_context(session: &DebateSession) -> PromptContext {
    PromptContext::Judge {
        topic: session.topic().to_string(),
        affirmative_options: session.team(Team::Affirmative).options.clone(),
        negative_options: session.team(Team::Negative).options.clone(),
        affirmative_statements: session.team(Team::Affirmative).filled_statements(),
        negative_statements: session.team(Team::Negative).filled_statements(),
        affirmative_summary: session
            .team(Team::Affirmative)
            .final_summary
            .clone()
            .unwrap_or_default(),
        negative_summary: session
            .team(Team::Negative)
            .final_summary
            .clone()
            .unwrap_or_default(),
    }
}
