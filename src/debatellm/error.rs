//! Error taxonomy shared across the debate orchestration core.
//!
//! Every failure the core reports to a caller is one of the [`DebateError`]
//! variants below. Each variant carries a human-readable message, but callers
//! (and the transport layer mapping errors to HTTP responses) should
//! discriminate on [`DebateError::kind`], which is stable across releases.

use std::error::Error;
use std::fmt;

/// All failure modes surfaced by the debate orchestration core.
#[derive(Debug, Clone, PartialEq)]
pub enum DebateError {
    /// The provider selector named an id that is not in the registry, or the
    /// vendor tag of a resolved config has no adapter.
    UnknownProvider(String),
    /// A template referenced a placeholder the prompt context does not define.
    /// Carries the placeholder name.
    MissingContextField(String),
    /// The caller token was never registered with the quota guard.
    UnknownToken(String),
    /// The caller token has no remaining request budget.
    QuotaExhausted(String),
    /// The provider could not serve the request: either retries were
    /// exhausted on transient faults, or a permanent fault (bad credential,
    /// malformed request, content-policy rejection) ended the call early.
    ProviderUnavailable(String),
    /// Judging was requested before both teams had statements and closing
    /// summaries on record.
    IncompleteDebate(String),
    /// The referee's output could not be parsed into a structured verdict.
    MalformedVerdict(String),
    /// A statement phase targeted a round index outside the session's
    /// configured round count.
    RoundOutOfRange { round: usize, rounds: usize },
}

impl DebateError {
    /// Stable machine-readable identifier for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DebateError::UnknownProvider(_) => "unknown_provider",
            DebateError::MissingContextField(_) => "missing_context_field",
            DebateError::UnknownToken(_) => "unknown_token",
            DebateError::QuotaExhausted(_) => "quota_exhausted",
            DebateError::ProviderUnavailable(_) => "provider_unavailable",
            DebateError::IncompleteDebate(_) => "incomplete_debate",
            DebateError::MalformedVerdict(_) => "malformed_verdict",
            DebateError::RoundOutOfRange { .. } => "round_out_of_range",
        }
    }
}

impl fmt::Display for DebateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebateError::UnknownProvider(id) => write!(f, "unknown provider: {}", id),
            DebateError::MissingContextField(field) => {
                write!(f, "missing context field: {}", field)
            }
            DebateError::UnknownToken(token) => write!(f, "unknown token: {}", token),
            DebateError::QuotaExhausted(token) => {
                write!(f, "quota exhausted for token: {}", token)
            }
            DebateError::ProviderUnavailable(msg) => write!(f, "provider unavailable: {}", msg),
            DebateError::IncompleteDebate(msg) => write!(f, "incomplete debate: {}", msg),
            DebateError::MalformedVerdict(msg) => write!(f, "malformed verdict: {}", msg),
            DebateError::RoundOutOfRange { round, rounds } => write!(
                f,
                "round index {} out of range for a {}-round session",
                round, rounds
            ),
        }
    }
}

impl Error for DebateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct() {
        let errors = vec![
            DebateError::UnknownProvider("x".into()),
            DebateError::MissingContextField("x".into()),
            DebateError::UnknownToken("x".into()),
            DebateError::QuotaExhausted("x".into()),
            DebateError::ProviderUnavailable("x".into()),
            DebateError::IncompleteDebate("x".into()),
            DebateError::MalformedVerdict("x".into()),
            DebateError::RoundOutOfRange { round: 9, rounds: 3 },
        ];
        let mut kinds: Vec<&str> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }
}
