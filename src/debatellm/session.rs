//! Session state for one debate: both teams' accumulated positions and the
//! judge's result.
//!
//! A session is created when the first request for a topic arrives, lives in
//! memory for the duration of the calling process, and is never persisted.
//! The statement history is a fixed-length sequence of slots sized to the
//! configured round count; slots fill by explicit round index and may be
//! overwritten to support manual editing followed by regeneration.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::debatellm::error::DebateError;
use crate::debatellm::verdict::Verdict;

/// One side of the debate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Affirmative,
    Negative,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Affirmative => Team::Negative,
            Team::Negative => Team::Affirmative,
        }
    }

    /// Lowercase label used in prompts and verdicts.
    pub fn label(self) -> &'static str {
        match self {
            Team::Affirmative => "affirmative",
            Team::Negative => "negative",
        }
    }
}

/// One team's accumulated state.
#[derive(Debug, Clone)]
pub struct TeamContext {
    /// The team's stated position, mutable until the debate settles around
    /// it. Filled by the options phase or edited directly by the caller.
    pub options: String,
    /// Per-round statements. Length is fixed at session creation.
    statements: Vec<Option<String>>,
    /// Closing summary, set by the closing phase.
    pub final_summary: Option<String>,
}

impl TeamContext {
    fn with_rounds(rounds: usize) -> Self {
        TeamContext {
            options: String::new(),
            statements: vec![None; rounds],
            final_summary: None,
        }
    }

    /// Number of statement slots, equal to the session's round count.
    pub fn rounds(&self) -> usize {
        self.statements.len()
    }

    /// The statement filled into `round` (0-based), if any.
    pub fn statement(&self, round: usize) -> Option<&str> {
        self.statements.get(round).and_then(|s| s.as_deref())
    }

    /// Write a statement into an explicit round slot. Overwriting a filled
    /// slot is allowed; an index beyond the configured round count is not.
    pub fn set_statement(&mut self, round: usize, text: String) -> Result<(), DebateError> {
        let rounds = self.statements.len();
        match self.statements.get_mut(round) {
            Some(slot) => {
                *slot = Some(text);
                Ok(())
            }
            None => Err(DebateError::RoundOutOfRange { round, rounds }),
        }
    }

    /// Every filled statement in round order. Empty slots are skipped;
    /// ordering carries round semantics and is never rearranged.
    pub fn filled_statements(&self) -> Vec<String> {
        self.statements
            .iter()
            .filter_map(|s| s.clone())
            .collect()
    }

    /// True when at least one statement slot is filled.
    pub fn has_statements(&self) -> bool {
        self.statements.iter().any(|s| s.is_some())
    }
}

/// The judge's side of the session.
#[derive(Debug, Clone, Default)]
pub struct JudgeContext {
    /// Set exactly once per judging invocation; re-judging overwrites.
    pub result: Option<Verdict>,
}

/// One debate instance.
#[derive(Debug, Clone)]
pub struct DebateSession {
    topic: String,
    affirmative: TeamContext,
    negative: TeamContext,
    judge: JudgeContext,
}

impl DebateSession {
    /// Create a session for `topic` with `rounds` statement slots per team.
    pub fn new(topic: impl Into<String>, rounds: usize) -> Self {
        DebateSession {
            topic: topic.into(),
            affirmative: TeamContext::with_rounds(rounds),
            negative: TeamContext::with_rounds(rounds),
            judge: JudgeContext::default(),
        }
    }

    /// The debate topic. Set once at creation, immutable thereafter.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Configured round count.
    pub fn rounds(&self) -> usize {
        self.affirmative.rounds()
    }

    pub fn team(&self, team: Team) -> &TeamContext {
        match team {
            Team::Affirmative => &self.affirmative,
            Team::Negative => &self.negative,
        }
    }

    pub fn team_mut(&mut self, team: Team) -> &mut TeamContext {
        match team {
            Team::Affirmative => &mut self.affirmative,
            Team::Negative => &mut self.negative,
        }
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.judge.result.as_ref()
    }

    pub fn set_verdict(&mut self, verdict: Verdict) {
        self.judge.result = Some(verdict);
    }
}

/// A session shared between concurrent phases. Locks are held only for
/// snapshotting and committing, never across a provider call.
pub type SharedSession = Arc<RwLock<DebateSession>>;

/// In-memory holder mapping session ids to live sessions, for transports
/// that serve many debates from one process. Sessions vanish with the
/// process or on [`SessionStore::remove`].
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        SessionStore {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for a new topic and return its id and handle.
    pub fn create(&self, topic: impl Into<String>, rounds: usize) -> (Uuid, SharedSession) {
        let id = Uuid::new_v4();
        let session: SharedSession = Arc::new(RwLock::new(DebateSession::new(topic, rounds)));
        self.sessions.write().unwrap().insert(id, session.clone());
        (id, session)
    }

    pub fn get(&self, id: &Uuid) -> Option<SharedSession> {
        self.sessions.read().unwrap().get(id).cloned()
    }

    pub fn remove(&self, id: &Uuid) -> Option<SharedSession> {
        self.sessions.write().unwrap().remove(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_length_is_fixed_at_creation() {
        let mut session = DebateSession::new("Should X be banned?", 3);
        assert_eq!(session.rounds(), 3);

        session
            .team_mut(Team::Affirmative)
            .set_statement(0, "opening".to_string())
            .unwrap();
        session
            .team_mut(Team::Affirmative)
            .set_statement(2, "closing round".to_string())
            .unwrap();

        assert_eq!(session.rounds(), 3);
        assert_eq!(session.team(Team::Affirmative).rounds(), 3);
    }

    #[test]
    fn out_of_range_round_is_rejected() {
        let mut session = DebateSession::new("topic", 2);
        let err = session
            .team_mut(Team::Negative)
            .set_statement(2, "late".to_string())
            .unwrap_err();
        assert_eq!(err.kind(), "round_out_of_range");
    }

    #[test]
    fn overwrite_replaces_only_the_target_slot() {
        let mut session = DebateSession::new("topic", 3);
        let team = session.team_mut(Team::Affirmative);
        team.set_statement(0, "first".to_string()).unwrap();
        team.set_statement(1, "second".to_string()).unwrap();
        team.set_statement(1, "second, regenerated".to_string()).unwrap();

        assert_eq!(team.statement(0), Some("first"));
        assert_eq!(team.statement(1), Some("second, regenerated"));
        assert_eq!(team.statement(2), None);
    }

    #[test]
    fn filled_statements_preserve_round_order() {
        let mut session = DebateSession::new("topic", 3);
        let team = session.team_mut(Team::Negative);
        team.set_statement(2, "third".to_string()).unwrap();
        team.set_statement(0, "first".to_string()).unwrap();

        assert_eq!(team.filled_statements(), vec!["first", "third"]);
    }

    #[test]
    fn store_round_trips_sessions() {
        let store = SessionStore::new();
        let (id, session) = store.create("topic", 3);
        assert_eq!(store.len(), 1);

        let fetched = store.get(&id).unwrap();
        assert!(Arc::ptr_eq(&session, &fetched));

        store.remove(&id);
        assert!(store.is_empty());
    }
}
