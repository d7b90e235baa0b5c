//! Configuration for the debate core.
//!
//! Users construct this manually — no file or environment parsing
//! dependencies are introduced; the embedding application owns how values
//! are sourced.

/// Tunables for a debate orchestrator.
///
/// # Example
///
/// ```rust
/// use debatellm::DebateConfig;
///
/// let config = DebateConfig {
///     num_rounds: 2,
///     ..DebateConfig::default()
/// };
/// assert_eq!(config.temperature, 0.7);
/// ```
#[derive(Debug, Clone)]
pub struct DebateConfig {
    /// Sampling temperature used when a provider config does not override it.
    pub temperature: f32,
    /// Statement rounds per team in newly created sessions.
    pub num_rounds: usize,
    /// Inclusive lower bound for referee scores.
    pub score_min: u32,
    /// Inclusive upper bound for referee scores.
    pub score_max: u32,
}

impl Default for DebateConfig {
    fn default() -> Self {
        DebateConfig {
            temperature: 0.7,
            num_rounds: 3,
            score_min: 0,
            score_max: 100,
        }
    }
}
