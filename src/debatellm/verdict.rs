//! Parsing the referee's structured verdict out of raw model output.
//!
//! Referees are instructed to return strict JSON, but real completions
//! arrive wrapped in code fences or padded with commentary. The parser
//! strips surrounding fence markup, locates the outermost JSON object, and
//! validates the record. Malformed output is surfaced as
//! [`DebateError::MalformedVerdict`] — never repaired, never defaulted to a
//! winner.

use serde::{Deserialize, Serialize};

use crate::debatellm::error::DebateError;
use crate::debatellm::session::Team;

/// Inclusive score bounds applied when no configured range is supplied.
pub const DEFAULT_SCORE_RANGE: (u32, u32) = (0, 100);

/// The judge's structured decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub winner: Team,
    pub affirmative_score: u32,
    pub negative_score: u32,
    pub reason: String,
}

/// Loose mirror of the wire record; winner stays a string so an invalid
/// label produces a precise error instead of a generic serde message.
#[derive(Deserialize)]
struct RawVerdict {
    winner: String,
    affirmative_score: i64,
    negative_score: i64,
    reason: String,
}

/// Parse a verdict from raw referee output using [`DEFAULT_SCORE_RANGE`].
pub fn parse_verdict(raw: &str) -> Result<Verdict, DebateError> {
    parse_verdict_with_range(raw, DEFAULT_SCORE_RANGE.0, DEFAULT_SCORE_RANGE.1)
}

/// Parse a verdict, validating both scores against an inclusive
/// `[score_min, score_max]` range.
pub fn parse_verdict_with_range(
    raw: &str,
    score_min: u32,
    score_max: u32,
) -> Result<Verdict, DebateError> {
    let stripped = strip_code_fences(raw);
    let json = extract_json_object(stripped)
        .ok_or_else(|| DebateError::MalformedVerdict("no JSON object found".to_string()))?;

    let parsed: RawVerdict = serde_json::from_str(json)
        .map_err(|err| DebateError::MalformedVerdict(err.to_string()))?;

    let winner = match parsed.winner.to_lowercase().as_str() {
        "affirmative" => Team::Affirmative,
        "negative" => Team::Negative,
        other => {
            return Err(DebateError::MalformedVerdict(format!(
                "winner must be \"affirmative\" or \"negative\", got \"{}\"",
                other
            )))
        }
    };

    let affirmative_score = check_score(parsed.affirmative_score, score_min, score_max, "affirmative_score")?;
    let negative_score = check_score(parsed.negative_score, score_min, score_max, "negative_score")?;

    Ok(Verdict {
        winner,
        affirmative_score,
        negative_score,
        reason: parsed.reason,
    })
}

fn check_score(value: i64, min: u32, max: u32, field: &str) -> Result<u32, DebateError> {
    if value < min as i64 || value > max as i64 {
        return Err(DebateError::MalformedVerdict(format!(
            "{} {} outside range {}..={}",
            field, value, min, max
        )));
    }
    Ok(value as u32)
}

/// Drop a surrounding ``` fence (with or without a language tag) if present.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let without_open = match trimmed.find('\n') {
        Some(idx) => &trimmed[idx + 1..],
        None => return trimmed,
    };
    without_open.trim_end().trim_end_matches("```").trim()
}

/// Locate the outermost `{ ... }` object, tolerating commentary before and
/// after it. Brace counting skips braces inside JSON strings.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n{\"winner\":\"affirmative\",\"affirmative_score\":85,\"negative_score\":70,\"reason\":\"x\"}\n```";
        let verdict = parse_verdict(raw).unwrap();
        assert_eq!(verdict.winner, Team::Affirmative);
        assert_eq!(verdict.affirmative_score, 85);
        assert_eq!(verdict.negative_score, 70);
        assert_eq!(verdict.reason, "x");
    }

    #[test]
    fn parses_bare_json() {
        let raw = r#"{"winner":"negative","affirmative_score":40,"negative_score":60,"reason":"stronger rebuttals"}"#;
        let verdict = parse_verdict(raw).unwrap();
        assert_eq!(verdict.winner, Team::Negative);
    }

    #[test]
    fn parses_json_surrounded_by_commentary() {
        let raw = "Here is my decision:\n{\"winner\":\"negative\",\"affirmative_score\":10,\"negative_score\":20,\"reason\":\"clear\"}\nThank you.";
        let verdict = parse_verdict(raw).unwrap();
        assert_eq!(verdict.negative_score, 20);
    }

    #[test]
    fn braces_inside_reason_do_not_break_extraction() {
        let raw = r#"{"winner":"affirmative","affirmative_score":55,"negative_score":45,"reason":"used {framing} very well"}"#;
        let verdict = parse_verdict(raw).unwrap();
        assert_eq!(verdict.reason, "used {framing} very well");
    }

    #[test]
    fn non_json_is_malformed() {
        let err = parse_verdict("not json").unwrap_err();
        assert_eq!(err.kind(), "malformed_verdict");
    }

    #[test]
    fn invalid_winner_label_is_malformed() {
        let raw = r#"{"winner":"draw","affirmative_score":50,"negative_score":50,"reason":"even"}"#;
        let err = parse_verdict(raw).unwrap_err();
        assert_eq!(err.kind(), "malformed_verdict");
    }

    #[test]
    fn missing_score_is_malformed() {
        let raw = r#"{"winner":"affirmative","affirmative_score":80,"reason":"one-sided"}"#;
        let err = parse_verdict(raw).unwrap_err();
        assert_eq!(err.kind(), "malformed_verdict");
    }

    #[test]
    fn score_outside_configured_range_is_malformed() {
        let raw = r#"{"winner":"affirmative","affirmative_score":23,"negative_score":18,"reason":"ok"}"#;
        // Fine under the default range...
        assert!(parse_verdict(raw).is_ok());
        // ...but not under a 0-20 sub-range.
        let err = parse_verdict_with_range(raw, 0, 20).unwrap_err();
        assert_eq!(err.kind(), "malformed_verdict");
    }

    #[test]
    fn negative_score_is_malformed() {
        let raw = r#"{"winner":"negative","affirmative_score":-5,"negative_score":50,"reason":"odd"}"#;
        let err = parse_verdict(raw).unwrap_err();
        assert_eq!(err.kind(), "malformed_verdict");
    }

    #[test]
    fn uppercase_winner_label_is_accepted() {
        // Referee models occasionally shout the label.
        let raw = r#"{"winner":"NEGATIVE","affirmative_score":18,"negative_score":22,"reason":"meta-analysis held"}"#;
        let verdict = parse_verdict(raw).unwrap();
        assert_eq!(verdict.winner, Team::Negative);
    }
}
