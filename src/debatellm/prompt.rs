//! Prompt assembly: turning session state into the exact text sent to a
//! provider.
//!
//! Five role templates cover the whole debate: the two statement roles, the
//! referee, topic/option generation, and closing summaries. Templates are
//! plain text with `{placeholder}` markers; rendering is pure substitution
//! against a closed, per-role context type, so a required field can never be
//! silently absent — only a caller-supplied template naming a placeholder
//! the role does not define can fail, with
//! [`DebateError::MissingContextField`].
//!
//! Multi-valued fields (statement histories) render in exactly the order
//! given. That ordering carries round semantics and is never rearranged or
//! deduplicated.

use std::collections::HashMap;

use crate::debatellm::client_wrapper::{Message, Role};
use crate::debatellm::error::DebateError;
use crate::debatellm::session::Team;

/// Which of the five templates a render call selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    AffirmativeStatement,
    NegativeStatement,
    RefereeJudge,
    TopicGeneration,
    ClosingSummary,
}

impl PromptRole {
    /// System message steering the model for this role.
    pub fn system_message(self) -> &'static str {
        match self {
            PromptRole::AffirmativeStatement => {
                "You are a debater on the affirmative team of a formal, civil debate. \
                 Argue persuasively for the motion, engage directly with the opposing \
                 team's statements, and keep a respectful tone."
            }
            PromptRole::NegativeStatement => {
                "You are a debater on the negative team of a formal, civil debate. \
                 Argue persuasively against the motion, engage directly with the \
                 opposing team's statements, and keep a respectful tone."
            }
            PromptRole::RefereeJudge => {
                "You are an impartial judge for a formal, civil debate. You score \
                 holistically and return only the requested structured output."
            }
            PromptRole::TopicGeneration => {
                "You are a debate coach preparing a team for a formal debate. You \
                 produce sharp, defensible talking points."
            }
            PromptRole::ClosingSummary => {
                "You are a debater delivering your team's final summary in a formal, \
                 civil debate. You synthesize your team's strongest points and answer \
                 the opposition's best arguments."
            }
        }
    }
}

/// Built-in template: team option generation.
const TOPIC_GENERATION_TEMPLATE: &str = "\
TOPIC: {topic}

Write the {stance} team's position on the topic above: three concise,
numbered talking points the team will defend across the debate. Each point
should be one or two sentences and independently defensible.";

/// Built-in template: affirmative round statement.
const AFFIRMATIVE_STATEMENT_TEMPLATE: &str = "\
TOPIC: {topic}

YOUR TEAM'S POSITION (affirmative):
{options}

YOUR TEAM'S STATEMENTS SO FAR:
{own_statements}

OPPOSING TEAM'S STATEMENTS SO FAR:
{opponent_statements}

Write your team's next statement. Advance your position with evidence and
reasoning, and rebut the opposing team's most recent points directly.";

/// Built-in template: negative round statement.
const NEGATIVE_STATEMENT_TEMPLATE: &str = "\
TOPIC: {topic}

YOUR TEAM'S POSITION (negative):
{options}

YOUR TEAM'S STATEMENTS SO FAR:
{own_statements}

OPPOSING TEAM'S STATEMENTS SO FAR:
{opponent_statements}

Write your team's next statement. Advance your position with evidence and
reasoning, and rebut the opposing team's most recent points directly.";

/// Built-in template: closing summary.
const CLOSING_SUMMARY_TEMPLATE: &str = "\
TOPIC: {topic}

YOUR TEAM'S POSITION ({stance}):
{options}

OPPOSING TEAM'S POSITION:
{opponent_options}

YOUR TEAM'S STATEMENTS:
{own_statements}

OPPOSING TEAM'S STATEMENTS:
{opponent_statements}

Write your team's final summary: synthesize your strongest arguments, answer
the opposition's best points, and close with why your side should win.";

/// Built-in template: referee judging. The schema mirrors the structured
/// verdict the parser expects.
const REFEREE_JUDGE_TEMPLATE: &str = "\
Act as an impartial debate judge for a formal, civil debate.

Criteria (score holistically):
- Clarity & structure
- Use of evidence / reasoning
- Rebuttal quality and engagement with the other side
- Cohesion across rounds
- Final summary strength

Return STRICT JSON ONLY with this schema (no extra text):
{
  \"winner\": \"affirmative\" | \"negative\",
  \"affirmative_score\": <integer 0-100>,
  \"negative_score\": <integer 0-100>,
  \"reason\": \"<=150 words explaining your decision>\"
}

Transcript:

TOPIC: {topic}

=== AFFIRMATIVE: TEAM OPTIONS ===
{affirmative_options}

=== NEGATIVE: TEAM OPTIONS ===
{negative_options}

{affirmative_statements}

{negative_statements}

=== AFFIRMATIVE FINAL SUMMARY ===
{affirmative_summary}

=== NEGATIVE FINAL SUMMARY ===
{negative_summary}";

/// The five template texts. Construct directly to supply externally loaded
/// templates; [`Default`] provides the built-in set.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub affirmative_statement: String,
    pub negative_statement: String,
    pub referee_judge: String,
    pub topic_generation: String,
    pub closing_summary: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        PromptTemplates {
            affirmative_statement: AFFIRMATIVE_STATEMENT_TEMPLATE.to_string(),
            negative_statement: NEGATIVE_STATEMENT_TEMPLATE.to_string(),
            referee_judge: REFEREE_JUDGE_TEMPLATE.to_string(),
            topic_generation: TOPIC_GENERATION_TEMPLATE.to_string(),
            closing_summary: CLOSING_SUMMARY_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    fn for_role(&self, role: PromptRole) -> &str {
        match role {
            PromptRole::AffirmativeStatement => &self.affirmative_statement,
            PromptRole::NegativeStatement => &self.negative_statement,
            PromptRole::RefereeJudge => &self.referee_judge,
            PromptRole::TopicGeneration => &self.topic_generation,
            PromptRole::ClosingSummary => &self.closing_summary,
        }
    }
}

/// Closed, per-role context for a render call. Required fields are part of
/// the variant, so forgetting one is a compile error rather than a runtime
/// `MissingContextField`.
#[derive(Debug, Clone)]
pub enum PromptContext {
    /// Generate a team's options from the topic.
    TopicGeneration { topic: String, stance: Team },
    /// Generate one round statement for a team.
    Statement {
        team: Team,
        topic: String,
        options: String,
        own_statements: Vec<String>,
        opponent_statements: Vec<String>,
    },
    /// Generate a team's closing summary.
    Closing {
        team: Team,
        topic: String,
        options: String,
        opponent_options: String,
        own_statements: Vec<String>,
        opponent_statements: Vec<String>,
    },
    /// Judge the finished debate.
    Judge {
        topic: String,
        affirmative_options: String,
        negative_options: String,
        affirmative_statements: Vec<String>,
        negative_statements: Vec<String>,
        affirmative_summary: String,
        negative_summary: String,
    },
}

impl PromptContext {
    /// The template this context renders against.
    pub fn role(&self) -> PromptRole {
        match self {
            PromptContext::TopicGeneration { .. } => PromptRole::TopicGeneration,
            PromptContext::Statement { team, .. } => match team {
                Team::Affirmative => PromptRole::AffirmativeStatement,
                Team::Negative => PromptRole::NegativeStatement,
            },
            PromptContext::Closing { .. } => PromptRole::ClosingSummary,
            PromptContext::Judge { .. } => PromptRole::RefereeJudge,
        }
    }

    /// Flatten into the placeholder values the template may reference.
    fn fields(&self) -> HashMap<&'static str, String> {
        let mut fields = HashMap::new();
        match self {
            PromptContext::TopicGeneration { topic, stance } => {
                fields.insert("topic", topic.clone());
                fields.insert("stance", stance.label().to_string());
            }
            PromptContext::Statement {
                team,
                topic,
                options,
                own_statements,
                opponent_statements,
            } => {
                fields.insert("topic", topic.clone());
                fields.insert("stance", team.label().to_string());
                fields.insert("options", options.clone());
                fields.insert("own_statements", join_rounds(own_statements));
                fields.insert("opponent_statements", join_rounds(opponent_statements));
            }
            PromptContext::Closing {
                team,
                topic,
                options,
                opponent_options,
                own_statements,
                opponent_statements,
            } => {
                fields.insert("topic", topic.clone());
                fields.insert("stance", team.label().to_string());
                fields.insert("options", options.clone());
                fields.insert("opponent_options", opponent_options.clone());
                fields.insert("own_statements", join_rounds(own_statements));
                fields.insert("opponent_statements", join_rounds(opponent_statements));
            }
            PromptContext::Judge {
                topic,
                affirmative_options,
                negative_options,
                affirmative_statements,
                negative_statements,
                affirmative_summary,
                negative_summary,
            } => {
                fields.insert("topic", topic.clone());
                fields.insert("affirmative_options", affirmative_options.clone());
                fields.insert("negative_options", negative_options.clone());
                fields.insert(
                    "affirmative_statements",
                    join_transcript_rounds(affirmative_statements, "AFFIRMATIVE"),
                );
                fields.insert(
                    "negative_statements",
                    join_transcript_rounds(negative_statements, "NEGATIVE"),
                );
                fields.insert("affirmative_summary", affirmative_summary.clone());
                fields.insert("negative_summary", negative_summary.clone());
            }
        }
        fields
    }
}

/// Label statements by round in the order given.
fn join_rounds(statements: &[String]) -> String {
    statements
        .iter()
        .enumerate()
        .map(|(i, text)| format!("Round {}: {}", i + 1, text.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Transcript-style round grouping used by the judge template.
fn join_transcript_rounds(statements: &[String], side: &str) -> String {
    statements
        .iter()
        .enumerate()
        .map(|(i, text)| format!("--- {} Round {} ---\n{}", side, i + 1, text.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Renders role templates against structured context.
#[derive(Debug, Clone, Default)]
pub struct PromptAssembler {
    templates: PromptTemplates,
}

impl PromptAssembler {
    pub fn new(templates: PromptTemplates) -> Self {
        PromptAssembler { templates }
    }

    /// Render the template for `context`'s role into the final prompt text.
    pub fn render(&self, context: &PromptContext) -> Result<String, DebateError> {
        let template = self.templates.for_role(context.role());
        substitute(template, &context.fields())
    }

    /// Build the full message pair (system + user) for one provider call.
    pub fn messages(&self, context: &PromptContext) -> Result<Vec<Message>, DebateError> {
        let prompt = self.render(context)?;
        Ok(vec![
            Message {
                role: Role::System,
                content: context.role().system_message().to_string(),
            },
            Message {
                role: Role::User,
                content: prompt,
            },
        ])
    }
}

/// Replace each `{name}` marker with its context value.
///
/// A marker is a brace pair whose inside is a lowercase identifier; anything
/// else (JSON braces in the judge schema, prose braces) passes through
/// untouched. A marker naming a field the context does not define fails with
/// `MissingContextField`.
fn substitute(template: &str, fields: &HashMap<&'static str, String>) -> Result<String, DebateError> {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        match after_open.find('}') {
            Some(close) => {
                let name = &after_open[..close];
                if is_placeholder_name(name) {
                    match fields.get(name) {
                        Some(value) => output.push_str(value),
                        None => return Err(DebateError::MissingContextField(name.to_string())),
                    }
                    rest = &after_open[close + 1..];
                } else {
                    output.push('{');
                    rest = after_open;
                }
            }
            None => {
                output.push('{');
                rest = after_open;
            }
        }
    }
    output.push_str(rest);
    Ok(output)
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c == '_')
}
