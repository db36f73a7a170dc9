//! Question Source Adapter: attempt the remote generator, validate the
//! result, and fall back to the offline bank. The fallback path is ordinary
//! branching, never an error surfaced to the caller; the only hard failure
//! is an empty bank (a configuration error, not a runtime condition).

use std::fmt;

use tracing::{error, info, instrument, warn};

use crate::bank::QuestionBank;
use crate::config::Prompts;
use crate::domain::{Question, SourceMode};
use crate::gemini::Gemini;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
  /// No offline questions registered for the subject and no default left.
  NoQuestions { subject: String },
}

impl fmt::Display for SourceError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SourceError::NoQuestions { subject } => {
        write!(f, "no questions available for subject '{}'", subject)
      }
    }
  }
}

/// Fetch a question set for one (grade, subject) pair.
///
/// With `prefer_ai` and a configured client, the remote generator is tried
/// once; any failure (network, timeout, malformed or empty response, schema
/// violation) routes silently to the offline bank. Without `prefer_ai` the
/// remote call is skipped entirely.
#[instrument(level = "info", skip(gemini, prompts, bank), fields(%grade, %subject, prefer_ai))]
pub async fn fetch_questions(
  gemini: Option<&Gemini>,
  prompts: &Prompts,
  bank: &QuestionBank,
  grade: &str,
  subject: &str,
  prefer_ai: bool,
) -> Result<(Vec<Question>, SourceMode), SourceError> {
  if prefer_ai {
    match gemini {
      Some(ai) => match ai.generate_quiz(prompts, grade, subject).await {
        Ok(questions) => {
          info!(target: "quiz", %subject, count = questions.len(), source = "ai", "Question set served");
          return Ok((questions, SourceMode::Ai));
        }
        Err(e) => {
          error!(target: "quiz", %subject, error = %e, "AI generation failed; using offline bank");
        }
      },
      None => {
        warn!(target: "quiz", %subject, "AI requested but no client configured; using offline bank");
      }
    }
  }

  match bank.offline_set_or_default(subject) {
    Some((set, served)) => {
      info!(target: "quiz", requested = %subject, %served, count = set.len(), source = "offline", "Question set served");
      Ok((set, SourceMode::Offline))
    }
    None => Err(SourceError::NoQuestions { subject: subject.to_string() }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bank::DEFAULT_SUBJECT;
  use crate::domain::validate_set;

  #[tokio::test]
  async fn offline_mode_skips_remote() {
    let bank = QuestionBank::built_in();
    let prompts = Prompts::default();
    let (set, mode) = fetch_questions(None, &prompts, &bank, "10", "Science", false)
      .await
      .unwrap();
    assert_eq!(mode, SourceMode::Offline);
    assert_eq!(set.len(), 5);
    validate_set(&set).unwrap();
  }

  #[tokio::test]
  async fn ai_unavailable_falls_back_offline() {
    let bank = QuestionBank::built_in();
    let prompts = Prompts::default();
    let (set, mode) = fetch_questions(None, &prompts, &bank, "8", "Mathematics", true)
      .await
      .unwrap();
    assert_eq!(mode, SourceMode::Offline);
    assert_eq!(set[0].id, "m1");
  }

  #[tokio::test]
  async fn unknown_subject_serves_default() {
    let bank = QuestionBank::built_in();
    let prompts = Prompts::default();
    let (set, mode) = fetch_questions(None, &prompts, &bank, "9", "Social Studies", false)
      .await
      .unwrap();
    assert_eq!(mode, SourceMode::Offline);
    let default_set = bank.offline_set(DEFAULT_SUBJECT).unwrap();
    assert_eq!(set.len(), default_set.len());
    assert_eq!(set[0].id, default_set[0].id);
  }

  #[tokio::test]
  async fn empty_bank_is_a_hard_error() {
    let bank = QuestionBank::empty();
    let prompts = Prompts::default();
    let err = fetch_questions(None, &prompts, &bank, "6", "Science", false)
      .await
      .unwrap_err();
    assert_eq!(err, SourceError::NoQuestions { subject: "Science".into() });
  }
}
