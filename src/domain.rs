//! Domain models used by the backend: locales, questions, source tags, and the user profile.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Locales the application ships content for.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
  En,
  Hi,
}

/// Every question must carry text for each of these.
pub const SUPPORTED_LOCALES: [Locale; 2] = [Locale::En, Locale::Hi];

/// A piece of display text keyed by locale. Modelling options as a list of
/// these keeps option indices aligned across locales structurally instead of
/// via parallel per-locale arrays.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LocalizedText(BTreeMap<Locale, String>);

impl LocalizedText {
  pub fn bilingual(en: impl Into<String>, hi: impl Into<String>) -> Self {
    let mut map = BTreeMap::new();
    map.insert(Locale::En, en.into());
    map.insert(Locale::Hi, hi.into());
    Self(map)
  }

  /// Display text for a locale, falling back to English.
  pub fn get(&self, locale: Locale) -> &str {
    self
      .0
      .get(&locale)
      .or_else(|| self.0.get(&Locale::En))
      .map(String::as_str)
      .unwrap_or("")
  }

  /// True if every supported locale has a non-empty entry.
  pub fn is_complete(&self) -> bool {
    SUPPORTED_LOCALES
      .iter()
      .all(|l| self.0.get(l).map(|s| !s.trim().is_empty()).unwrap_or(false))
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
  Mcq,
  Boolean,
  Numerical,
}

/// Where a question set came from.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
  Ai,
  Offline,
}

/// One multiple-choice question, bilingual throughout.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
  pub id: String,
  pub text: LocalizedText,
  pub options: Vec<LocalizedText>,
  #[serde(rename = "correctAnswer")]
  pub correct_answer: usize,
  pub explanation: LocalizedText,
  pub difficulty: Difficulty,
  pub kind: QuestionKind,
}

impl Question {
  /// Schema invariants: the correct-answer index is in range and every
  /// localized field is complete for all supported locales.
  pub fn validate(&self) -> Result<(), String> {
    if self.id.trim().is_empty() {
      return Err("question has an empty id".into());
    }
    if self.options.is_empty() {
      return Err(format!("question '{}' has no options", self.id));
    }
    if self.correct_answer >= self.options.len() {
      return Err(format!(
        "question '{}': correctAnswer {} out of range (0..{})",
        self.id,
        self.correct_answer,
        self.options.len()
      ));
    }
    if !self.text.is_complete() {
      return Err(format!("question '{}': text missing a locale", self.id));
    }
    for (i, opt) in self.options.iter().enumerate() {
      if !opt.is_complete() {
        return Err(format!("question '{}': option {} missing a locale", self.id, i));
      }
    }
    if !self.explanation.is_complete() {
      return Err(format!("question '{}': explanation missing a locale", self.id));
    }
    Ok(())
  }
}

/// Interchange shape for questions arriving from outside the process: the
/// remote generator's JSON and the TOML config bank both use parallel
/// per-locale fields. Converting into [`Question`] enforces the schema.
#[derive(Clone, Debug, Deserialize)]
pub struct RawQuestion {
  #[serde(default)]
  pub id: Option<String>,
  pub text_en: String,
  pub text_hi: String,
  pub options_en: Vec<String>,
  pub options_hi: Vec<String>,
  #[serde(rename = "correctAnswer", alias = "correct_answer")]
  pub correct_answer: i64,
  pub explanation_en: String,
  pub explanation_hi: String,
  #[serde(default)]
  pub difficulty: Option<String>,
  #[serde(default, rename = "type", alias = "kind")]
  pub kind: Option<String>,
}

impl RawQuestion {
  pub fn into_question(self) -> Result<Question, String> {
    if self.options_en.len() != self.options_hi.len() {
      return Err(format!(
        "option arrays differ in length across locales ({} en vs {} hi)",
        self.options_en.len(),
        self.options_hi.len()
      ));
    }
    if self.correct_answer < 0 || self.correct_answer as usize >= self.options_en.len() {
      return Err(format!("correctAnswer {} out of range", self.correct_answer));
    }
    let difficulty = match self.difficulty.as_deref() {
      None | Some("easy") => Difficulty::Easy,
      Some("medium") => Difficulty::Medium,
      Some("hard") => Difficulty::Hard,
      Some(other) => return Err(format!("unknown difficulty '{}'", other)),
    };
    let kind = match self.kind.as_deref() {
      None | Some("mcq") => QuestionKind::Mcq,
      Some("boolean") => QuestionKind::Boolean,
      Some("numerical") => QuestionKind::Numerical,
      Some(other) => return Err(format!("unknown question type '{}'", other)),
    };
    let options = self
      .options_en
      .iter()
      .zip(self.options_hi.iter())
      .map(|(en, hi)| LocalizedText::bilingual(en.clone(), hi.clone()))
      .collect();
    let q = Question {
      id: self
        .id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
      text: LocalizedText::bilingual(self.text_en, self.text_hi),
      options,
      correct_answer: self.correct_answer as usize,
      explanation: LocalizedText::bilingual(self.explanation_en, self.explanation_hi),
      difficulty,
      kind,
    };
    q.validate()?;
    Ok(q)
  }
}

/// Validate a whole set: non-empty and every member well-formed.
pub fn validate_set(questions: &[Question]) -> Result<(), String> {
  if questions.is_empty() {
    return Err("question set is empty".into());
  }
  for q in questions {
    q.validate()?;
  }
  Ok(())
}

/// Persisted user profile (single JSON blob on disk).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
  pub name: String,
  #[serde(default)]
  pub email: String,
  #[serde(rename = "class")]
  pub class_level: String,
  #[serde(default)]
  pub score: u64,
  #[serde(default)]
  pub xp: u64,
  #[serde(default = "default_level")]
  pub level: u32,
  #[serde(default)]
  pub quizzes_taken: u32,
  #[serde(default)]
  pub joined_date: String,
}

fn default_level() -> u32 {
  1
}

impl Default for UserProfile {
  fn default() -> Self {
    Self {
      name: "Scholar".into(),
      email: String::new(),
      class_level: "10".into(),
      score: 0,
      xp: 0,
      level: 1,
      quizzes_taken: 0,
      joined_date: String::new(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample_question() -> Question {
    Question {
      id: "q1".into(),
      text: LocalizedText::bilingual("What is 2+2?", "2+2 कितना होता है?"),
      options: vec![
        LocalizedText::bilingual("3", "3"),
        LocalizedText::bilingual("4", "4"),
        LocalizedText::bilingual("5", "5"),
        LocalizedText::bilingual("6", "6"),
      ],
      correct_answer: 1,
      explanation: LocalizedText::bilingual("2+2 = 4.", "2+2 = 4 होता है।"),
      difficulty: Difficulty::Easy,
      kind: QuestionKind::Mcq,
    }
  }

  #[test]
  fn valid_question_passes() {
    assert!(sample_question().validate().is_ok());
  }

  #[test]
  fn out_of_range_answer_rejected() {
    let mut q = sample_question();
    q.correct_answer = 4;
    assert!(q.validate().is_err());
  }

  #[test]
  fn missing_locale_rejected() {
    let mut q = sample_question();
    q.options[2] = LocalizedText::bilingual("5", "");
    assert!(q.validate().is_err());
  }

  #[test]
  fn empty_set_rejected() {
    assert!(validate_set(&[]).is_err());
    assert!(validate_set(&[sample_question()]).is_ok());
  }

  #[test]
  fn raw_question_rejects_mismatched_option_arrays() {
    let raw = RawQuestion {
      id: Some("r1".into()),
      text_en: "Pick one".into(),
      text_hi: "एक चुनें".into(),
      options_en: vec!["a".into(), "b".into(), "c".into(), "d".into()],
      options_hi: vec!["क".into(), "ख".into(), "ग".into()],
      correct_answer: 0,
      explanation_en: "a".into(),
      explanation_hi: "क".into(),
      difficulty: Some("easy".into()),
      kind: Some("mcq".into()),
    };
    assert!(raw.into_question().is_err());
  }

  #[test]
  fn raw_question_fills_missing_id() {
    let raw = RawQuestion {
      id: None,
      text_en: "Pick one".into(),
      text_hi: "एक चुनें".into(),
      options_en: vec!["a".into(), "b".into()],
      options_hi: vec!["क".into(), "ख".into()],
      correct_answer: 1,
      explanation_en: "b".into(),
      explanation_hi: "ख".into(),
      difficulty: None,
      kind: None,
    };
    let q = raw.into_question().unwrap();
    assert!(!q.id.is_empty());
    assert_eq!(q.correct_answer, 1);
  }

  #[test]
  fn locale_lookup_falls_back_to_english() {
    let mut map = BTreeMap::new();
    map.insert(Locale::En, "only english".to_string());
    let t = LocalizedText(map);
    assert_eq!(t.get(Locale::Hi), "only english");
    assert!(!t.is_complete());
  }
}
