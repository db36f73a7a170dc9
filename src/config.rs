//! Loading agent configuration (prompts + optional extra question bank) from TOML.
//!
//! See `AgentConfig` and `Prompts` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::RawQuestion;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Prompts,
  /// Extra bank entries, merged into the built-in offline bank at startup.
  #[serde(default)]
  pub questions: Vec<QuestionCfg>,
}

/// Question entry accepted in TOML configuration. Uses the same parallel
/// per-locale fields as the remote generator's JSON.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  pub subject: String,
  #[serde(flatten)]
  pub question: RawQuestion,
}

/// Prompts used by the Gemini client. Defaults match the original tutor persona.
/// Override them in TOML to tune tone/structure.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  // Quiz generation
  pub quiz_system: String,
  pub quiz_user_template: String,
  // Text solver persona, per locale
  pub solver_system_en: String,
  pub solver_system_hi: String,
  // Image solver
  pub image_solver_prompt: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      quiz_system: "You are a school quiz generator. Respond ONLY with a strict JSON array.".into(),
      quiz_user_template: "Generate {count} multiple choice questions for Class {grade}, Subject: {subject}. Each item must have: id, text_en, text_hi, options_en (4), options_hi (4, index-aligned with options_en), correctAnswer (integer index), explanation_en, explanation_hi, difficulty (easy|medium|hard), type (mcq). Languages: en and hi.".into(),
      solver_system_en: "You are 'Master Sahab', a professional academic tutor. Provide clear, step-by-step solutions in English suitable for school students.".into(),
      solver_system_hi: "You are 'Master Sahab', a wise Indian teacher. Explain complex topics using simple Hinglish (Hindi + English). Provide step-by-step solutions for students.".into(),
      image_solver_prompt: "Identify the student's question in this image and explain the solution simply as 'Master Sahab' tutor.".into(),
    }
  }
}

/// Attempt to load `AgentConfig` from AGENT_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
  let path = std::env::var("AGENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AgentConfig>(&s) {
      Ok(cfg) => {
        info!(target: "sahab_backend", %path, "Loaded agent config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "sahab_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "sahab_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn question_cfg_parses_from_toml() {
    let toml_src = r#"
      [[questions]]
      subject = "English"
      id = "e1"
      text_en = "Choose the synonym of 'happy'."
      text_hi = "'happy' का पर्यायवाची चुनें।"
      options_en = ["sad", "glad", "angry", "slow"]
      options_hi = ["उदास", "प्रसन्न", "क्रोधित", "धीमा"]
      correctAnswer = 1
      explanation_en = "'Glad' means happy."
      explanation_hi = "'Glad' का अर्थ खुश होता है।"
      difficulty = "easy"
      type = "mcq"
    "#;
    let cfg: AgentConfig = toml::from_str(toml_src).unwrap();
    assert_eq!(cfg.questions.len(), 1);
    let q = cfg.questions[0].clone().question.into_question().unwrap();
    assert_eq!(q.correct_answer, 1);
    assert_eq!(cfg.questions[0].subject, "English");
  }

  #[test]
  fn defaults_used_when_prompts_absent() {
    let cfg: AgentConfig = toml::from_str("").unwrap();
    assert!(cfg.prompts.quiz_user_template.contains("{subject}"));
  }
}
