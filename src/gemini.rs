//! Minimal Gemini client for our use-cases.
//!
//! We only call generateContent and request either plain text or a strict
//! JSON array. Calls are instrumented and log model name, latencies, and
//! response sizes (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short.

use std::time::Duration;

use base64::Engine;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::Prompts;
use crate::domain::{validate_set, Locale, Question, RawQuestion};
use crate::session::QUESTION_COUNT;
use crate::util::fill_template;

/// Upper bound on scanner images, after base64 decoding.
const MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl Gemini {
  /// Construct the client if we find GEMINI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("GEMINI_API_KEY").ok().filter(|k| k.trim().len() >= 10)?;
    let base_url = std::env::var("GEMINI_BASE_URL")
      .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into());
    let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-3-flash-preview".into());

    // Bounded wait keeps the loading phase from hanging; expiry counts as a
    // generation failure and routes to the offline fallback.
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(10))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// Low-level generateContent call. Returns the first candidate's text.
  #[instrument(level = "info", skip(self, parts), fields(model = %self.model, part_count = parts.len()))]
  async fn generate(&self, parts: Vec<Part>, temperature: f32, want_json: bool) -> Result<String, String> {
    let url = format!(
      "{}/models/{}:generateContent?key={}",
      self.base_url, self.model, self.api_key
    );
    let req = GenerateRequest {
      contents: vec![Content { parts }],
      generation_config: GenerationConfig {
        temperature,
        response_mime_type: want_json.then(|| "application/json".to_string()),
      },
    };

    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "sahab-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .json(&req)
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_gemini_error(&body).unwrap_or(body);
      return Err(format!("Gemini HTTP {}: {}", status, msg));
    }

    let body: GenerateResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage_metadata {
      info!(prompt_tokens = ?usage.prompt_token_count, candidate_tokens = ?usage.candidates_token_count, total_tokens = ?usage.total_token_count, "Gemini usage");
    }
    let text = body
      .candidates
      .first()
      .and_then(|c| c.content.as_ref())
      .and_then(|c| c.parts.first())
      .and_then(|p| p.text.clone())
      .unwrap_or_default()
      .trim()
      .to_string();

    Ok(text)
  }

  // --- High-level helpers (domain-specialized) ---

  /// Generate a bilingual MCQ set for one (grade, subject) pair.
  #[instrument(level = "info", skip(self, prompts), fields(%grade, %subject, model = %self.model))]
  pub async fn generate_quiz(
    &self,
    prompts: &Prompts,
    grade: &str,
    subject: &str,
  ) -> Result<Vec<Question>, String> {
    let count = QUESTION_COUNT.to_string();
    let user = fill_template(
      &prompts.quiz_user_template,
      &[("grade", grade), ("subject", subject), ("count", &count)],
    );
    let prompt = format!("{}\n\n{}", prompts.quiz_system, user);

    let start = std::time::Instant::now();
    let result = self.generate(vec![Part::text(prompt)], 0.7, true).await;
    let elapsed = start.elapsed();

    let text = match result {
      Ok(t) => {
        info!(?elapsed, response_len = t.len(), "Quiz generation response received");
        t
      }
      Err(e) => {
        error!(?elapsed, error = %e, "Model call failed during quiz generation");
        return Err(format!("Quiz generation failed: {e}"));
      }
    };

    let questions = parse_quiz_payload(&text)?;
    info!(count = questions.len(), "AI quiz accepted");
    Ok(questions)
  }

  /// Free-text solver pass-through with the tutor persona for the locale.
  #[instrument(level = "info", skip(self, prompts, prompt), fields(prompt_len = prompt.len(), ?locale))]
  pub async fn solve_text(
    &self,
    prompts: &Prompts,
    prompt: &str,
    locale: Locale,
  ) -> Result<String, String> {
    let system = match locale {
      Locale::Hi => &prompts.solver_system_hi,
      Locale::En => &prompts.solver_system_en,
    };
    let full = format!("{}\n\nQuestion: {}", system, prompt);
    self.generate(vec![Part::text(full)], 0.7, false).await
  }

  /// Image solver: one inline image part plus the tutor instruction.
  #[instrument(level = "info", skip(self, prompts, image_base64), fields(b64_len = image_base64.len(), %mime))]
  pub async fn solve_image(
    &self,
    prompts: &Prompts,
    image_base64: &str,
    mime: &str,
  ) -> Result<String, String> {
    let decoded = base64::engine::general_purpose::STANDARD
      .decode(image_base64.trim())
      .map_err(|e| format!("Invalid base64 image: {}", e))?;
    if decoded.is_empty() {
      return Err("Empty image payload".into());
    }
    if decoded.len() > MAX_IMAGE_BYTES {
      return Err(format!("Image too large ({} bytes)", decoded.len()));
    }
    info!(image_bytes = decoded.len(), "Image payload accepted");

    let parts = vec![
      Part::inline(mime, image_base64.trim()),
      Part::text(prompts.image_solver_prompt.clone()),
    ];
    self.generate(parts, 0.4, false).await
  }
}

/// Parse and validate the generator's JSON payload into well-formed questions.
/// Any schema violation rejects the whole set; the caller falls back offline.
pub fn parse_quiz_payload(text: &str) -> Result<Vec<Question>, String> {
  let raw: Vec<RawQuestion> =
    serde_json::from_str(text).map_err(|e| format!("JSON parse error: {}", e))?;
  let questions = raw
    .into_iter()
    .map(RawQuestion::into_question)
    .collect::<Result<Vec<_>, _>>()?;
  validate_set(&questions)?;
  Ok(questions)
}

// --- generateContent DTOs ---

#[derive(Serialize)]
struct GenerateRequest {
  contents: Vec<Content>,
  #[serde(rename = "generationConfig")]
  generation_config: GenerationConfig,
}
#[derive(Serialize)]
struct Content {
  parts: Vec<Part>,
}
#[derive(Serialize)]
struct Part {
  #[serde(skip_serializing_if = "Option::is_none")]
  text: Option<String>,
  #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
  inline_data: Option<InlineData>,
}
impl Part {
  fn text(s: impl Into<String>) -> Self {
    Self { text: Some(s.into()), inline_data: None }
  }
  fn inline(mime: &str, data: &str) -> Self {
    Self {
      text: None,
      inline_data: Some(InlineData { mime_type: mime.into(), data: data.into() }),
    }
  }
}
#[derive(Serialize)]
struct InlineData {
  #[serde(rename = "mimeType")]
  mime_type: String,
  data: String,
}
#[derive(Serialize)]
struct GenerationConfig {
  temperature: f32,
  #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
  response_mime_type: Option<String>,
}

#[derive(Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
  #[serde(default, rename = "usageMetadata")]
  usage_metadata: Option<UsageMetadata>,
}
#[derive(Deserialize)]
struct Candidate {
  content: Option<CandidateContent>,
}
#[derive(Deserialize)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<RespPart>,
}
#[derive(Deserialize)]
struct RespPart {
  text: Option<String>,
}
#[derive(Deserialize)]
struct UsageMetadata {
  #[serde(default, rename = "promptTokenCount")]
  prompt_token_count: Option<u32>,
  #[serde(default, rename = "candidatesTokenCount")]
  candidates_token_count: Option<u32>,
  #[serde(default, rename = "totalTokenCount")]
  total_token_count: Option<u32>,
}

/// Try to extract a clean error message from a Gemini error body.
fn extract_gemini_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  const GOOD_ITEM: &str = r#"{
    "id": "a1",
    "text_en": "What is H2O?",
    "text_hi": "H2O क्या है?",
    "options_en": ["Salt", "Water", "Acid", "Sugar"],
    "options_hi": ["नमक", "पानी", "अम्ल", "चीनी"],
    "correctAnswer": 1,
    "explanation_en": "H2O is water.",
    "explanation_hi": "H2O पानी है।",
    "difficulty": "easy",
    "type": "mcq"
  }"#;

  #[test]
  fn payload_parses_well_formed_set() {
    let payload = format!("[{}]", GOOD_ITEM);
    let qs = parse_quiz_payload(&payload).unwrap();
    assert_eq!(qs.len(), 1);
    assert_eq!(qs[0].correct_answer, 1);
  }

  #[test]
  fn empty_payload_rejected() {
    assert!(parse_quiz_payload("[]").is_err());
  }

  #[test]
  fn malformed_payload_rejected() {
    assert!(parse_quiz_payload("not json at all").is_err());
  }

  #[test]
  fn out_of_range_answer_rejects_set() {
    let bad = GOOD_ITEM.replace("\"correctAnswer\": 1", "\"correctAnswer\": 7");
    assert!(parse_quiz_payload(&format!("[{}]", bad)).is_err());
  }
}
