//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Locale, Question, SourceMode, UserProfile};
use crate::session::SessionSnapshot;

/// Messages the client can send over WebSocket. One quiz session per
/// connection; intents outside the current phase are no-ops.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
  Ping,
  StartQuiz {
    grade: String,
    subject: String,
    #[serde(rename = "preferAi", default)]
    prefer_ai: bool,
  },
  SubmitAnswer {
    #[serde(rename = "optionIndex")]
    option_index: i32,
  },
  Advance,
  Restart,
  ExitQuiz,
  Solve {
    prompt: String,
    #[serde(default = "default_locale")]
    locale: Locale,
  },
}

fn default_locale() -> Locale {
  Locale::En
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
  Pong,
  /// Read-only session projection, pushed on every transition and tick.
  Session { session: SessionSnapshot },
  /// Sent exactly once per completed session.
  QuizComplete {
    score: u32,
    total: usize,
    profile: UserProfile,
  },
  SolveResult { text: String },
  Error { message: String },
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}

#[derive(Serialize)]
pub struct CatalogOut {
  pub classes: Vec<&'static str>,
  pub subjects: Vec<&'static str>,
  #[serde(rename = "defaultSubject")]
  pub default_subject: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct QuizQuery {
  pub grade: Option<String>,
  pub subject: Option<String>,
  #[serde(rename = "preferAi")]
  pub prefer_ai: Option<bool>,
}

#[derive(Serialize)]
pub struct QuizOut {
  pub grade: String,
  pub subject: String,
  #[serde(rename = "sourceMode")]
  pub source_mode: SourceMode,
  pub questions: Vec<Question>,
}

#[derive(Deserialize)]
pub struct SolveIn {
  pub prompt: String,
  #[serde(default = "default_locale")]
  pub locale: Locale,
}
#[derive(Serialize)]
pub struct SolveOut {
  pub text: String,
}

#[derive(Deserialize)]
pub struct SolveImageIn {
  #[serde(rename = "imageBase64")]
  pub image_base64: String,
  #[serde(default = "default_mime")]
  pub mime: String,
  #[serde(default = "default_locale")]
  pub locale: Locale,
}

fn default_mime() -> String {
  "image/jpeg".into()
}

/// Login / profile update. Cumulative stats are preserved server-side.
#[derive(Deserialize)]
pub struct LoginIn {
  pub name: String,
  #[serde(default)]
  pub email: String,
  #[serde(rename = "class")]
  pub class_level: String,
}

#[derive(Serialize)]
pub struct ErrorOut {
  pub message: String,
}
