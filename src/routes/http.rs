//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; logs include parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::bank::{CLASSES, DEFAULT_SUBJECT, SUBJECTS};
use crate::logic::{solve_image, solve_text};
use crate::protocol::*;
use crate::source::fetch_questions;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info")]
pub async fn http_get_catalog() -> impl IntoResponse {
  Json(CatalogOut {
    classes: CLASSES.to_vec(),
    subjects: SUBJECTS.to_vec(),
    default_subject: DEFAULT_SUBJECT,
  })
}

/// One-shot question-set fetch through the source adapter. The grade falls
/// back to the stored profile's class when not supplied.
#[instrument(level = "info", skip(state, q))]
pub async fn http_get_quiz(
  State(state): State<Arc<AppState>>,
  Query(q): Query<QuizQuery>,
) -> impl IntoResponse {
  let grade = match q.grade {
    Some(g) => g,
    None => state.profile.get().await.class_level,
  };
  let subject = q.subject.unwrap_or_else(|| DEFAULT_SUBJECT.into());
  let prefer_ai = q.prefer_ai.unwrap_or(false);

  match fetch_questions(
    state.gemini.as_ref(),
    &state.prompts,
    &state.bank,
    &grade,
    &subject,
    prefer_ai,
  )
  .await
  {
    Ok((questions, source_mode)) => {
      info!(target: "quiz", %grade, %subject, ?source_mode, count = questions.len(), "HTTP quiz served");
      Json(QuizOut { grade, subject, source_mode, questions }).into_response()
    }
    Err(e) => {
      (StatusCode::NOT_FOUND, Json(ErrorOut { message: e.to_string() })).into_response()
    }
  }
}

#[instrument(level = "info", skip(state, body), fields(prompt_len = body.prompt.len()))]
pub async fn http_post_solve(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SolveIn>,
) -> impl IntoResponse {
  let text = solve_text(&state, &body.prompt, body.locale).await;
  Json(SolveOut { text })
}

#[instrument(level = "info", skip(state, body), fields(b64_len = body.image_base64.len()))]
pub async fn http_post_solve_image(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SolveImageIn>,
) -> impl IntoResponse {
  let text = solve_image(&state, &body.image_base64, &body.mime, body.locale).await;
  Json(SolveOut { text })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_profile(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.profile.get().await)
}

/// Login / identity update. Keeps the cumulative score/XP/level intact.
#[instrument(level = "info", skip(state, body), fields(name = %body.name, class = %body.class_level))]
pub async fn http_post_profile(
  State(state): State<Arc<AppState>>,
  Json(body): Json<LoginIn>,
) -> impl IntoResponse {
  let mut profile = state.profile.get().await;
  profile.name = body.name;
  profile.email = body.email;
  profile.class_level = body.class_level;
  match state.profile.put(profile).await {
    Ok(saved) => Json(saved).into_response(),
    Err(e) => {
      (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorOut { message: e })).into_response()
    }
  }
}
