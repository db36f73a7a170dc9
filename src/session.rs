//! Quiz session state machine: selection → loading → active → result.
//!
//! The controller owns all session state. Async collaborators (the question
//! fetch and the per-question ticker) are tagged with a generation number at
//! spawn time; the session bumps the generation on every transition that
//! supersedes them, so a slow fetch result or a stale timer tick can never be
//! applied to the wrong question.

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::domain::{Question, SourceMode};

/// Questions requested from the remote generator per session.
pub const QUESTION_COUNT: usize = 5;

/// Countdown per question, in seconds.
pub const TIMER_SECONDS: u32 = 25;

/// Sentinel recorded when the timer expires without a selection. Never equal
/// to any valid option index, so it never scores.
pub const NO_SELECTION: i32 = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
  Selection,
  Loading,
  Active,
  Result,
}

/// Outcome of an `advance()` call.
#[derive(Debug, PartialEq, Eq)]
pub enum Advanced {
  /// Moved to the next question; the new generation tags its ticker.
  Next(u64),
  /// Session complete. Carries the final score, reported exactly once.
  Finished(u32),
  /// Not permitted in the current state; no-op.
  Rejected,
}

/// One quiz run from selection to result. Owned exclusively by the
/// connection that drives it; everything else sees only [`SessionSnapshot`].
pub struct QuizSession {
  phase: Phase,
  grade: String,
  subject: String,
  source_mode: SourceMode,
  questions: Vec<Question>,
  current_index: usize,
  selected_answer: Option<i32>,
  is_answered: bool,
  score: u32,
  remaining_seconds: u32,
  generation: u64,
  load_error: Option<String>,
  completion_reported: bool,
}

impl Default for QuizSession {
  fn default() -> Self {
    Self::new()
  }
}

impl QuizSession {
  pub fn new() -> Self {
    Self {
      phase: Phase::Selection,
      grade: String::new(),
      subject: String::new(),
      source_mode: SourceMode::Offline,
      questions: Vec::new(),
      current_index: 0,
      selected_answer: None,
      is_answered: false,
      score: 0,
      remaining_seconds: 0,
      generation: 0,
      load_error: None,
      completion_reported: false,
    }
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  /// Generation tag for the currently valid async work (fetch or ticker).
  pub fn generation(&self) -> u64 {
    self.generation
  }

  pub fn score(&self) -> u32 {
    self.score
  }

  pub fn is_answered(&self) -> bool {
    self.is_answered
  }

  fn bump(&mut self) -> u64 {
    self.generation += 1;
    self.generation
  }

  /// Selection → Loading. Returns the generation tagging the fetch, or None
  /// when not in `selection` (invalid intent, no-op).
  #[instrument(level = "info", skip(self), fields(%grade, %subject))]
  pub fn begin_loading(&mut self, grade: &str, subject: &str) -> Option<u64> {
    if self.phase != Phase::Selection {
      debug!(target: "quiz", phase = ?self.phase, "begin_loading rejected");
      return None;
    }
    self.grade = grade.to_string();
    self.subject = subject.to_string();
    self.questions.clear();
    self.current_index = 0;
    self.selected_answer = None;
    self.is_answered = false;
    self.score = 0;
    self.remaining_seconds = 0;
    self.load_error = None;
    self.completion_reported = false;
    self.phase = Phase::Loading;
    Some(self.bump())
  }

  /// Loading → Active, applied only for the matching generation and a
  /// non-empty set. Returns the new generation for the first question's
  /// ticker, or None when the result is stale or rejected.
  #[instrument(level = "info", skip(self, questions), fields(count = questions.len()))]
  pub fn questions_ready(
    &mut self,
    generation: u64,
    questions: Vec<Question>,
    mode: SourceMode,
  ) -> Option<u64> {
    if self.phase != Phase::Loading || generation != self.generation {
      debug!(target: "quiz", phase = ?self.phase, current = self.generation, "stale fetch result dropped");
      return None;
    }
    if questions.is_empty() {
      return None;
    }
    self.questions = questions;
    self.source_mode = mode;
    self.current_index = 0;
    self.selected_answer = None;
    self.is_answered = false;
    self.remaining_seconds = TIMER_SECONDS;
    self.phase = Phase::Active;
    info!(target: "quiz", subject = %self.subject, total = self.questions.len(), ?mode, "Session active");
    Some(self.bump())
  }

  /// Loading → Selection with an error flag. The session never hangs in
  /// `loading`; an unservable fetch degrades to selection.
  #[instrument(level = "info", skip(self, error))]
  pub fn loading_failed(&mut self, generation: u64, error: &str) -> bool {
    if self.phase != Phase::Loading || generation != self.generation {
      return false;
    }
    self.load_error = Some(error.to_string());
    self.phase = Phase::Selection;
    self.bump();
    true
  }

  /// Record an answer for the current question. First answer wins: once
  /// answered, further attempts are no-ops. Scoring happens exactly here.
  #[instrument(level = "info", skip(self))]
  pub fn submit_answer(&mut self, index: i32) -> bool {
    if self.phase != Phase::Active || self.is_answered {
      debug!(target: "quiz", phase = ?self.phase, answered = self.is_answered, "submit_answer rejected");
      return false;
    }
    self.selected_answer = Some(index);
    self.is_answered = true;
    // Invalidate the ticker for this question.
    self.bump();
    let correct = index >= 0 && (index as usize) == self.questions[self.current_index].correct_answer;
    if correct {
      self.score += 1;
    }
    info!(
      target: "quiz",
      question = self.current_index + 1,
      selected = index,
      correct,
      score = self.score,
      "Answer recorded"
    );
    true
  }

  /// One second elapsed on the question's countdown. Ticks carrying a stale
  /// generation are rejected. Reaching zero answers with the sentinel.
  pub fn timer_tick(&mut self, generation: u64) -> bool {
    if self.phase != Phase::Active || self.is_answered || generation != self.generation {
      return false;
    }
    self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
    if self.remaining_seconds == 0 {
      info!(target: "quiz", question = self.current_index + 1, "Timer expired; answering with sentinel");
      self.submit_answer(NO_SELECTION);
    }
    true
  }

  /// Move past an answered question. Advancing past the last question
  /// transitions to `result`; the final score is reported exactly once.
  #[instrument(level = "info", skip(self))]
  pub fn advance(&mut self) -> Advanced {
    if self.phase != Phase::Active || !self.is_answered {
      debug!(target: "quiz", phase = ?self.phase, answered = self.is_answered, "advance rejected");
      return Advanced::Rejected;
    }
    if self.current_index + 1 < self.questions.len() {
      self.current_index += 1;
      self.selected_answer = None;
      self.is_answered = false;
      self.remaining_seconds = TIMER_SECONDS;
      Advanced::Next(self.bump())
    } else {
      self.phase = Phase::Result;
      self.bump();
      if self.completion_reported {
        return Advanced::Rejected;
      }
      self.completion_reported = true;
      info!(target: "quiz", score = self.score, total = self.questions.len(), "Session complete");
      Advanced::Finished(self.score)
    }
  }

  /// Discard the session and return to selection. The generation counter
  /// keeps increasing so in-flight callbacks from the old run stay invalid.
  #[instrument(level = "info", skip(self))]
  pub fn restart(&mut self) {
    self.phase = Phase::Selection;
    self.questions.clear();
    self.current_index = 0;
    self.selected_answer = None;
    self.is_answered = false;
    self.score = 0;
    self.remaining_seconds = 0;
    self.load_error = None;
    self.completion_reported = false;
    self.bump();
  }

  /// Tear the session down early. Completion is never reported; any pending
  /// fetch or ticker is invalidated.
  #[instrument(level = "info", skip(self))]
  pub fn exit(&mut self) {
    self.restart();
  }

  /// Read-only projection for rendering.
  pub fn snapshot(&self) -> SessionSnapshot {
    SessionSnapshot {
      phase: self.phase,
      grade: self.grade.clone(),
      subject: self.subject.clone(),
      source_mode: self.source_mode,
      questions: self.questions.clone(),
      current_index: self.current_index,
      selected_answer: self.selected_answer,
      is_answered: self.is_answered,
      score: self.score,
      remaining_seconds: self.remaining_seconds,
      total_questions: self.questions.len(),
      load_error: self.load_error.clone(),
    }
  }
}

/// What the presentation layer sees. Never a handle to mutate the session.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
  pub phase: Phase,
  pub grade: String,
  pub subject: String,
  pub source_mode: SourceMode,
  pub questions: Vec<Question>,
  pub current_index: usize,
  pub selected_answer: Option<i32>,
  pub is_answered: bool,
  pub score: u32,
  pub remaining_seconds: u32,
  pub total_questions: usize,
  pub load_error: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bank::QuestionBank;
  use crate::config::Prompts;
  use crate::source::fetch_questions;

  fn science_set() -> Vec<Question> {
    QuestionBank::built_in().offline_set("Science").unwrap()
  }

  /// Drive a session straight into `active` with the offline Science set.
  fn active_session() -> QuizSession {
    let mut s = QuizSession::new();
    let gen = s.begin_loading("10", "Science").unwrap();
    s.questions_ready(gen, science_set(), SourceMode::Offline).unwrap();
    s
  }

  fn correct_index(s: &QuizSession) -> i32 {
    s.snapshot().questions[s.snapshot().current_index].correct_answer as i32
  }

  #[test]
  fn full_run_all_correct_scores_five() {
    // Scenario A: Science, offline, every answer correct by index.
    let mut s = active_session();
    for i in 0..5 {
      assert!(s.submit_answer(correct_index(&s)));
      match s.advance() {
        Advanced::Next(_) => assert!(i < 4),
        Advanced::Finished(score) => {
          assert_eq!(i, 4);
          assert_eq!(score, 5);
        }
        Advanced::Rejected => panic!("advance rejected mid-run"),
      }
    }
    assert_eq!(s.phase(), Phase::Result);
    assert_eq!(s.score(), 5);
  }

  #[tokio::test]
  async fn forced_ai_failure_falls_back_offline() {
    // Scenario B: prefer AI with no client; session still reaches active,
    // tagged offline, using the Mathematics bank set.
    let bank = QuestionBank::built_in();
    let prompts = Prompts::default();
    let mut s = QuizSession::new();
    let gen = s.begin_loading("8", "Mathematics").unwrap();
    let (set, mode) = fetch_questions(None, &prompts, &bank, "8", "Mathematics", true)
      .await
      .unwrap();
    s.questions_ready(gen, set, mode).unwrap();
    assert_eq!(s.phase(), Phase::Active);
    assert_eq!(s.snapshot().source_mode, SourceMode::Offline);
    assert_eq!(s.snapshot().questions[0].id, "m1");
  }

  #[test]
  fn timer_expiry_answers_with_sentinel() {
    // Scenario C: let question 3's timer run out without a selection.
    let mut s = active_session();
    for _ in 0..2 {
      s.submit_answer(correct_index(&s));
      assert!(matches!(s.advance(), Advanced::Next(_)));
    }
    let score_before = s.score();
    let gen = s.generation();
    for _ in 0..TIMER_SECONDS {
      s.timer_tick(gen);
    }
    let snap = s.snapshot();
    assert!(snap.is_answered);
    assert_eq!(snap.selected_answer, Some(NO_SELECTION));
    assert_eq!(snap.remaining_seconds, 0);
    assert_eq!(s.score(), score_before);
  }

  #[test]
  fn timeout_equivalent_to_out_of_range_answer() {
    let mut by_timeout = active_session();
    let gen = by_timeout.generation();
    for _ in 0..TIMER_SECONDS {
      by_timeout.timer_tick(gen);
    }

    let mut by_submit = active_session();
    by_submit.submit_answer(NO_SELECTION);

    let a = by_timeout.snapshot();
    let b = by_submit.snapshot();
    assert_eq!(a.is_answered, b.is_answered);
    assert_eq!(a.selected_answer, b.selected_answer);
    assert_eq!(a.score, b.score);
    assert_eq!(a.score, 0);
  }

  #[test]
  fn submit_is_idempotent_first_answer_wins() {
    let mut s = active_session();
    let right = correct_index(&s);
    let wrong = (right + 1) % 4;
    assert!(s.submit_answer(wrong));
    let after_first = s.snapshot();
    // Second attempt, even with the correct answer, is a no-op.
    assert!(!s.submit_answer(right));
    let after_second = s.snapshot();
    assert_eq!(after_first.selected_answer, after_second.selected_answer);
    assert_eq!(after_first.score, after_second.score);
    assert_eq!(after_second.score, 0);
  }

  #[test]
  fn score_never_exceeds_questions_seen() {
    let mut s = active_session();
    loop {
      s.submit_answer(correct_index(&s));
      assert!(s.score() <= s.snapshot().current_index as u32 + 1);
      match s.advance() {
        Advanced::Next(_) => continue,
        _ => break,
      }
    }
  }

  #[test]
  fn advance_requires_an_answer() {
    let mut s = active_session();
    assert_eq!(s.advance(), Advanced::Rejected);
    s.submit_answer(0);
    assert!(matches!(s.advance(), Advanced::Next(_)));
  }

  #[test]
  fn stale_timer_ticks_are_rejected() {
    let mut s = active_session();
    let old_gen = s.generation();
    s.submit_answer(0);
    assert!(matches!(s.advance(), Advanced::Next(_)));
    // Tick from the previous question's ticker must not touch the new one.
    assert!(!s.timer_tick(old_gen));
    assert_eq!(s.snapshot().remaining_seconds, TIMER_SECONDS);
  }

  #[test]
  fn stale_fetch_result_is_dropped() {
    let mut s = QuizSession::new();
    let gen = s.begin_loading("10", "Science").unwrap();
    s.exit();
    assert!(s.questions_ready(gen, science_set(), SourceMode::Offline).is_none());
    assert_eq!(s.phase(), Phase::Selection);
  }

  #[test]
  fn restart_resets_exactly() {
    let mut s = active_session();
    s.submit_answer(correct_index(&s));
    s.advance();
    s.restart();
    let snap = s.snapshot();
    assert_eq!(snap.phase, Phase::Selection);
    assert_eq!(snap.score, 0);
    assert_eq!(snap.current_index, 0);
    assert!(!snap.is_answered);
    assert!(snap.questions.is_empty());
  }

  #[test]
  fn exit_mid_session_never_reports_completion() {
    // Scenario D: wrong on q1, right on q2, exit before q3.
    let mut s = active_session();
    let wrong = (correct_index(&s) + 1) % 4;
    s.submit_answer(wrong);
    assert!(matches!(s.advance(), Advanced::Next(_)));
    s.submit_answer(correct_index(&s));
    let gen_before_exit = s.generation();
    // Exit instead of advancing; no Finished is ever produced.
    s.exit();
    assert_eq!(s.phase(), Phase::Selection);
    // A ticker from the abandoned question fires late: rejected.
    assert!(!s.timer_tick(gen_before_exit));
    assert_eq!(s.advance(), Advanced::Rejected);
  }

  #[test]
  fn completion_reported_exactly_once() {
    let mut s = active_session();
    loop {
      s.submit_answer(0);
      match s.advance() {
        Advanced::Next(_) => continue,
        Advanced::Finished(_) => break,
        Advanced::Rejected => panic!("unexpected rejection"),
      }
    }
    assert_eq!(s.advance(), Advanced::Rejected);
  }

  #[test]
  fn loading_failure_degrades_to_selection() {
    let mut s = QuizSession::new();
    let gen = s.begin_loading("6", "Science").unwrap();
    assert!(s.loading_failed(gen, "no questions available"));
    let snap = s.snapshot();
    assert_eq!(snap.phase, Phase::Selection);
    assert!(snap.load_error.is_some());
  }

  #[test]
  fn start_rejected_outside_selection() {
    let mut s = active_session();
    assert!(s.begin_loading("10", "Science").is_none());
  }

  #[test]
  fn timer_never_goes_negative() {
    let mut s = active_session();
    let gen = s.generation();
    for _ in 0..(TIMER_SECONDS + 10) {
      s.timer_tick(gen);
    }
    assert_eq!(s.snapshot().remaining_seconds, 0);
  }
}
