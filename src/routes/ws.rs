//! WebSocket upgrade + message loop. One quiz session lives per connection;
//! the loop parses each client message, drives the session state machine,
//! and pushes a fresh snapshot on every transition and timer tick.
//!
//! The per-question countdown runs as a spawned task tagged with the
//! question's generation. The session rejects ticks whose generation no
//! longer matches, so an aborted-but-racing ticker can never mutate a
//! superseded question.

use std::sync::Arc;
use std::time::Duration;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use crate::logic::solve_text;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::session::{Advanced, QuizSession};
use crate::source::fetch_questions;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "sahab_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Countdown task handle for the current question. Stopped on answer,
/// advance, restart, exit, and connection teardown.
struct Ticker {
  tx: mpsc::Sender<u64>,
  handle: Option<JoinHandle<()>>,
}

impl Ticker {
  fn new(tx: mpsc::Sender<u64>) -> Self {
    Self { tx, handle: None }
  }

  /// Start a fresh one-second ticker tagged with `generation`.
  fn start(&mut self, generation: u64) {
    self.stop();
    let tx = self.tx.clone();
    self.handle = Some(tokio::spawn(async move {
      loop {
        tokio::time::sleep(Duration::from_secs(1)).await;
        if tx.send(generation).await.is_err() {
          break;
        }
      }
    }));
  }

  fn stop(&mut self) {
    if let Some(h) = self.handle.take() {
      h.abort();
    }
  }
}

impl Drop for Ticker {
  fn drop(&mut self) {
    self.stop();
  }
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "sahab_backend", "WebSocket connected");

  let mut session = QuizSession::new();
  let (tick_tx, mut tick_rx) = mpsc::channel::<u64>(8);
  let mut ticker = Ticker::new(tick_tx);

  'conn: loop {
    tokio::select! {
      incoming = socket.recv() => {
        let Some(Ok(msg)) = incoming else { break 'conn };
        match msg {
          Message::Text(txt) => {
            let replies = match serde_json::from_str::<ClientWsMessage>(&txt) {
              Ok(parsed) => {
                debug!(target: "sahab_backend", "WS received: {:?}", &parsed);
                handle_client_ws(parsed, &state, &mut session, &mut ticker).await
              }
              Err(e) => vec![ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }],
            };
            for reply in replies {
              if send_json(&mut socket, &reply).await.is_err() {
                break 'conn;
              }
            }
          }
          Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
          Message::Close(_) => break 'conn,
          _ => {}
        }
      }
      Some(generation) = tick_rx.recv() => {
        if session.timer_tick(generation) {
          if session.is_answered() {
            // Countdown reached zero: the question answered itself with the sentinel.
            ticker.stop();
          }
          let update = ServerWsMessage::Session { session: session.snapshot() };
          if send_json(&mut socket, &update).await.is_err() {
            break 'conn;
          }
        }
      }
    }
  }

  ticker.stop();
  info!(target: "sahab_backend", "WebSocket disconnected");
}

async fn send_json(socket: &mut WebSocket, msg: &ServerWsMessage) -> Result<(), ()> {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) })
      .to_string()
  });
  socket.send(Message::Text(out)).await.map_err(|e| {
    error!(target: "sahab_backend", error = %e, "WS send error");
  })
}

#[instrument(level = "info", skip(state, session, ticker))]
async fn handle_client_ws(
  msg: ClientWsMessage,
  state: &AppState,
  session: &mut QuizSession,
  ticker: &mut Ticker,
) -> Vec<ServerWsMessage> {
  match msg {
    ClientWsMessage::Ping => vec![ServerWsMessage::Pong],

    ClientWsMessage::StartQuiz { grade, subject, prefer_ai } => {
      let Some(generation) = session.begin_loading(&grade, &subject) else {
        // Invalid intent; report state as-is.
        return vec![ServerWsMessage::Session { session: session.snapshot() }];
      };
      ticker.stop();
      let mut out = vec![ServerWsMessage::Session { session: session.snapshot() }];

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
        Ok((questions, mode)) => {
          if let Some(tick_generation) = session.questions_ready(generation, questions, mode) {
            ticker.start(tick_generation);
          }
        }
        Err(e) => {
          session.loading_failed(generation, &e.to_string());
          out.push(ServerWsMessage::Error { message: e.to_string() });
        }
      }

      out.push(ServerWsMessage::Session { session: session.snapshot() });
      out
    }

    ClientWsMessage::SubmitAnswer { option_index } => {
      if session.submit_answer(option_index) {
        ticker.stop();
      }
      vec![ServerWsMessage::Session { session: session.snapshot() }]
    }

    ClientWsMessage::Advance => match session.advance() {
      Advanced::Next(generation) => {
        ticker.start(generation);
        vec![ServerWsMessage::Session { session: session.snapshot() }]
      }
      Advanced::Finished(score) => {
        ticker.stop();
        let total = session.snapshot().total_questions;
        let profile = match state.profile.apply_quiz_result(score).await {
          Ok(p) => p,
          Err(e) => {
            error!(target: "profile", error = %e, "Failed to persist quiz result");
            state.profile.get().await
          }
        };
        vec![
          ServerWsMessage::Session { session: session.snapshot() },
          ServerWsMessage::QuizComplete { score, total, profile },
        ]
      }
      Advanced::Rejected => vec![ServerWsMessage::Session { session: session.snapshot() }],
    },

    ClientWsMessage::Restart => {
      ticker.stop();
      session.restart();
      vec![ServerWsMessage::Session { session: session.snapshot() }]
    }

    ClientWsMessage::ExitQuiz => {
      ticker.stop();
      session.exit();
      vec![ServerWsMessage::Session { session: session.snapshot() }]
    }

    ClientWsMessage::Solve { prompt, locale } => {
      let text = solve_text(state, &prompt, locale).await;
      vec![ServerWsMessage::SolveResult { text }]
    }
  }
}
