//! Application state: the offline bank, prompts, optional Gemini client,
//! and the profile store.
//!
//! The bank is assembled once at startup (built-ins plus any TOML entries)
//! and immutable afterwards, so it needs no lock. The profile store guards
//! its own mutation internally.

use tracing::{error, info, instrument};

use crate::bank::QuestionBank;
use crate::config::{load_agent_config_from_env, Prompts};
use crate::gemini::Gemini;
use crate::profile::ProfileStore;

pub struct AppState {
  pub bank: QuestionBank,
  pub gemini: Option<Gemini>,
  pub prompts: Prompts,
  pub profile: ProfileStore,
}

impl AppState {
  /// Build state from env: load config, assemble the bank, init the client.
  #[instrument(level = "info", skip_all)]
  pub fn new() -> Self {
    let cfg_opt = load_agent_config_from_env();
    let prompts = cfg_opt
      .as_ref()
      .map(|c| c.prompts.clone())
      .unwrap_or_default();

    let mut bank = QuestionBank::built_in();
    if let Some(cfg) = &cfg_opt {
      for qc in &cfg.questions {
        match qc.question.clone().into_question() {
          Ok(q) => bank.insert(&qc.subject, q),
          Err(e) => {
            error!(target: "bank", subject = %qc.subject, error = %e, "Skipping config bank item");
          }
        }
      }
    }
    bank.log_inventory();

    let gemini = Gemini::from_env();
    if let Some(ai) = &gemini {
      info!(target: "sahab_backend", base_url = %ai.base_url, model = %ai.model, "Gemini enabled.");
    } else {
      info!(target: "sahab_backend", "Gemini disabled (no GEMINI_API_KEY). Offline bank only.");
    }

    let profile = ProfileStore::from_env();

    Self { bank, gemini, prompts, profile }
  }
}
