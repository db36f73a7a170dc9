//! Solver behaviors shared by HTTP and WebSocket handlers: free-text and
//! image pass-throughs to the generative model, with offline stub fallbacks
//! so the tutor always answers something.

use rand::seq::SliceRandom;
use tracing::{debug, error, instrument};

use crate::domain::Locale;
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state, prompt), fields(prompt_len = prompt.len(), ?locale))]
pub async fn solve_text(state: &AppState, prompt: &str, locale: Locale) -> String {
  debug!(target: "solver", prompt = %trunc_for_log(prompt, 80), "Solver request");
  if let Some(ai) = &state.gemini {
    match ai.solve_text(&state.prompts, prompt, locale).await {
      Ok(t) if !t.trim().is_empty() => return t,
      Ok(_) => error!(target: "solver", "Empty solver response; using offline stub"),
      Err(e) => error!(target: "solver", error = %e, "Solver call failed; using offline stub"),
    }
  }
  offline_solver_stub(locale)
}

#[instrument(level = "info", skip(state, image_base64), fields(b64_len = image_base64.len(), %mime, ?locale))]
pub async fn solve_image(state: &AppState, image_base64: &str, mime: &str, locale: Locale) -> String {
  if let Some(ai) = &state.gemini {
    match ai.solve_image(&state.prompts, image_base64, mime).await {
      Ok(t) if !t.trim().is_empty() => return t,
      Ok(_) => error!(target: "solver", "Empty scanner response; using offline stub"),
      Err(e) => error!(target: "solver", error = %e, "Scanner call failed; using offline stub"),
    }
  }
  offline_scanner_stub(locale)
}

// -------- Local fallbacks --------

fn offline_solver_stub(locale: Locale) -> String {
  let en: [&str; 3] = [
    "Master Sahab is currently in Offline Mode. I can help with quizzes, but for complex AI answers, please check your internet.",
    "Guru is taking a short break (Offline). Use our Master Quizzes in the meantime!",
    "Master Sahab is offline. Using Local Brain.",
  ];
  let hi: [&str; 2] = [
    "मास्टर साहब ऑफलाइन हैं। लोकल ब्रेन काम कर रहा है।",
    "मास्टर साहब थोड़ी देर के लिए ऑफलाइन हैं। तब तक मास्टर क्विज़ आज़माएँ!",
  ];
  let mut rng = rand::thread_rng();
  match locale {
    Locale::Hi => hi.choose(&mut rng).copied().unwrap_or(hi[0]).to_string(),
    Locale::En => en.choose(&mut rng).copied().unwrap_or(en[0]).to_string(),
  }
}

fn offline_scanner_stub(locale: Locale) -> String {
  match locale {
    Locale::Hi => "कैमरे से हल करने के लिए इंटरनेट कनेक्शन ज़रूरी है। कृपया नेटवर्क जाँचें।".into(),
    Locale::En => {
      "Scanner needs an active internet connection to process images via AI. Please check your network and try again.".into()
    }
  }
}
