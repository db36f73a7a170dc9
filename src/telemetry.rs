//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! LOG_LEVEL accepts a single level ("debug") or full filter directives;
//! LOG_FORMAT selects "pretty" (default) or "json" structured output.
//! The HTTP TraceLayer adds per-request spans on top of this.

use tracing_subscriber::EnvFilter;

/// Per-target defaults when LOG_LEVEL is unset. Quiz and solver flows are
/// the interesting ones during development, so they default to debug.
const DEFAULT_DIRECTIVES: &str =
  "info,quiz=debug,bank=info,solver=debug,profile=info,sahab_backend=debug,tower_http=info,axum=info";

pub fn init_tracing() {
  let filter = EnvFilter::try_from_env("LOG_LEVEL")
    .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(true)
    .with_file(true)
    .with_line_number(true);

  // json() changes the builder type, so branch at init time.
  if matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json")) {
    builder.json().init();
  } else {
    builder.init();
  }
}
