//! User profile persistence: a single JSON blob on disk.
//!
//! The profile is read at session start (class pre-selection) and updated
//! when a quiz completes. Writes go through an in-memory copy guarded by a
//! tokio RwLock so concurrent handlers see a consistent profile.

use std::path::PathBuf;

use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use crate::domain::UserProfile;

/// XP awarded per correct answer.
const XP_PER_POINT: u64 = 10;

/// XP needed to move up one level.
const XP_PER_LEVEL: u64 = 450;

pub struct ProfileStore {
  path: PathBuf,
  cached: RwLock<UserProfile>,
}

impl ProfileStore {
  /// Store at PROFILE_PATH (default `./profile.json`), primed from disk if
  /// a profile exists there, otherwise a fresh default.
  pub fn from_env() -> Self {
    let path = PathBuf::from(
      std::env::var("PROFILE_PATH").unwrap_or_else(|_| "./profile.json".into()),
    );
    Self::at_path(path)
  }

  pub fn at_path(path: PathBuf) -> Self {
    let profile = match std::fs::read_to_string(&path) {
      Ok(s) => match serde_json::from_str::<UserProfile>(&s) {
        Ok(p) => {
          info!(target: "profile", path = %path.display(), name = %p.name, "Loaded profile");
          p
        }
        Err(e) => {
          warn!(target: "profile", path = %path.display(), error = %e, "Corrupt profile file; starting fresh");
          UserProfile::default()
        }
      },
      Err(_) => UserProfile::default(),
    };
    Self { path, cached: RwLock::new(profile) }
  }

  pub async fn get(&self) -> UserProfile {
    self.cached.read().await.clone()
  }

  /// Replace the stored profile and persist it.
  #[instrument(level = "info", skip(self, profile), fields(name = %profile.name))]
  pub async fn put(&self, profile: UserProfile) -> Result<UserProfile, String> {
    let mut cached = self.cached.write().await;
    *cached = profile;
    self.persist(&cached)?;
    Ok(cached.clone())
  }

  /// Fold a completed quiz into the cumulative stats.
  #[instrument(level = "info", skip(self))]
  pub async fn apply_quiz_result(&self, final_score: u32) -> Result<UserProfile, String> {
    let mut cached = self.cached.write().await;
    cached.score += final_score as u64;
    cached.xp += final_score as u64 * XP_PER_POINT;
    cached.level = (cached.xp / XP_PER_LEVEL) as u32 + 1;
    cached.quizzes_taken += 1;
    self.persist(&cached)?;
    info!(
      target: "profile",
      score = cached.score,
      xp = cached.xp,
      level = cached.level,
      quizzes = cached.quizzes_taken,
      "Quiz result applied"
    );
    Ok(cached.clone())
  }

  fn persist(&self, profile: &UserProfile) -> Result<(), String> {
    let body = serde_json::to_string_pretty(profile).map_err(|e| e.to_string())?;
    std::fs::write(&self.path, body).map_err(|e| {
      error!(target: "profile", path = %self.path.display(), error = %e, "Failed to write profile");
      e.to_string()
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn temp_store() -> ProfileStore {
    let path = std::env::temp_dir().join(format!("sahab-profile-{}.json", uuid::Uuid::new_v4()));
    ProfileStore::at_path(path)
  }

  #[tokio::test]
  async fn quiz_result_updates_cumulative_stats() {
    let store = temp_store();
    let p = store.apply_quiz_result(5).await.unwrap();
    assert_eq!(p.score, 5);
    assert_eq!(p.xp, 50);
    assert_eq!(p.level, 1);
    assert_eq!(p.quizzes_taken, 1);
  }

  #[tokio::test]
  async fn level_advances_with_xp() {
    let store = temp_store();
    let mut last = store.get().await;
    for _ in 0..10 {
      last = store.apply_quiz_result(5).await.unwrap();
    }
    assert_eq!(last.xp, 500);
    assert_eq!(last.level, 2);
    assert_eq!(last.quizzes_taken, 10);
  }

  #[tokio::test]
  async fn profile_round_trips_through_disk() {
    let path = std::env::temp_dir().join(format!("sahab-profile-{}.json", uuid::Uuid::new_v4()));
    {
      let store = ProfileStore::at_path(path.clone());
      let mut p = store.get().await;
      p.name = "Asha".into();
      p.class_level = "9".into();
      store.put(p).await.unwrap();
    }
    let reloaded = ProfileStore::at_path(path.clone());
    let p = reloaded.get().await;
    assert_eq!(p.name, "Asha");
    assert_eq!(p.class_level, "9");
    let _ = std::fs::remove_file(path);
  }
}
