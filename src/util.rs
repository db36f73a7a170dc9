//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    s.to_string()
  } else {
    let mut end = max;
    while !s.is_char_boundary(end) {
      end -= 1;
    }
    format!("{}… ({} bytes total)", &s[..end], s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn template_fills_all_keys() {
    let out = fill_template(
      "Class {grade}, Subject: {subject}, count {count}",
      &[("grade", "8"), ("subject", "Science"), ("count", "5")],
    );
    assert_eq!(out, "Class 8, Subject: Science, count 5");
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    let s = "कक्षा चुनें और शुरू करें";
    let t = trunc_for_log(s, 10);
    assert!(t.contains("bytes total"));
  }
}
