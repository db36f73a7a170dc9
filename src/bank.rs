//! Built-in offline question bank and the subject/class catalog.
//!
//! The bank guarantees the app stays usable without network or an API key:
//! the source adapter falls back here whenever remote generation fails.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::domain::{Difficulty, LocalizedText, Question, QuestionKind};

pub const CLASSES: [&str; 7] = ["6", "7", "8", "9", "10", "11", "12"];
pub const SUBJECTS: [&str; 5] = [
  "Mathematics",
  "Science",
  "Social Studies",
  "English",
  "General Knowledge",
];

/// Subject served when the requested one has no offline entry.
pub const DEFAULT_SUBJECT: &str = "Science";

/// Static repository of offline question sets, keyed by subject.
#[derive(Clone, Debug, Default)]
pub struct QuestionBank {
  by_subject: HashMap<String, Vec<Question>>,
}

impl QuestionBank {
  /// Bank with only the built-in sets.
  pub fn built_in() -> Self {
    let mut bank = Self::default();
    for (subject, questions) in built_in_sets() {
      for q in questions {
        bank.insert(subject, q);
      }
    }
    bank
  }

  /// Empty bank, used by tests exercising the no-questions configuration error.
  pub fn empty() -> Self {
    Self::default()
  }

  /// Insert a question after validating it; invalid entries are skipped.
  pub fn insert(&mut self, subject: &str, q: Question) {
    if let Err(e) = q.validate() {
      warn!(target: "bank", %subject, error = %e, "Skipping invalid bank question");
      return;
    }
    self.by_subject.entry(subject.to_string()).or_default().push(q);
  }

  /// The offline set registered for a subject, if any.
  pub fn offline_set(&self, subject: &str) -> Option<Vec<Question>> {
    self.by_subject.get(subject).filter(|v| !v.is_empty()).cloned()
  }

  /// The set for `subject`, or the default subject's set when missing.
  /// Returns the subject actually served alongside the questions.
  pub fn offline_set_or_default(&self, subject: &str) -> Option<(Vec<Question>, String)> {
    if let Some(set) = self.offline_set(subject) {
      return Some((set, subject.to_string()));
    }
    self
      .offline_set(DEFAULT_SUBJECT)
      .map(|set| (set, DEFAULT_SUBJECT.to_string()))
  }

  pub fn is_empty(&self) -> bool {
    self.by_subject.values().all(|v| v.is_empty())
  }

  /// Startup inventory line per subject.
  pub fn log_inventory(&self) {
    for (subject, qs) in &self.by_subject {
      info!(target: "bank", %subject, count = qs.len(), "Offline bank inventory");
    }
  }
}

fn mcq(
  id: &str,
  text: LocalizedText,
  options: Vec<LocalizedText>,
  correct_answer: usize,
  explanation: LocalizedText,
  difficulty: Difficulty,
) -> Question {
  Question {
    id: id.into(),
    text,
    options,
    correct_answer,
    explanation,
    difficulty,
    kind: QuestionKind::Mcq,
  }
}

fn same(options: [&str; 4]) -> Vec<LocalizedText> {
  options.iter().map(|o| LocalizedText::bilingual(*o, *o)).collect()
}

fn pairs(options: [(&str, &str); 4]) -> Vec<LocalizedText> {
  options
    .iter()
    .map(|(en, hi)| LocalizedText::bilingual(*en, *hi))
    .collect()
}

fn built_in_sets() -> Vec<(&'static str, Vec<Question>)> {
  vec![
    (
      "Mathematics",
      vec![
        mcq(
          "m1",
          LocalizedText::bilingual("What is the square root of 625?", "625 का वर्गमूल क्या है?"),
          same(["15", "25", "35", "45"]),
          1,
          LocalizedText::bilingual("25 * 25 = 625.", "25 का वर्ग 625 होता है।"),
          Difficulty::Easy,
        ),
        mcq(
          "m2",
          LocalizedText::bilingual(
            "Sum of angles in a triangle is?",
            "त्रिभुज के कोणों का योग कितना होता है?",
          ),
          same(["90°", "180°", "270°", "360°"]),
          1,
          LocalizedText::bilingual(
            "The interior angles of a triangle always sum to 180°.",
            "त्रिभुज के आंतरिक कोणों का योग हमेशा 180° होता है।",
          ),
          Difficulty::Easy,
        ),
        mcq(
          "m3",
          LocalizedText::bilingual(
            "What is the formula for area of a circle?",
            "वृत्त के क्षेत्रफल का सूत्र क्या है?",
          ),
          same(["2πr", "πr²", "πd", "2πr²"]),
          1,
          LocalizedText::bilingual(
            "Area of circle = π * radius squared.",
            "वृत्त का क्षेत्रफल = π * (त्रिज्या का वर्ग)।",
          ),
          Difficulty::Medium,
        ),
        mcq(
          "m4",
          LocalizedText::bilingual("Value of (a+b)² is?", "(a+b)² का मान क्या है?"),
          same(["a²+b²", "a²+2ab+b²", "a²-2ab+b²", "a²+ab+b²"]),
          1,
          LocalizedText::bilingual(
            "Algebraic identity: (a+b)(a+b) = a²+2ab+b².",
            "बीजगणितीय पहचान: (a+b)² = a²+2ab+b²।",
          ),
          Difficulty::Easy,
        ),
        mcq(
          "m5",
          LocalizedText::bilingual(
            "A prime number has how many factors?",
            "एक अभाज्य संख्या के कितने गुणनखंड होते हैं?",
          ),
          pairs([("1", "1"), ("2", "2"), ("3", "3"), ("Infinite", "अनंत")]),
          1,
          LocalizedText::bilingual(
            "Prime numbers have only two factors: 1 and itself.",
            "अभाज्य संख्याओं के केवल दो गुणनखंड होते हैं: 1 और स्वयं वह संख्या।",
          ),
          Difficulty::Easy,
        ),
      ],
    ),
    (
      "Science",
      vec![
        mcq(
          "s1",
          LocalizedText::bilingual(
            "Which gas do plants absorb during photosynthesis?",
            "प्रकाश संश्लेषण के दौरान पौधे कौन सी गैस अवशोषित करते हैं?",
          ),
          pairs([
            ("Oxygen", "ऑक्सीजन"),
            ("Nitrogen", "नाइट्रोजन"),
            ("Carbon Dioxide", "कार्बन डाइऑक्साइड"),
            ("Hydrogen", "हाइड्रोजन"),
          ]),
          2,
          LocalizedText::bilingual(
            "Plants use CO2 to create glucose.",
            "पौधे ग्लूकोज बनाने के लिए CO2 का उपयोग करते हैं।",
          ),
          Difficulty::Easy,
        ),
        mcq(
          "s2",
          LocalizedText::bilingual(
            "What is the chemical symbol for Gold?",
            "सोने का रासायनिक प्रतीक क्या है?",
          ),
          same(["Ag", "Au", "Pb", "Fe"]),
          1,
          LocalizedText::bilingual(
            "Au comes from the Latin word 'Aurum'.",
            "Au लैटिन शब्द 'Aurum' से आया है।",
          ),
          Difficulty::Medium,
        ),
        mcq(
          "s3",
          LocalizedText::bilingual("Smallest unit of life is?", "जीवन की सबसे छोटी इकाई क्या है?"),
          pairs([
            ("Atom", "परमाणु"),
            ("Tissue", "ऊतक"),
            ("Cell", "कोशिका"),
            ("Organ", "अंग"),
          ]),
          2,
          LocalizedText::bilingual(
            "The cell is the basic structural and functional unit of life.",
            "कोशिका जीवन की बुनियादी संरचनात्मक और कार्यात्मक इकाई है।",
          ),
          Difficulty::Easy,
        ),
        mcq(
          "s4",
          LocalizedText::bilingual("Light travels in a...?", "प्रकाश किस दिशा में यात्रा करता है...?"),
          pairs([
            ("Curved line", "टेढ़ी रेखा"),
            ("Straight line", "सीधी रेखा"),
            ("Zigzag line", "टेढ़ी-मेढ़ी रेखा"),
            ("None", "कोई नहीं"),
          ]),
          1,
          LocalizedText::bilingual(
            "This is known as rectilinear propagation of light.",
            "इसे प्रकाश का ऋजुरेखीय संचरण कहा जाता है।",
          ),
          Difficulty::Easy,
        ),
        mcq(
          "s5",
          LocalizedText::bilingual("The SI unit of power is?", "शक्ति का SI मात्रक क्या है?"),
          pairs([
            ("Joule", "जूल"),
            ("Newton", "न्यूटन"),
            ("Watt", "वाट"),
            ("Volt", "वोल्ट"),
          ]),
          2,
          LocalizedText::bilingual(
            "Watt is defined as 1 Joule per second.",
            "वाट को 1 जूल प्रति सेकंड के रूप में परिभाषित किया गया है।",
          ),
          Difficulty::Easy,
        ),
      ],
    ),
    (
      "General Knowledge",
      vec![
        mcq(
          "g1",
          LocalizedText::bilingual(
            "Who is the Prime Minister of India? (2024)",
            "भारत के प्रधानमंत्री कौन हैं? (2024)",
          ),
          pairs([
            ("Rahul Gandhi", "राहुल गांधी"),
            ("Narendra Modi", "नरेंद्र मोदी"),
            ("Amit Shah", "अमित शाह"),
            ("Droupadi Murmu", "द्रौपदी मुर्मू"),
          ]),
          1,
          LocalizedText::bilingual(
            "Shri Narendra Modi is the current PM.",
            "श्री नरेंद्र मोदी वर्तमान पीएम हैं।",
          ),
          Difficulty::Easy,
        ),
        mcq(
          "g2",
          LocalizedText::bilingual(
            "Largest state of India by area is?",
            "क्षेत्रफल के अनुसार भारत का सबसे बड़ा राज्य कौन सा है?",
          ),
          pairs([
            ("Uttar Pradesh", "उत्तर प्रदेश"),
            ("Maharashtra", "महाराष्ट्र"),
            ("Rajasthan", "राजस्थान"),
            ("Madhya Pradesh", "मध्य प्रदेश"),
          ]),
          2,
          LocalizedText::bilingual(
            "Rajasthan covers the largest land area.",
            "राजस्थान सबसे बड़े भूमि क्षेत्र को कवर करता है।",
          ),
          Difficulty::Easy,
        ),
      ],
    ),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::validate_set;

  #[test]
  fn built_in_sets_are_well_formed() {
    let bank = QuestionBank::built_in();
    for subject in ["Mathematics", "Science", "General Knowledge"] {
      let set = bank.offline_set(subject).expect(subject);
      validate_set(&set).expect(subject);
    }
  }

  #[test]
  fn default_subject_is_registered() {
    let bank = QuestionBank::built_in();
    assert!(bank.offline_set(DEFAULT_SUBJECT).is_some());
  }

  #[test]
  fn unknown_subject_falls_back_to_default() {
    let bank = QuestionBank::built_in();
    let (set, served) = bank.offline_set_or_default("English").unwrap();
    assert_eq!(served, DEFAULT_SUBJECT);
    assert!(!set.is_empty());
  }

  #[test]
  fn invalid_insert_is_skipped() {
    let mut bank = QuestionBank::empty();
    let mut q = bank_probe();
    q.correct_answer = 9;
    bank.insert("Mathematics", q);
    assert!(bank.is_empty());
  }

  fn bank_probe() -> crate::domain::Question {
    QuestionBank::built_in().offline_set("Mathematics").unwrap()[0].clone()
  }
}
