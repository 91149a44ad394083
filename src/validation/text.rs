//! Story text validation: readability, length, and prohibited content.

use super::ValidationReport;
use crate::error::{Result, StoryError};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Whole-word patterns a children's story must not contain.
pub const DEFAULT_PROHIBITED_TERMS: &[&str] = &[
    // Violence and weapons
    r"\bviolence\b", r"\bwar\b", r"\bdeath\b", r"\battack\b", r"\bgun\b", r"\bknife\b",
    r"\bbomb\b", r"\btorture\b", r"\bmurder\b", r"\babuse\b", r"\binjure\b", r"\bexplode\b",
    r"\bpoison\b",
    // Hate and prejudice
    r"\bhate\b", r"\bracism\b", r"\bbully\b", r"\bprejudice\b", r"\boppress\b", r"\bslur\b",
    r"\bdiscriminate\b", r"\binsult\b",
    // Horror
    r"\bghost\b", r"\bnightmare\b", r"\bterror\b", r"\bcreepy\b", r"\bevil\b", r"\bhaunt\b",
    r"\bskeleton\b", r"\bzombie\b",
    // Adult themes
    r"\balcohol\b", r"\bdrugs\b", r"\bsex\b", r"\bnudity\b", r"\bporn\b", r"\bstrip\b",
    r"\bseduce\b",
    // Self-harm
    r"\bsuicide\b", r"\bdepress\b",
    // Name-calling
    r"\bloser\b", r"\bugly\b", r"\bdumb\b", r"\bidiot\b", r"\bfool\b", r"\bfat\b",
    r"\bstupid\b",
    // Crime
    r"\bsteal\b", r"\bcrime\b", r"\bjail\b",
];

/// Acceptance ranges for a full story. All bounds are inclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextThresholds {
    pub min_reading_ease: f64,
    pub max_reading_ease: f64,
    pub min_grade_level: f64,
    pub max_grade_level: f64,
    pub min_words: usize,
    pub max_words: usize,
    /// Case-insensitive regular expressions; any match rejects the story.
    pub prohibited_terms: Vec<String>,
}

impl Default for TextThresholds {
    fn default() -> Self {
        Self {
            min_reading_ease: 75.0,
            max_reading_ease: 100.0,
            min_grade_level: 0.0,
            max_grade_level: 6.0,
            min_words: 800,
            max_words: 1300,
            prohibited_terms: DEFAULT_PROHIBITED_TERMS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Compiled set of prohibited patterns.
#[derive(Debug, Clone)]
pub struct Denylist {
    patterns: Vec<(String, Regex)>,
}

impl Denylist {
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Result<Self> {
        let patterns = terms
            .iter()
            .map(|term| {
                let term = term.as_ref();
                RegexBuilder::new(term)
                    .case_insensitive(true)
                    .build()
                    .map(|re| (term.to_string(), re))
                    .map_err(|e| {
                        StoryError::Config(format!("Invalid prohibited term '{}': {}", term, e))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Patterns that match anywhere in `text`.
    pub fn matches(&self, text: &str) -> Vec<String> {
        self.patterns
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(term, _)| term.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Measurements taken over a full story.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMetrics {
    /// Flesch reading ease.
    pub reading_ease: f64,
    /// Flesch-Kincaid grade level.
    pub grade_level: f64,
    /// Whitespace-separated word count.
    pub word_count: usize,
    /// Prohibited patterns found in the text.
    pub flagged_terms: Vec<String>,
}

/// Validates a complete three-section story.
#[derive(Debug, Clone)]
pub struct TextValidator {
    thresholds: TextThresholds,
    denylist: Denylist,
}

impl TextValidator {
    pub fn new(thresholds: TextThresholds) -> Result<Self> {
        let denylist = Denylist::new(&thresholds.prohibited_terms)?;
        Ok(Self {
            thresholds,
            denylist,
        })
    }

    pub fn thresholds(&self) -> &TextThresholds {
        &self.thresholds
    }

    /// Compute readability, length, and denylist metrics.
    pub fn measure(&self, text: &str) -> TextMetrics {
        let word_count = text.split_whitespace().count();
        let (reading_ease, grade_level) = readability(text);

        TextMetrics {
            reading_ease,
            grade_level,
            word_count,
            flagged_terms: self.denylist.matches(text),
        }
    }

    /// Judge previously computed metrics. The four gates are independent.
    pub fn judge(&self, metrics: &TextMetrics) -> ValidationReport {
        let t = &self.thresholds;
        let flagged = if metrics.flagged_terms.is_empty() {
            "none".to_string()
        } else {
            metrics.flagged_terms.join(", ")
        };

        ValidationReport::new()
            .check(
                "reading_ease",
                format!("{:.2}", metrics.reading_ease),
                format!("{}-{}", t.min_reading_ease, t.max_reading_ease),
                (t.min_reading_ease..=t.max_reading_ease).contains(&metrics.reading_ease),
            )
            .check(
                "grade_level",
                format!("{:.2}", metrics.grade_level),
                format!("{}-{}", t.min_grade_level, t.max_grade_level),
                (t.min_grade_level..=t.max_grade_level).contains(&metrics.grade_level),
            )
            .check(
                "word_count",
                metrics.word_count.to_string(),
                format!("{}-{}", t.min_words, t.max_words),
                (t.min_words..=t.max_words).contains(&metrics.word_count),
            )
            .check(
                "prohibited_terms",
                flagged,
                "none",
                metrics.flagged_terms.is_empty(),
            )
    }

    pub fn validate(&self, text: &str) -> ValidationReport {
        self.judge(&self.measure(text))
    }
}

/// Flesch reading ease and Flesch-Kincaid grade for `text`.
fn readability(text: &str) -> (f64, f64) {
    let words: Vec<&str> = text
        .split_whitespace()
        .filter(|w| w.chars().any(|c| c.is_alphanumeric()))
        .collect();
    if words.is_empty() {
        return (0.0, 0.0);
    }

    // Fragments of two words or fewer ("Mr", "Oh no") are not sentences.
    let sentences = text
        .split(['.', '!', '?'])
        .filter(|s| lexicon_count(s) > 2)
        .count()
        .max(1);
    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();

    let words_per_sentence = words.len() as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / words.len() as f64;

    let ease = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;
    let grade = 0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59;
    (ease, grade)
}

fn lexicon_count(text: &str) -> usize {
    text.split_whitespace()
        .filter(|w| w.chars().any(|c| c.is_alphanumeric()))
        .count()
}

/// Estimate syllables in an English word by counting vowel groups.
///
/// A trailing silent "e" is dropped unless the word ends in consonant + "le".
pub fn count_syllables(word: &str) -> usize {
    let letters: Vec<char> = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(|c| c.to_lowercase())
        .collect();
    if letters.is_empty() {
        return 0;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut count = 0;
    let mut prev_vowel = false;
    for &c in &letters {
        let vowel = is_vowel(c);
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }

    let n = letters.len();
    if n > 2 && letters[n - 1] == 'e' && count > 1 {
        let consonant_le = letters[n - 2] == 'l' && !is_vowel(letters[n - 3]);
        if !consonant_le {
            count -= 1;
        }
    }

    count.max(1)
}
