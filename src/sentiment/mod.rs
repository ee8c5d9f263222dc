//! Sentiment scoring.
//!
//! Two interchangeable backends exist, and their outputs are deliberately not
//! unified: the lexicon backend yields a polarity/subjectivity pair, the
//! intensity backend yields negative/neutral/positive proportions plus a
//! compound score. [`SentimentResult`] carries whichever one was produced, so
//! callers branch on the variant.

pub mod intensity;
pub mod lexicon;

use serde::{Deserialize, Serialize};

pub use intensity::IntensityAnalyzer;
pub use lexicon::LexiconAnalyzer;

/// Words that flip the meaning of the following word.
pub const NEGATIONS: &[&str] = &["not", "no", "never", "none"];

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Output of the lexicon backend.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolarityScore {
    /// -1.0 (negative) .. 1.0 (positive).
    pub polarity: f64,
    /// 0.0 (objective) .. 1.0 (subjective).
    pub subjectivity: f64,
}

/// Output of the intensity backend.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IntensityScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    /// Normalized sum of valences, -1.0 .. 1.0.
    pub compound: f64,
}

/// A score from one backend. Produced fresh per call and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum SentimentResult {
    Polarity(PolarityScore),
    Intensity(IntensityScores),
}

impl SentimentResult {
    /// The backend's headline number: polarity or compound.
    pub fn headline(&self) -> f64 {
        match self {
            Self::Polarity(p) => p.polarity,
            Self::Intensity(i) => i.compound,
        }
    }
}

impl std::fmt::Display for SentimentResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Polarity(p) => write!(
                f,
                "polarity={:.3}, subjectivity={:.3}",
                p.polarity, p.subjectivity
            ),
            Self::Intensity(i) => write!(
                f,
                "neg={:.3}, neu={:.3}, pos={:.3}, compound={:.4}",
                i.neg, i.neu, i.pos, i.compound
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Backend selection
// ---------------------------------------------------------------------------

/// Which backend a caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Lexicon,
    Intensity,
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lexicon" | "textblob" => Ok(Self::Lexicon),
            "intensity" | "vader" => Ok(Self::Intensity),
            other => Err(format!("unknown sentiment backend: {}", other)),
        }
    }
}

/// A stateless sentiment backend.
pub trait SentimentAnalyzer: Send + Sync {
    fn backend(&self) -> Backend;

    fn analyze(&self, text: &str) -> SentimentResult;
}

/// Build the analyzer for `backend`.
pub fn analyzer(backend: Backend) -> Box<dyn SentimentAnalyzer> {
    match backend {
        Backend::Lexicon => Box::new(LexiconAnalyzer),
        Backend::Intensity => Box::new(IntensityAnalyzer),
    }
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Mark the word following a negation with a `NEG_` prefix.
///
/// Marking happens left to right on the already-marked sequence, so in
/// `"not not good"` only the second `not` is marked.
pub fn handle_negation(text: &str) -> String {
    let mut words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    for i in 0..words.len() {
        if NEGATIONS.contains(&words[i].as_str()) && i + 1 < words.len() {
            words[i + 1] = format!("NEG_{}", words[i + 1]);
        }
    }
    words.join(" ")
}

/// Placeholder sarcasm check: only the literal word "sarcasm" is detected.
pub fn detect_sarcasm(text: &str) -> bool {
    text.to_lowercase().contains("sarcasm")
}

/// Average of lexicon polarity and intensity compound.
pub fn ensemble(text: &str) -> f64 {
    let lexicon = LexiconAnalyzer.analyze(text).headline();
    let intensity = IntensityAnalyzer.analyze(text).headline();
    (lexicon + intensity) / 2.0
}

pub(crate) fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_negation_marks_next_word() {
        assert_eq!(handle_negation("this is not good"), "this is not NEG_good");
        assert_eq!(handle_negation("never again"), "never NEG_again");
        assert_eq!(handle_negation("trailing no"), "trailing no");
        assert_eq!(handle_negation("not not good"), "not NEG_not good");
    }

    #[test]
    fn test_detect_sarcasm() {
        assert!(detect_sarcasm("Oh great, SARCASM again"));
        assert!(!detect_sarcasm("genuinely great"));
    }

    #[test]
    fn test_backends_keep_their_shape() {
        let text = "I love this product! It's amazing.";
        assert!(matches!(
            analyzer(Backend::Lexicon).analyze(text),
            SentimentResult::Polarity(_)
        ));
        assert!(matches!(
            analyzer(Backend::Intensity).analyze(text),
            SentimentResult::Intensity(_)
        ));
    }

    #[test]
    fn test_ensemble_sign() {
        assert!(ensemble("I love this product! It's amazing.") > 0.0);
        assert!(ensemble("This is the worst thing I've ever bought.") < 0.0);
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("vader".parse::<Backend>().unwrap(), Backend::Intensity);
        assert_eq!("Lexicon".parse::<Backend>().unwrap(), Backend::Lexicon);
        assert!("bert".parse::<Backend>().is_err());
    }

    #[test]
    fn test_result_serializes_with_backend_tag() {
        let result = SentimentResult::Polarity(PolarityScore {
            polarity: 0.5,
            subjectivity: 0.6,
        });
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["backend"], "polarity");
        assert_eq!(json["polarity"], 0.5);
    }
}
