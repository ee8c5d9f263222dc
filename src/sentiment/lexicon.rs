//! Lexicon backend: polarity and subjectivity averaged over known words.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{round3, Backend, PolarityScore, SentimentAnalyzer, SentimentResult};

/// (polarity, subjectivity) per word.
static LEXICON: Lazy<HashMap<&'static str, (f64, f64)>> = Lazy::new(|| {
    [
        ("amazing", (0.6, 0.9)),
        ("awesome", (1.0, 1.0)),
        ("bad", (-0.7, 0.667)),
        ("beautiful", (0.85, 1.0)),
        ("best", (1.0, 0.3)),
        ("boring", (-1.0, 1.0)),
        ("broken", (-0.4, 0.4)),
        ("brilliant", (0.9, 1.0)),
        ("disappointing", (-0.6, 0.7)),
        ("awful", (-1.0, 1.0)),
        ("excellent", (1.0, 1.0)),
        ("fantastic", (0.4, 0.9)),
        ("fine", (0.417, 0.5)),
        ("good", (0.7, 0.6)),
        ("great", (0.8, 0.75)),
        ("happy", (0.8, 1.0)),
        ("hate", (-0.8, 0.9)),
        ("horrible", (-1.0, 1.0)),
        ("interesting", (0.5, 0.5)),
        ("love", (0.5, 0.6)),
        ("lovely", (0.5, 0.75)),
        ("nice", (0.6, 1.0)),
        ("poor", (-0.4, 0.6)),
        ("sad", (-0.5, 1.0)),
        ("terrible", (-1.0, 1.0)),
        ("ugly", (-0.7, 1.0)),
        ("useful", (0.3, 0.0)),
        ("useless", (-0.5, 0.2)),
        ("wonderful", (1.0, 1.0)),
        ("worse", (-0.4, 0.6)),
        ("worst", (-1.0, 1.0)),
        ("wrong", (-0.5, 0.9)),
    ]
    .into_iter()
    .collect()
});

/// Multipliers applied to the next lexicon word.
static INTENSIFIERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        ("very", 1.3),
        ("really", 1.3),
        ("extremely", 1.5),
        ("incredibly", 1.4),
        ("so", 1.2),
        ("quite", 1.1),
        ("slightly", 0.5),
        ("somewhat", 0.7),
    ]
    .into_iter()
    .collect()
});

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z']+").expect("valid word regex"));

/// Negated words keep half their magnitude with the sign flipped.
const NEGATION_FACTOR: f64 = -0.5;

#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconAnalyzer;

impl LexiconAnalyzer {
    pub fn score(&self, text: &str) -> PolarityScore {
        let mut polarities = Vec::new();
        let mut subjectivities = Vec::new();
        let mut multiplier = 1.0;
        let mut negated = false;

        for m in WORD.find_iter(text) {
            let word = m.as_str().to_lowercase();
            if super::NEGATIONS.contains(&word.as_str()) || word.ends_with("n't") {
                negated = true;
                continue;
            }
            if let Some(factor) = INTENSIFIERS.get(word.as_str()) {
                multiplier *= factor;
                continue;
            }
            if let Some(&(polarity, subjectivity)) = LEXICON.get(word.as_str()) {
                let mut p = polarity * multiplier;
                if negated {
                    p *= NEGATION_FACTOR;
                }
                polarities.push(p.clamp(-1.0, 1.0));
                subjectivities.push((subjectivity * multiplier).min(1.0));
                multiplier = 1.0;
                negated = false;
            }
        }

        if polarities.is_empty() {
            return PolarityScore::default();
        }
        let n = polarities.len() as f64;
        PolarityScore {
            polarity: round3((polarities.iter().sum::<f64>() / n).clamp(-1.0, 1.0)),
            subjectivity: round3((subjectivities.iter().sum::<f64>() / n).clamp(0.0, 1.0)),
        }
    }
}

impl SentimentAnalyzer for LexiconAnalyzer {
    fn backend(&self) -> Backend {
        Backend::Lexicon
    }

    fn analyze(&self, text: &str) -> SentimentResult {
        SentimentResult::Polarity(self.score(text))
    }
}
