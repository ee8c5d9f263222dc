//! Intensity backend: rule-based valence scoring with a compound summary.
//!
//! Each token gets a valence from the lexicon, adjusted for preceding booster
//! words and negations, ALL-CAPS emphasis, a contrastive "but", and trailing
//! `!`/`?` emphasis. The summed valence is normalized into `compound`.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::{round3, Backend, IntensityScores, SentimentAnalyzer, SentimentResult};

/// Added to (or subtracted from) a valence by a preceding booster.
const BOOSTER_INCREMENT: f64 = 0.293;
/// Added to a valence when the word is shouted in mixed-case text.
const CAPS_INCREMENT: f64 = 0.733;
/// Applied to a valence within three tokens of a negation.
const NEGATION_SCALAR: f64 = -0.74;
/// Per-exclamation-mark emphasis, up to four marks.
const EXCLAMATION_INCREMENT: f64 = 0.292;
/// Per-question-mark emphasis when there are two or three.
const QUESTION_INCREMENT: f64 = 0.18;
/// Normalization constant for the compound score.
const ALPHA: f64 = 15.0;

static VALENCE: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        ("amazing", 2.8),
        ("awesome", 3.1),
        ("awful", -2.0),
        ("bad", -2.5),
        ("beautiful", 2.9),
        ("best", 3.2),
        ("boring", -1.3),
        ("broken", -1.8),
        ("brilliant", 2.8),
        ("disappointing", -2.2),
        ("excellent", 3.2),
        ("fantastic", 2.6),
        ("fine", 0.8),
        ("good", 1.9),
        ("great", 3.1),
        ("happy", 2.7),
        ("hate", -2.7),
        ("horrible", -2.5),
        ("interesting", 1.7),
        ("kind", 2.4),
        ("like", 2.0),
        ("love", 3.2),
        ("lovely", 2.8),
        ("nice", 1.8),
        ("poor", -2.1),
        ("sad", -2.1),
        ("terrible", -2.1),
        ("thanks", 1.9),
        ("ugly", -2.3),
        ("useful", 1.9),
        ("useless", -1.8),
        ("wonderful", 2.7),
        ("worse", -2.1),
        ("worst", -3.1),
        ("wrong", -2.1),
    ]
    .into_iter()
    .collect()
});

static BOOSTERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        ("absolutely", BOOSTER_INCREMENT),
        ("completely", BOOSTER_INCREMENT),
        ("extremely", BOOSTER_INCREMENT),
        ("incredibly", BOOSTER_INCREMENT),
        ("really", BOOSTER_INCREMENT),
        ("so", BOOSTER_INCREMENT),
        ("totally", BOOSTER_INCREMENT),
        ("very", BOOSTER_INCREMENT),
        ("barely", -BOOSTER_INCREMENT),
        ("hardly", -BOOSTER_INCREMENT),
        ("kinda", -BOOSTER_INCREMENT),
        ("slightly", -BOOSTER_INCREMENT),
        ("somewhat", -BOOSTER_INCREMENT),
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, Copy, Default)]
pub struct IntensityAnalyzer;

impl IntensityAnalyzer {
    pub fn polarity_scores(&self, text: &str) -> IntensityScores {
        let tokens: Vec<&str> = text
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| c.is_ascii_punctuation() && c != '\''))
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return IntensityScores {
                neu: 1.0,
                ..IntensityScores::default()
            };
        }

        let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
        let cap_differential = is_cap_differential(&tokens);

        let mut sentiments: Vec<f64> = Vec::with_capacity(tokens.len());
        for (i, word) in lowered.iter().enumerate() {
            if BOOSTERS.contains_key(word.as_str()) || is_negation(word) {
                sentiments.push(0.0);
                continue;
            }
            let Some(&base) = VALENCE.get(word.as_str()) else {
                sentiments.push(0.0);
                continue;
            };

            let mut valence = base;
            if cap_differential && is_shouted(tokens[i]) {
                valence += CAPS_INCREMENT * valence.signum();
            }
            for distance in 1..=3 {
                if distance > i {
                    break;
                }
                let prev = lowered[i - distance].as_str();
                if let Some(&boost) = BOOSTERS.get(prev) {
                    let decay = match distance {
                        1 => 1.0,
                        2 => 0.95,
                        _ => 0.9,
                    };
                    valence += boost * valence.signum() * decay;
                }
                if is_negation(prev) {
                    valence *= NEGATION_SCALAR;
                }
            }
            sentiments.push(valence);
        }

        // Clauses after "but" dominate the ones before it.
        if let Some(pivot) = lowered.iter().position(|w| w == "but") {
            for (i, s) in sentiments.iter_mut().enumerate() {
                if i < pivot {
                    *s *= 0.5;
                } else if i > pivot {
                    *s *= 1.5;
                }
            }
        }

        let emphasis = punctuation_emphasis(text);
        let mut total: f64 = sentiments.iter().sum();
        if total != 0.0 {
            total += emphasis * total.signum();
        }
        let compound = normalize(total);

        let mut pos_sum = 0.0;
        let mut neg_sum = 0.0;
        let mut neu_count = 0.0;
        for &s in &sentiments {
            if s > 0.0 {
                pos_sum += s + 1.0;
            } else if s < 0.0 {
                neg_sum += s - 1.0;
            } else {
                neu_count += 1.0;
            }
        }
        if pos_sum > neg_sum.abs() {
            pos_sum += emphasis;
        } else if pos_sum < neg_sum.abs() {
            neg_sum -= emphasis;
        }

        let denominator = pos_sum + neg_sum.abs() + neu_count;
        IntensityScores {
            neg: round3((neg_sum / denominator).abs()),
            neu: round3((neu_count / denominator).abs()),
            pos: round3((pos_sum / denominator).abs()),
            compound: (compound * 10_000.0).round() / 10_000.0,
        }
    }
}

impl SentimentAnalyzer for IntensityAnalyzer {
    fn backend(&self) -> Backend {
        Backend::Intensity
    }

    fn analyze(&self, text: &str) -> SentimentResult {
        SentimentResult::Intensity(self.polarity_scores(text))
    }
}

fn is_negation(word: &str) -> bool {
    super::NEGATIONS.contains(&word) || word.ends_with("n't")
}

fn is_shouted(token: &str) -> bool {
    token.chars().any(|c| c.is_alphabetic()) && !token.chars().any(|c| c.is_lowercase())
}

/// True when some, but not all, tokens are shouted.
fn is_cap_differential(tokens: &[&str]) -> bool {
    let shouted = tokens.iter().filter(|t| is_shouted(t)).count();
    shouted > 0 && shouted < tokens.len()
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(4) as f64;
    let questions = text.matches('?').count();
    let question_emphasis = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * QUESTION_INCREMENT,
        _ => 0.96,
    };
    exclamations * EXCLAMATION_INCREMENT + question_emphasis
}

fn normalize(score: f64) -> f64 {
    (score / (score * score + ALPHA).sqrt()).clamp(-1.0, 1.0)
}
