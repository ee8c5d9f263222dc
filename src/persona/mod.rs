//! Persona responders.
//!
//! Each persona owns a small fixed set of templates that interpolate the
//! question verbatim; a response is one template drawn uniformly at random.
//! Template sets never overlap between personas. Newton is the exception: it
//! computes a "thought force" from the question length instead of sampling.

pub mod fallacy;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use fallacy::identify_and_refute_fallacies;

/// Returned by Newton for an empty question.
pub const NO_QUESTION: &str = "No question to think about.";

/// A named template-selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Newton,
    DaVinci,
    Einstein,
    SunTzu,
    Gandhi,
    AdaLovelace,
    HumanIntuition,
    NeuralNetwork,
    QuantumComputing,
    ResilientKindness,
}

impl Persona {
    /// Every persona, in composite order.
    pub const ALL: [Persona; 10] = [
        Self::Newton,
        Self::DaVinci,
        Self::Einstein,
        Self::SunTzu,
        Self::Gandhi,
        Self::AdaLovelace,
        Self::HumanIntuition,
        Self::NeuralNetwork,
        Self::QuantumComputing,
        Self::ResilientKindness,
    ];

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Newton => "Newton",
            Self::DaVinci => "Da Vinci",
            Self::Einstein => "Einstein",
            Self::SunTzu => "Sun Tzu",
            Self::Gandhi => "Gandhi",
            Self::AdaLovelace => "Ada Lovelace",
            Self::HumanIntuition => "Human Intuition",
            Self::NeuralNetwork => "Neural Network",
            Self::QuantumComputing => "Quantum Computing",
            Self::ResilientKindness => "Resilient Kindness",
        }
    }

    /// Function name under which the persona is registered.
    pub fn function_name(&self) -> &'static str {
        match self {
            Self::Newton => "newton_thoughts",
            Self::DaVinci => "davinci_insights",
            Self::Einstein => "einstein_insights",
            Self::SunTzu => "suntzu_insights",
            Self::Gandhi => "gandhi_insights",
            Self::AdaLovelace => "adalovelace_insights",
            Self::HumanIntuition => "human_intuition",
            Self::NeuralNetwork => "neural_network_thinking",
            Self::QuantumComputing => "quantum_computing_thinking",
            Self::ResilientKindness => "resilient_kindness",
        }
    }

    /// Look a persona up by display name or function name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|p| {
            p.name().to_lowercase() == wanted
                || p.function_name() == wanted
                || p.name().to_lowercase().replace(' ', "") == wanted.replace(&[' ', '_', '-'][..], "")
        })
    }

    /// Every response this persona can give for `question`.
    pub fn templates(&self, question: &str) -> Vec<String> {
        let q = question;
        match self {
            Self::Newton => vec![newton_thoughts(q)],
            Self::DaVinci => vec![
                format!("What if we view '{q}' from the perspective of the stars?"),
                format!("Consider '{q}' as if it's a masterpiece of the universe."),
                format!("Reflect on '{q}' through the lens of nature's design."),
            ],
            Self::Einstein => vec![
                format!("Einstein's perspective on {q}"),
                format!("Imagine riding a beam of light alongside '{q}'."),
                format!("Look at '{q}' from a different frame of reference."),
            ],
            Self::SunTzu => vec![
                format!("Sun Tzu's strategy for {q}"),
                format!("Know the terrain of '{q}' before you act."),
                format!("Win the contest over '{q}' before the battle begins."),
            ],
            Self::Gandhi => vec![
                format!("Gandhi's peaceful approach to {q}"),
                format!("Be the change you wish to see in '{q}'."),
                format!("Meet '{q}' with patience and nonviolence."),
            ],
            Self::AdaLovelace => vec![
                format!("Ada Lovelace's innovative take on {q}"),
                format!("Could an analytical engine weave '{q}' the way a loom weaves patterns?"),
                format!("Treat '{q}' as poetical science: imagination held to rigor."),
            ],
            Self::HumanIntuition => vec![
                format!("How does '{q}' make you feel?"),
                format!("What emotional connection do you have with '{q}'?"),
                format!("What does your gut instinct tell you about '{q}'?"),
            ],
            Self::NeuralNetwork => vec![
                format!("Process '{q}' through a multi-layered neural network."),
                format!("Apply deep learning to uncover hidden insights about '{q}'."),
                format!("Use machine learning to predict patterns in '{q}'."),
            ],
            Self::QuantumComputing => vec![
                format!("Consider '{q}' using quantum superposition principles."),
                format!("Apply quantum entanglement to find connections in '{q}'."),
                format!("Utilize quantum computing to solve '{q}' more efficiently."),
            ],
            Self::ResilientKindness => vec![
                format!("Despite losing everything, seeing '{q}' as a chance to grow."),
                format!("Finding strength in kindness when facing '{q}'."),
                format!("Embracing '{q}' as an opportunity for growth and compassion."),
            ],
        }
    }

    /// Draw one response using the thread-local RNG.
    pub fn respond(&self, question: &str) -> String {
        self.respond_with(question, &mut rand::thread_rng())
    }

    /// Draw one response using `rng`.
    pub fn respond_with<R: Rng + ?Sized>(&self, question: &str, rng: &mut R) -> String {
        let templates = self.templates(question);
        templates
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| NO_QUESTION.to_string())
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Newton's "thought force": mass (length) times acceleration (length / 2).
pub fn newton_thoughts(question: &str) -> String {
    if question.is_empty() {
        return NO_QUESTION.to_string();
    }
    let complexity = question.chars().count() as f64;
    let mass = complexity;
    let acceleration = complexity / 2.0;
    format!("Thought force: {:.1}", mass * acceleration)
}

/// One response from every persona, newline-separated, in [`Persona::ALL`] order.
pub fn universal_reasoning(question: &str) -> String {
    universal_reasoning_with(question, &mut rand::thread_rng())
}

pub fn universal_reasoning_with<R: Rng + ?Sized>(question: &str, rng: &mut R) -> String {
    Persona::ALL
        .iter()
        .map(|p| p.respond_with(question, &mut *rng))
        .collect::<Vec<_>>()
        .join("\n")
}
