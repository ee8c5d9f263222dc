//! Canned refutations of common logical fallacies.

use rand::seq::SliceRandom;
use rand::Rng;

/// Fallacy names, index-aligned with [`REFUTATIONS`].
pub const FALLACIES: [&str; 11] = [
    "Ad Hominem",
    "Straw Man",
    "False Dilemma",
    "Slippery Slope",
    "Circular Reasoning",
    "Hasty Generalization",
    "Red Herring",
    "Post Hoc Ergo Propter Hoc",
    "Appeal to Authority",
    "Bandwagon Fallacy",
    "False Equivalence",
];

pub const REFUTATIONS: [&str; 11] = [
    "This is an ad hominem fallacy. Let's focus on the argument itself rather than attacking the person.",
    "This is a straw man fallacy. The argument is being misrepresented.",
    "This is a false dilemma fallacy. There are more options than presented.",
    "This is a slippery slope fallacy. The conclusion does not necessarily follow from the premise.",
    "This is circular reasoning. The argument's conclusion is used as a premise.",
    "This is a hasty generalization. The conclusion is based on insufficient evidence.",
    "This is a red herring fallacy. The argument is being diverted to an irrelevant topic.",
    "This is a post hoc ergo propter hoc fallacy. Correlation does not imply causation.",
    "This is an appeal to authority fallacy. The argument relies on the opinion of an authority figure.",
    "This is a bandwagon fallacy. The argument assumes something is true because many people believe it.",
    "This is a false equivalence fallacy. The argument equates two things that are not equivalent.",
];

/// Pick a refutation at random. The argument itself is not inspected.
pub fn identify_and_refute_fallacies(argument: &str) -> String {
    refute_with(argument, &mut rand::thread_rng())
}

pub fn refute_with<R: Rng + ?Sized>(_argument: &str, rng: &mut R) -> String {
    REFUTATIONS
        .choose(rng)
        .copied()
        .unwrap_or(REFUTATIONS[0])
        .to_string()
}
