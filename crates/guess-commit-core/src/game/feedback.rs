//! Proximity feedback for guesses.

use serde::{Deserialize, Serialize};
use std::fmt;

const VERY_CLOSE_MAX: u64 = 5;
const WARM_MAX: u64 = 15;
const COLD_MAX: u64 = 30;

/// Distance tier between a guess and the secret
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Exact,
    VeryClose,
    Warm,
    Cold,
    VeryCold,
}

impl Feedback {
    /// Tier for `|guess - secret|`. A distance on a boundary lands in the
    /// tighter band.
    pub fn from_distance(distance: u64) -> Self {
        match distance {
            0 => Feedback::Exact,
            d if d <= VERY_CLOSE_MAX => Feedback::VeryClose,
            d if d <= WARM_MAX => Feedback::Warm,
            d if d <= COLD_MAX => Feedback::Cold,
            _ => Feedback::VeryCold,
        }
    }

    /// Tier for a guess against the secret
    pub fn for_guess(guess: i64, secret: i64) -> Self {
        Self::from_distance(guess.abs_diff(secret))
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Feedback::Exact)
    }

    /// Human-readable hint
    pub fn label(&self) -> &'static str {
        match self {
            Feedback::Exact => "Correct!",
            Feedback::VeryClose => "Very close!",
            Feedback::Warm => "Getting warmer",
            Feedback::Cold => "Getting colder",
            Feedback::VeryCold => "Very cold",
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
