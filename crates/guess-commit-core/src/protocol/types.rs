//! Protocol types.

use crate::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique session identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session lifecycle stage. Ordering follows the lifecycle; a session never
/// moves to a smaller phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    Committing,
    Guessing,
    Reveal,
    Closed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Committing => "committing",
            Phase::Guessing => "guessing",
            Phase::Reveal => "reveal",
            Phase::Closed => "closed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive `[min, max]` bounds for secrets and guesses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessRange {
    min: i64,
    max: i64,
}

impl GuessRange {
    pub fn new(min: i64, max: i64) -> Result<Self, GameError> {
        if min > max {
            return Err(GameError::InvalidConfig(format!(
                "range minimum {} exceeds maximum {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// `OutOfRange` unless `value` is inside the bounds
    pub fn check(&self, value: i64) -> Result<(), GameError> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(GameError::OutOfRange {
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

impl Default for GuessRange {
    /// The classic 1 to 100
    fn default() -> Self {
        Self { min: 1, max: 100 }
    }
}

impl fmt::Display for GuessRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
