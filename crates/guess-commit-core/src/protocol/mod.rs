//! Protocol types and outcome messages.

mod messages;
mod types;

pub use messages::{GuessOutcome, RevealOutcome, RevealStatus, SessionStats};
pub use types::{GuessRange, Phase, SessionId};
