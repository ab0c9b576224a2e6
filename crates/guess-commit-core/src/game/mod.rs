//! Guessing game: feedback tiers and the session state machine.

mod error;
mod feedback;
mod session;

pub use error::GameError;
pub use feedback::Feedback;
pub use session::Session;
