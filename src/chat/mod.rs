//! Chat view-state: the message model, the one-request-at-a-time
//! controller, and the session driver used by the terminal front.

mod controller;
mod message;
mod session;

pub use controller::{ChatController, Phase, EXAMPLE_PROMPTS};
pub use message::{Message, Role};
pub use session::{ChatSession, TurnOutcome};
