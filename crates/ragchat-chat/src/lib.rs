//! Conversation controller for RagChat.
//!
//! Owns the in-memory transcript and the parameters for the next question,
//! and turns each submitted question into exactly one backend call and one
//! assistant reply.

pub mod controller;
pub mod error;

pub use controller::{ConversationController, SkipReason, SubmitOutcome};
pub use error::ChatError;
