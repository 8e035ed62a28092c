//! Shared domain types.

pub mod id;
pub mod participant;

pub use id::{ConnectionId, Identifier};
pub use participant::{Participant, ParticipantKind};
