//! Adapters implementing the port traits.
//!
//! `live` talks to the real service, `recording` captures interactions into
//! cassettes, and `replaying` serves them back.

pub mod live;
pub mod recording;
pub mod replaying;
