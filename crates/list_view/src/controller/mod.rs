//! Controller layer: delegated events, query-state transitions, and load/delete orchestration.

pub mod events;
pub mod orchestration;
pub mod reducer;
