//! Mining decisions from history and pitfalls from progress logs.

pub mod decisions;
pub mod history;
pub mod pitfalls;

pub use decisions::{DecisionKind, DecisionRecord, Impact};
pub use history::{GitHistory, HistoryEntry, HistorySource};
pub use pitfalls::PitfallRecord;
