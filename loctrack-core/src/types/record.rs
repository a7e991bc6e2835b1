use serde::{Deserialize, Serialize};
use std::fmt;

use super::Interval;

/// Processing state carried by a claim record.
///
/// A `Claimed` record asserts ownership; a later `Processed` record for the
/// same interval marks the work finished. The transition is a new record,
/// never a mutation: history is append-only, and a worker restarting after
/// a crash tells "claimed but never finished" from "finished" by the latest
/// record per interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimState {
    Claimed,
    Processed,
}

impl ClaimState {
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimState::Claimed => "CLAIMED",
            ClaimState::Processed => "PROCESSED",
        }
    }

    /// Strict parse of the persisted form. Unknown strings are rejected so
    /// a corrupted store row fails the drain instead of being misread.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CLAIMED" => Some(ClaimState::Claimed),
            "PROCESSED" => Some(ClaimState::Processed),
            _ => None,
        }
    }
}

impl fmt::Display for ClaimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One appended entry in the claim history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord<I: Interval> {
    /// The interval this record is about.
    pub interval: I,
    /// The worker that owns (or owned) the interval.
    pub owner: String,
    /// Claimed or processed.
    pub state: ClaimState,
    /// Epoch milliseconds at append time. Diagnostic only.
    pub recorded_at: u64,
}

impl<I: Interval> ClaimRecord<I> {
    pub fn new(interval: I, owner: impl Into<String>, state: ClaimState, recorded_at: u64) -> Self {
        Self {
            interval,
            owner: owner.into(),
            state,
            recorded_at,
        }
    }
}

/// Result of a claim attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The caller owns the interval, either by winning it just now or by
    /// re-claiming an interval it already held.
    Owned,
    /// A different worker holds a conflicting claim; nothing was appended.
    OwnedByOther { owner: String },
}

impl ClaimOutcome {
    pub fn is_owned(&self) -> bool {
        matches!(self, ClaimOutcome::Owned)
    }
}
