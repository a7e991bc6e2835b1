mod record;
mod span;

pub use record::{ClaimOutcome, ClaimRecord, ClaimState};
pub use span::{GenomeSpan, Interval};
