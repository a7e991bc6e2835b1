use crate::error::CoordResult;
use crate::store::ClaimStore;
use crate::types::{ClaimRecord, Interval};

/// In-process claim store: a one-shot queue drained by the single tracker
/// that owns it.
///
/// Valid only when every worker is a thread of this process; nothing is
/// persisted, so process exit discards the history.
pub struct InMemoryClaimStore<I: Interval> {
    fresh: Vec<ClaimRecord<I>>,
}

impl<I: Interval> InMemoryClaimStore<I> {
    pub fn new() -> Self {
        Self { fresh: Vec::new() }
    }
}

impl<I: Interval> Default for InMemoryClaimStore<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Interval> ClaimStore<I> for InMemoryClaimStore<I> {
    fn append(&mut self, records: &[ClaimRecord<I>]) -> CoordResult<()> {
        self.fresh.extend_from_slice(records);
        Ok(())
    }

    fn drain_new(&mut self) -> CoordResult<Vec<ClaimRecord<I>>> {
        Ok(std::mem::take(&mut self.fresh))
    }
}
