use crate::error::CoordResult;
use crate::types::{ClaimRecord, Interval};

/// Defines the contract for claim-history storage backends.
///
/// A store is an append-only log with a drain cursor. Concatenating the
/// results of repeated `drain_new` calls yields the full history of appends
/// (by every process sharing the store's target), each record exactly once
/// per store handle.
///
/// Stores carry no locking of their own: the tracker only calls them while
/// holding its [`WorkerLock`](crate::lock::WorkerLock), so correctness
/// follows entirely from that lock discipline.
pub trait ClaimStore<I: Interval> {
    /// Append records to the history. For shared stores each record must be
    /// durably persisted, and visible to other processes as an atomic unit,
    /// before this returns.
    fn append(&mut self, records: &[ClaimRecord<I>]) -> CoordResult<()>;

    /// Return every record appended since this handle's previous drain,
    /// in append order, including this handle's own appends.
    fn drain_new(&mut self) -> CoordResult<Vec<ClaimRecord<I>>>;

    /// Release any held resources. Safe to call more than once.
    fn close(&mut self) -> CoordResult<()> {
        Ok(())
    }
}
