//! The claim coordinator. Wraps one injected [`WorkerLock`] and one
//! pluggable [`ClaimStore`] behind the claim protocol that worker code
//! calls.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::error::{CoordError, CoordResult};
use crate::lock::WorkerLock;
use crate::store::ClaimStore;
use crate::store_in_memory::InMemoryClaimStore;
use crate::types::{ClaimOutcome, ClaimRecord, ClaimState, Interval};

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// How many claim decisions between progress lines on the status sink.
const STATUS_EVERY: u64 = 100;

/// Coordinates exclusive ownership of intervals among workers sharing one
/// claim history.
///
/// Every decision runs under the injected lock: drain the store, consult
/// the working set, then append (or not). With all callers holding the
/// same lock the check-then-append pair is atomic, which is the whole
/// at-most-one-claim guarantee. The tracker itself may be shared across
/// threads; methods take `&self`.
pub struct Tracker<I: Interval> {
    lock: WorkerLock,
    inner: Mutex<Inner<I>>,
}

struct Inner<I: Interval> {
    store: Box<dyn ClaimStore<I> + Send>,
    /// Working set: latest record per interval identity, folded from
    /// drained records.
    seen: HashMap<String, ClaimRecord<I>>,
    /// Full drained history, in append order.
    log: Vec<ClaimRecord<I>>,
    status: Option<Box<dyn Write + Send>>,
    claimed: u64,
    conflicted: u64,
    closed: bool,
}

impl<I: Interval> Tracker<I> {
    /// Create a tracker over an explicitly constructed lock and store.
    ///
    /// The lock is injected rather than created here so the same lock can
    /// be shared across several trackers when needed.
    pub fn new(lock: WorkerLock, store: Box<dyn ClaimStore<I> + Send>) -> Self {
        Self {
            lock,
            inner: Mutex::new(Inner {
                store,
                seen: HashMap::new(),
                log: Vec::new(),
                status: None,
                claimed: 0,
                conflicted: 0,
                closed: false,
            }),
        }
    }

    /// A tracker valid for single-process concurrency: in-process lock,
    /// nothing persisted.
    pub fn in_memory() -> Self {
        Self::new(WorkerLock::in_process(), Box::new(InMemoryClaimStore::new()))
    }

    /// A tracker over the shared SQLite store at `path`, for workers
    /// spread across processes. Pass a [`WorkerLock::file`] lock that all
    /// of them share.
    #[cfg(feature = "sqlite")]
    pub fn with_sqlite(lock: WorkerLock, path: &std::path::Path) -> CoordResult<Self>
    where
        I: serde::Serialize + serde::de::DeserializeOwned,
    {
        let store = crate::store_sqlite::SqliteClaimStore::open(path)?;
        Ok(Self::new(lock, Box::new(store)))
    }

    /// Attach a status sink receiving human-readable progress lines.
    /// Diagnostic only; there is no parsing contract.
    pub fn with_status(self, sink: Box<dyn Write + Send>) -> Self {
        self.inner.lock().status = Some(sink);
        self
    }

    /// Attempt to claim `interval` for `owner`.
    ///
    /// Returns [`ClaimOutcome::Owned`] when the caller wins the interval
    /// or already held it (a retry never conflicts with itself), and
    /// [`ClaimOutcome::OwnedByOther`] when a different worker holds a
    /// claim that overlaps or equals the request; nothing is appended in
    /// that case.
    pub fn claim(&self, interval: I, owner: &str) -> CoordResult<ClaimOutcome> {
        let _guard = self.lock.acquire()?;
        let mut inner = self.inner.lock();
        inner.ensure_open()?;
        inner.refresh()?;

        let conflict = inner.find_conflict(&interval).cloned();
        let outcome = match conflict {
            Some(existing) if existing.owner == owner => {
                debug!(interval = ?interval, owner, "re-claim by current owner");
                ClaimOutcome::Owned
            }
            Some(existing) => {
                debug!(interval = ?interval, owner, held_by = %existing.owner, "claim lost");
                inner.conflicted += 1;
                ClaimOutcome::OwnedByOther {
                    owner: existing.owner,
                }
            }
            None => {
                let record = ClaimRecord::new(interval, owner, ClaimState::Claimed, now_ms());
                inner.store.append(std::slice::from_ref(&record))?;
                debug!(interval = ?record.interval, owner, "claim granted");
                inner.seen.insert(record.interval.key(), record);
                inner.claimed += 1;
                ClaimOutcome::Owned
            }
        };
        inner.emit_status(false);
        Ok(outcome)
    }

    /// Record that `owner` finished processing `interval`.
    ///
    /// The latest record for the interval must belong to `owner`
    /// (post-condition of a successful [`claim`](Tracker::claim));
    /// otherwise this fails with [`CoordError::NotOwner`].
    pub fn mark_processed(&self, interval: &I, owner: &str) -> CoordResult<()> {
        let _guard = self.lock.acquire()?;
        let mut inner = self.inner.lock();
        inner.ensure_open()?;
        inner.refresh()?;

        let key = interval.key();
        match inner.seen.get(&key) {
            Some(existing) if existing.owner == owner => {}
            _ => {
                return Err(CoordError::NotOwner {
                    interval: key,
                    owner: owner.to_string(),
                });
            }
        }

        let record = ClaimRecord::new(interval.clone(), owner, ClaimState::Processed, now_ms());
        inner.store.append(std::slice::from_ref(&record))?;
        debug!(interval = ?interval, owner, "marked processed");
        inner.seen.insert(key, record);
        Ok(())
    }

    /// Latest record for `interval`, if any worker has claimed it.
    ///
    /// Restart triage: a `Claimed` latest record means the work was begun
    /// but never finished, a `Processed` one means it is done.
    pub fn latest(&self, interval: &I) -> CoordResult<Option<ClaimRecord<I>>> {
        let _guard = self.lock.acquire()?;
        let mut inner = self.inner.lock();
        inner.ensure_open()?;
        inner.refresh()?;
        Ok(inner.seen.get(&interval.key()).cloned())
    }

    /// Snapshot of the full claim history drained so far, in append order.
    pub fn history(&self) -> CoordResult<Vec<ClaimRecord<I>>> {
        let _guard = self.lock.acquire()?;
        let mut inner = self.inner.lock();
        inner.ensure_open()?;
        inner.refresh()?;
        Ok(inner.log.clone())
    }

    /// Release the store and flush a final status line. Safe to call more
    /// than once; claim operations after close fail with `Unavailable`.
    pub fn close(&self) -> CoordResult<()> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Ok(());
        }
        inner.emit_status(true);
        inner.store.close()?;
        inner.closed = true;
        Ok(())
    }
}

impl<I: Interval> Drop for Tracker<I> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl<I: Interval> Inner<I> {
    fn ensure_open(&self) -> CoordResult<()> {
        if self.closed {
            Err(CoordError::unavailable("claim tracker is closed"))
        } else {
            Ok(())
        }
    }

    /// Fold records appended since the last drain (by any process sharing
    /// the store target) into the working set and the history log.
    fn refresh(&mut self) -> CoordResult<()> {
        for record in self.store.drain_new()? {
            self.seen.insert(record.interval.key(), record.clone());
            self.log.push(record);
        }
        Ok(())
    }

    /// Existing record whose interval equals or overlaps `interval`.
    fn find_conflict(&self, interval: &I) -> Option<&ClaimRecord<I>> {
        let key = interval.key();
        self.seen
            .values()
            .find(|r| r.interval.key() == key || r.interval.overlaps(interval))
    }

    fn emit_status(&mut self, force: bool) {
        let decisions = self.claimed + self.conflicted;
        if !force && (decisions == 0 || decisions % STATUS_EVERY != 0) {
            return;
        }
        if let Some(sink) = self.status.as_mut() {
            // Best-effort: a broken status pipe must not fail a claim.
            let _ = writeln!(
                sink,
                "claimed {} intervals, {} already owned elsewhere",
                self.claimed, self.conflicted
            );
            let _ = sink.flush();
        }
    }
}
