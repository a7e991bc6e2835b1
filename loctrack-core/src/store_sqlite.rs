//! SQLite-backed claim store.
//!
//! The shared medium for distributed runs: every cooperating process opens
//! the same database file, rows are visible atomically to readers, and the
//! autoincrement `seq` column gives each handle a drain cursor over records
//! appended by any process.
//!
//! Enable with the `sqlite` feature flag:
//! ```toml
//! loctrack-core = { version = "0.1", features = ["sqlite"] }
//! ```

use rusqlite::{Connection, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::path::Path;
use std::time::Duration;

use crate::error::{CoordError, CoordResult};
use crate::store::ClaimStore;
use crate::types::{ClaimRecord, ClaimState, Interval};

/// A persistent claim store backed by SQLite.
pub struct SqliteClaimStore<I> {
    conn: Connection,
    /// Highest `seq` this handle has drained.
    cursor: i64,
    _interval: PhantomData<I>,
}

impl<I> SqliteClaimStore<I>
where
    I: Interval + Serialize + DeserializeOwned,
{
    /// Open (or create) the shared database at the given path.
    pub fn open(path: &Path) -> CoordResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| CoordError::unavailable(format!("open claim store '{}': {}", path.display(), e)))?;

        // WAL mode lets lock-free diagnostic readers run alongside the
        // writer; FULL synchronous makes each appended record durable
        // before append() returns.
        conn.pragma_update(None, "journal_mode", "WAL")
            .and_then(|_| conn.pragma_update(None, "synchronous", "FULL"))
            .map_err(|e| CoordError::unavailable(format!("configure claim store: {}", e)))?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| CoordError::unavailable(format!("configure claim store: {}", e)))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS claims (
                seq         INTEGER PRIMARY KEY AUTOINCREMENT,
                span_key    TEXT NOT NULL,
                span        TEXT NOT NULL,
                owner       TEXT NOT NULL,
                state       TEXT NOT NULL,
                recorded_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_claims_key ON claims(span_key);",
        )
        .map_err(|e| CoordError::unavailable(format!("initialize claim store: {}", e)))?;

        Ok(Self {
            conn,
            cursor: 0,
            _interval: PhantomData,
        })
    }

    fn decode_row(
        seq: i64,
        span: &str,
        owner: String,
        state: &str,
        recorded_at: i64,
    ) -> CoordResult<ClaimRecord<I>> {
        let state = ClaimState::parse(state)
            .ok_or_else(|| CoordError::corrupt(format!("unknown claim state '{}' at seq {}", state, seq)))?;
        let interval: I = serde_json::from_str(span)
            .map_err(|e| CoordError::corrupt(format!("undecodable interval at seq {}: {}", seq, e)))?;
        Ok(ClaimRecord {
            interval,
            owner,
            state,
            recorded_at: recorded_at as u64,
        })
    }
}

impl<I> ClaimStore<I> for SqliteClaimStore<I>
where
    I: Interval + Serialize + DeserializeOwned,
{
    fn append(&mut self, records: &[ClaimRecord<I>]) -> CoordResult<()> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| CoordError::unavailable(format!("begin append: {}", e)))?;
        for record in records {
            let span = serde_json::to_string(&record.interval)
                .map_err(|e| CoordError::unavailable(format!("encode interval: {}", e)))?;
            tx.execute(
                "INSERT INTO claims (span_key, span, owner, state, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.interval.key(),
                    span,
                    record.owner,
                    record.state.as_str(),
                    record.recorded_at as i64,
                ],
            )
            .map_err(|e| CoordError::unavailable(format!("append claim record: {}", e)))?;
        }
        tx.commit()
            .map_err(|e| CoordError::unavailable(format!("commit append: {}", e)))
    }

    fn drain_new(&mut self) -> CoordResult<Vec<ClaimRecord<I>>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT seq, span, owner, state, recorded_at
                 FROM claims WHERE seq > ?1 ORDER BY seq",
            )
            .map_err(|e| CoordError::unavailable(format!("read claim history: {}", e)))?;

        let rows = stmt
            .query_map(params![self.cursor], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })
            .map_err(|e| CoordError::unavailable(format!("read claim history: {}", e)))?;

        let mut drained = Vec::new();
        for row in rows {
            let (seq, span, owner, state, recorded_at) =
                row.map_err(|e| CoordError::corrupt(format!("undecodable claim row: {}", e)))?;
            drained.push(Self::decode_row(seq, &span, owner, &state, recorded_at)?);
            self.cursor = seq;
        }
        Ok(drained)
    }
}
