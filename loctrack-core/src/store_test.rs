#[cfg(test)]
mod tests {
    use crate::store::ClaimStore;
    use crate::store_in_memory::InMemoryClaimStore;
    use crate::types::{ClaimRecord, ClaimState, GenomeSpan};

    fn record(span: &str, owner: &str, state: ClaimState) -> ClaimRecord<GenomeSpan> {
        ClaimRecord::new(span.parse().unwrap(), owner, state, 1000)
    }

    // =========================================================================
    // In-memory store
    // =========================================================================

    #[test]
    fn in_memory_drain_is_empty_before_any_append() {
        let mut store: InMemoryClaimStore<GenomeSpan> = InMemoryClaimStore::new();
        assert!(store.drain_new().unwrap().is_empty());
    }

    #[test]
    fn in_memory_drain_returns_appends_once_in_order() {
        let mut store = InMemoryClaimStore::new();
        store
            .append(&[
                record("chr1:100-200", "w1", ClaimState::Claimed),
                record("chr2:1-50", "w2", ClaimState::Claimed),
            ])
            .unwrap();

        let drained = store.drain_new().unwrap();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].interval.to_string(), "chr1:100-200");
        assert_eq!(drained[1].interval.to_string(), "chr2:1-50");

        // One-shot queue: a second drain yields nothing.
        assert!(store.drain_new().unwrap().is_empty());
    }

    // =========================================================================
    // SQLite store
    // =========================================================================

    #[cfg(feature = "sqlite")]
    mod sqlite {
        use super::record;
        use crate::error::CoordError;
        use crate::store::ClaimStore;
        use crate::store_sqlite::SqliteClaimStore;
        use crate::types::{ClaimState, GenomeSpan};

        #[test]
        fn append_then_drain_roundtrips_records() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("claims.db");
            let mut store: SqliteClaimStore<GenomeSpan> = SqliteClaimStore::open(&path).unwrap();

            store
                .append(&[
                    record("chr1:100-200", "w1", ClaimState::Claimed),
                    record("chr1:100-200", "w1", ClaimState::Processed),
                ])
                .unwrap();

            let drained = store.drain_new().unwrap();
            assert_eq!(drained.len(), 2);
            assert_eq!(drained[0].state, ClaimState::Claimed);
            assert_eq!(drained[1].state, ClaimState::Processed);
            assert_eq!(drained[1].owner, "w1");
            assert!(store.drain_new().unwrap().is_empty());
        }

        #[test]
        fn fresh_handle_sees_full_history_exactly_once() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("claims.db");

            let mut writer: SqliteClaimStore<GenomeSpan> = SqliteClaimStore::open(&path).unwrap();
            for i in 0..5 {
                writer
                    .append(&[record(&format!("chr1:{}-{}", i * 100 + 1, i * 100 + 50), "w1", ClaimState::Claimed)])
                    .unwrap();
            }

            let mut fresh: SqliteClaimStore<GenomeSpan> = SqliteClaimStore::open(&path).unwrap();
            let drained = fresh.drain_new().unwrap();
            assert_eq!(drained.len(), 5);
            assert!(fresh.drain_new().unwrap().is_empty());
        }

        #[test]
        fn drain_picks_up_appends_from_other_handles() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("claims.db");

            let mut a: SqliteClaimStore<GenomeSpan> = SqliteClaimStore::open(&path).unwrap();
            let mut b: SqliteClaimStore<GenomeSpan> = SqliteClaimStore::open(&path).unwrap();

            a.append(&[record("chr1:100-200", "w1", ClaimState::Claimed)]).unwrap();
            assert_eq!(a.drain_new().unwrap().len(), 1);

            b.append(&[record("chr2:1-50", "w2", ClaimState::Claimed)]).unwrap();

            // A already consumed its own record; only B's append is new.
            let drained = a.drain_new().unwrap();
            assert_eq!(drained.len(), 1);
            assert_eq!(drained[0].owner, "w2");
        }

        #[test]
        fn unknown_state_fails_the_drain_as_corrupt() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("claims.db");
            let mut store: SqliteClaimStore<GenomeSpan> = SqliteClaimStore::open(&path).unwrap();

            let raw = rusqlite::Connection::open(&path).unwrap();
            raw.execute(
                "INSERT INTO claims (span_key, span, owner, state, recorded_at)
                 VALUES ('chr1:1-2', '{\"contig\":\"chr1\",\"start\":1,\"stop\":2}', 'w1', 'GARBAGE', 0)",
                [],
            )
            .unwrap();

            assert!(matches!(
                store.drain_new(),
                Err(CoordError::CorruptState { .. })
            ));
        }

        #[test]
        fn undecodable_interval_fails_the_drain_as_corrupt() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("claims.db");
            let mut store: SqliteClaimStore<GenomeSpan> = SqliteClaimStore::open(&path).unwrap();

            let raw = rusqlite::Connection::open(&path).unwrap();
            raw.execute(
                "INSERT INTO claims (span_key, span, owner, state, recorded_at)
                 VALUES ('chr1:1-2', 'not json', 'w1', 'CLAIMED', 0)",
                [],
            )
            .unwrap();

            assert!(matches!(
                store.drain_new(),
                Err(CoordError::CorruptState { .. })
            ));
        }
    }
}
