#[cfg(test)]
mod tests {
    use crate::utils::{current_n, recorded_cursor};
    use connectors::memory::source::MemorySource;
    use engine_scroll::{ScrollCursor, error::CursorError};
    use model::core::value::Value;
    use tracing_test::traced_test;

    const ROWS: u64 = 23;

    fn window_of(cursor: &ScrollCursor) -> Option<(u64, u64)> {
        cursor
            .window()
            .map(|window| (window.begin_row(), window.end_row()))
    }

    // A row reads the same whichever path the cursor took to reach it.
    #[traced_test]
    #[tokio::test]
    async fn p1_row_identity_is_path_independent() {
        let (_, mut cursor) =
            recorded_cursor(MemorySource::sequence(ROWS).with_chunk(3), 5, true);

        let mut forward: Vec<Vec<Value>> = Vec::new();
        while cursor.next().await.unwrap() {
            forward.push(cursor.current_row().unwrap());
        }
        assert_eq!(forward.len() as u64, ROWS);

        let mut backward: Vec<Vec<Value>> = Vec::new();
        while cursor.previous().await.unwrap() {
            backward.push(cursor.current_row().unwrap());
        }
        backward.reverse();
        assert_eq!(forward, backward);

        for row in 1..=ROWS {
            let index = (row - 1) as usize;

            assert!(cursor.absolute(row as i64).await.unwrap());
            assert_eq!(cursor.current_row().unwrap(), forward[index]);

            let from_end = row as i64 - ROWS as i64 - 1;
            assert!(cursor.absolute(from_end).await.unwrap());
            assert_eq!(cursor.row(), row);
            assert_eq!(cursor.current_row().unwrap(), forward[index]);
        }
    }

    // Overrunning the end any number of times keeps the last row reachable.
    #[traced_test]
    #[tokio::test]
    async fn p2_overrun_is_idempotent() {
        for overruns in 1..=5 {
            let (_, mut cursor) = recorded_cursor(MemorySource::sequence(7), 3, true);
            while cursor.next().await.unwrap() {}

            for _ in 0..overruns {
                assert!(!cursor.next().await.unwrap());
                assert_eq!(cursor.row(), 0);
                assert!(cursor.is_after_last());
            }

            assert!(cursor.previous().await.unwrap());
            assert_eq!(current_n(&cursor), 7);
            assert!(cursor.is_last());
        }
    }

    // Moves that stay inside the window never reach the remote engine.
    #[traced_test]
    #[tokio::test]
    async fn p3_no_fetch_inside_the_window() {
        let (source, mut cursor) = recorded_cursor(MemorySource::sequence(20), 5, false);

        assert!(cursor.absolute(8).await.unwrap());
        assert_eq!(window_of(&cursor), Some((6, 10)));
        let calls = source.calls();

        assert!(cursor.next().await.unwrap());
        assert!(cursor.next().await.unwrap());
        for _ in 0..4 {
            assert!(cursor.previous().await.unwrap());
        }
        assert!(cursor.relative(3).await.unwrap());
        assert!(cursor.relative(-2).await.unwrap());
        assert!(cursor.absolute(10).await.unwrap());
        assert!(cursor.absolute(6).await.unwrap());

        assert_eq!(cursor.row(), 6);
        assert_eq!(source.calls(), calls);
    }

    // Leaving the window costs exactly one fetch per navigation call.
    #[traced_test]
    #[tokio::test]
    async fn p4_one_fetch_per_boundary_crossing() {
        let (source, mut cursor) = recorded_cursor(MemorySource::sequence(20), 4, false);

        assert!(cursor.next().await.unwrap());
        assert_eq!(source.calls(), 1);

        while cursor.row() < 20 {
            let target = cursor.row() + 1;
            let inside = cursor.window().is_some_and(|window| window.contains(target));
            let before = source.calls();

            assert!(cursor.next().await.unwrap());
            assert_eq!(source.calls() - before, usize::from(!inside), "next to {target}");
        }

        while cursor.row() > 1 {
            let target = cursor.row() - 1;
            let inside = cursor.window().is_some_and(|window| window.contains(target));
            let before = source.calls();

            assert!(cursor.previous().await.unwrap());
            assert_eq!(source.calls() - before, usize::from(!inside), "previous to {target}");
        }

        let before = source.calls();
        assert!(cursor.absolute(6).await.unwrap());
        assert_eq!(window_of(&cursor), Some((5, 8)));
        assert!(cursor.absolute(2).await.unwrap());
        assert_eq!(window_of(&cursor), Some((1, 4)));
        assert_eq!(source.calls() - before, 2);
    }

    // relative() from a sentinel is always a usage error and never fetches.
    #[traced_test]
    #[tokio::test]
    async fn p5_relative_needs_a_current_row() {
        let (source, mut cursor) = recorded_cursor(MemorySource::sequence(10), 4, true);

        for n in [-5, -1, 0, 1, 5] {
            cursor.before_first().unwrap();
            assert!(matches!(cursor.relative(n).await, Err(CursorError::Usage(_))));
            assert!(cursor.is_before_first());

            cursor.after_last().unwrap();
            assert!(matches!(cursor.relative(n).await, Err(CursorError::Usage(_))));
            assert!(cursor.is_after_last());
        }
        assert_eq!(source.calls(), 0);
    }
}
