//! Property tests for run history retention.
//!
//! 1. `append` never exceeds the retention cap
//! 2. The kept runs are the most recent ones, oldest first

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use zonewatch_runner::{RunHistory, RunSnapshot};

fn snapshot(i: usize) -> RunSnapshot {
    RunSnapshot {
        run_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(i as i64),
        data: Vec::new(),
    }
}

proptest! {
    #[test]
    fn append_respects_retention(retention in 1usize..80, runs in 0usize..200) {
        let mut history = RunHistory::new(retention);
        for i in 0..runs {
            history.append(snapshot(i));
            prop_assert!(history.len() <= retention);
        }
        prop_assert_eq!(history.len(), runs.min(retention));
    }

    #[test]
    fn keeps_most_recent_in_order(retention in 1usize..30, runs in 1usize..100) {
        let mut history = RunHistory::new(retention);
        for i in 0..runs {
            history.append(snapshot(i));
        }
        let first_kept = runs.saturating_sub(retention);
        let expected: Vec<_> = (first_kept..runs).map(|i| snapshot(i).run_at).collect();
        let actual: Vec<_> = history.runs().iter().map(|r| r.run_at).collect();
        prop_assert_eq!(actual, expected);
    }
}
