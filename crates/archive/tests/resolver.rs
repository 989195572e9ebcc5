mod support;

use archive::{LeaderboardKind, SnapshotResolver, SnapshotResult};
use support::{blitz_entries, xp_entries, InMemoryArchive, BLITZ_START, XP_START};

const HOUR: i64 = 3600;
const DAY: i64 = 86400;

fn xp_archive() -> InMemoryArchive {
    let entries = xp_entries(&[("zed", 300), ("amy", 100), ("kai", 200)]);
    InMemoryArchive::new()
        .with_snapshot(LeaderboardKind::Xp, XP_START, entries.clone())
        .with_snapshot(LeaderboardKind::Xp, XP_START + HOUR, entries.clone())
        .with_snapshot(LeaderboardKind::Xp, XP_START + 2 * HOUR, entries.clone())
        // downtime gap of almost three days
        .with_snapshot(LeaderboardKind::Xp, XP_START + 3 * DAY, entries.clone())
        .with_snapshot(LeaderboardKind::Xp, XP_START + 3 * DAY + HOUR / 2, entries)
}

#[tokio::test]
async fn resolves_to_nearest_available_snapshot() {
    let archive = xp_archive().into_shared();
    let resolver = SnapshotResolver::new(archive.clone());
    let available = archive.snapshot_times(LeaderboardKind::Xp);

    let requests = [
        XP_START,
        XP_START + 100,
        XP_START + HOUR / 2 - 1,
        XP_START + HOUR / 2,
        XP_START + DAY,
        XP_START + 2 * DAY + 12 * HOUR,
        XP_START + 30 * DAY,
    ];

    for requested in requests {
        let result = resolver.resolve(LeaderboardKind::Xp, requested).await.unwrap();
        let actual = match result {
            SnapshotResult::Success {
                actual_timestamp, ..
            } => actual_timestamp,
            other => panic!("expected success for {}, got {:?}", requested, other),
        };
        let drift = (actual - requested).abs();
        assert!(
            available.iter().all(|t| (t - requested).abs() >= drift),
            "a snapshot closer to {} than {} exists",
            requested,
            actual
        );
    }
}

#[tokio::test]
async fn gap_in_archive_returns_snapshot_days_away() {
    let resolver = SnapshotResolver::new(xp_archive().into_shared());
    let requested = XP_START + DAY;
    let result = resolver.resolve(LeaderboardKind::Xp, requested).await.unwrap();
    assert_eq!(result.drift_from(requested), Some(DAY - 2 * HOUR));
}

#[tokio::test]
async fn exact_snapshot_second_is_returned_unchanged() {
    let resolver = SnapshotResolver::new(xp_archive().into_shared());
    let requested = XP_START + HOUR;
    match resolver.resolve(LeaderboardKind::Xp, requested).await.unwrap() {
        SnapshotResult::Success {
            actual_timestamp,
            entries,
        } => {
            assert_eq!(actual_timestamp, requested);
            // resolver keeps server order; sorting is the caller's choice
            let names: Vec<_> = entries.iter().map(|e| e.display_name()).collect();
            assert_eq!(names, vec!["zed", "amy", "kai"]);
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn request_before_archive_start_is_failure() {
    let archive = InMemoryArchive::new()
        .with_snapshot(
            LeaderboardKind::Blitz,
            BLITZ_START,
            blitz_entries(&[("ace", 18000)]),
        )
        .into_shared();
    let resolver = SnapshotResolver::new(archive);

    // 2024-12-08T00:00:00Z, a year before the blitz feed begins
    let result = resolver.resolve(LeaderboardKind::Blitz, 1733616000).await.unwrap();
    match result {
        SnapshotResult::Failure { reason } => assert!(reason.contains("not supported"), "{}", reason),
        other => panic!("expected failure, got {:?}", other),
    }

    for offset in [1, HOUR, 400 * DAY] {
        let result = resolver
            .resolve(LeaderboardKind::Blitz, BLITZ_START - offset)
            .await
            .unwrap();
        assert!(!result.is_success());
    }
}

#[tokio::test]
async fn transport_failure_is_an_error_not_a_failure_result() {
    let path = "/v1/archive/xp_leaderboard/1754006400";
    let archive = xp_archive().with_failure(path).into_shared();
    let resolver = SnapshotResolver::new(archive.clone());

    let err = resolver.resolve(LeaderboardKind::Xp, XP_START).await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(archive.requests(), vec![path.to_string()]);
}
