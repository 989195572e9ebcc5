//! In-memory archive service: serves the snapshot nearest to the requested
//! instant, refuses requests before the feed's start, and can delay or fail
//! individual paths.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use archive::LeaderboardKind;
use async_trait::async_trait;
use common::{ArchiveError, ArchiveResult, ArchiveTransport, HttpResponse};
use serde_json::{json, Value};

pub const BLITZ_START: i64 = 1765152000; // 2025-12-08T00:00:00Z
pub const XP_START: i64 = 1754006400; // 2025-08-01T00:00:00Z

#[derive(Default)]
pub struct InMemoryArchive {
    starts: HashMap<LeaderboardKind, i64>,
    snapshots: HashMap<LeaderboardKind, BTreeMap<i64, Value>>,
    uptime: HashMap<(LeaderboardKind, i32, u8), Value>,
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    replies: HashMap<String, (u16, Value)>,
    requests: Mutex<Vec<String>>,
}

impl InMemoryArchive {
    pub fn new() -> Self {
        let mut archive = Self::default();
        archive.starts.insert(LeaderboardKind::Blitz, BLITZ_START);
        archive.starts.insert(LeaderboardKind::Xp, XP_START);
        archive
    }

    pub fn with_snapshot(mut self, kind: LeaderboardKind, timestamp: i64, data: Value) -> Self {
        self.snapshots.entry(kind).or_default().insert(timestamp, data);
        self
    }

    pub fn with_uptime(mut self, kind: LeaderboardKind, year: i32, month: u8, days: &[&str]) -> Self {
        let days: Vec<Value> = days
            .iter()
            .enumerate()
            .map(|(i, status)| json!({ "day": i + 1, "status": status }))
            .collect();
        self.uptime.insert(
            (kind, year, month),
            json!({ "year": year, "month": month, "days": days }),
        );
        self
    }

    pub fn with_delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_string(), delay);
        self
    }

    pub fn with_failure(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    /// Answers `path` with a fixed status and body instead of routing it.
    pub fn with_reply(mut self, path: &str, status: u16, body: Value) -> Self {
        self.replies.insert(path.to_string(), (status, body));
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count_requests(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|path| path.starts_with(prefix))
            .count()
    }

    /// Timestamps of every stored snapshot for `kind`.
    pub fn snapshot_times(&self, kind: LeaderboardKind) -> Vec<i64> {
        self.snapshots
            .get(&kind)
            .map(|s| s.keys().copied().collect())
            .unwrap_or_default()
    }

    fn nearest(&self, kind: LeaderboardKind, requested: i64) -> Value {
        let start = self.starts.get(&kind).copied().unwrap_or(i64::MIN);
        if requested < start {
            return json!({ "detail": format!("Date not supported: {} archive starts at {}", kind, start) });
        }

        let nearest = self.snapshots.get(&kind).and_then(|snapshots| {
            snapshots
                .iter()
                .min_by_key(|(t, _)| ((**t - requested).abs(), **t))
        });
        match nearest {
            Some((timestamp, data)) => json!({ "timestamp": timestamp, "data": data }),
            None => json!({ "detail": "No data available" }),
        }
    }

    fn route(&self, path: &str) -> HttpResponse {
        let parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        match parts.as_slice() {
            ["v1", "archive", "uptime", board, year, month] => {
                let key: (LeaderboardKind, i32, u8) = (
                    parse_kind(board),
                    year.parse().unwrap(),
                    month.parse().unwrap(),
                );
                match self.uptime.get(&key) {
                    Some(body) => HttpResponse::ok(body.to_string()),
                    None => HttpResponse::ok(
                        json!({ "year": key.1, "month": key.2, "days": [] }).to_string(),
                    ),
                }
            }
            ["v1", "archive", board, timestamp] => {
                let body = self.nearest(parse_kind(board), timestamp.parse().unwrap());
                HttpResponse::ok(body.to_string())
            }
            _ => HttpResponse::new(404, json!({ "detail": "Not Found" }).to_string()),
        }
    }
}

fn parse_kind(board: &str) -> LeaderboardKind {
    board.trim_end_matches("_leaderboard").parse().unwrap()
}

#[async_trait]
impl ArchiveTransport for InMemoryArchive {
    async fn get(&self, path: &str) -> ArchiveResult<HttpResponse> {
        self.requests.lock().unwrap().push(path.to_string());

        if let Some(delay) = self.delays.get(path) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(path) {
            return Err(ArchiveError::Status {
                status: 503,
                body: "Service Unavailable".to_string(),
            });
        }
        if let Some((status, body)) = self.replies.get(path) {
            return Ok(HttpResponse::new(*status, body.to_string()));
        }
        Ok(self.route(path))
    }
}

pub fn xp_entries(rows: &[(&str, i64)]) -> Value {
    Value::Array(
        rows.iter()
            .map(|(name, xp)| json!({ "acc": format!("acc-{}", name), "name": name, "xp": xp }))
            .collect(),
    )
}

pub fn blitz_entries(rows: &[(&str, i64)]) -> Value {
    Value::Array(
        rows.iter()
            .map(|(name, bsr)| json!({ "acc": format!("acc-{}", name), "name": name, "bsr": bsr }))
            .collect(),
    )
}
