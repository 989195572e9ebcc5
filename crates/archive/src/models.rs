use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardKind {
    Blitz,
    Xp,
}

impl LeaderboardKind {
    /// Segment used in archive paths, e.g. `xp` in `/v1/archive/xp_leaderboard/..`.
    pub fn path_segment(&self) -> &'static str {
        match self {
            LeaderboardKind::Blitz => "blitz",
            LeaderboardKind::Xp => "xp",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            LeaderboardKind::Blitz => "Blitz Leaderboard",
            LeaderboardKind::Xp => "XP Leaderboard",
        }
    }

    /// Only the XP feed publishes per-day uptime.
    pub fn uptime_supported(&self) -> bool {
        matches!(self, LeaderboardKind::Xp)
    }

    /// Static hint appended to every error banner.
    pub fn archive_hint(&self) -> &'static str {
        match self {
            LeaderboardKind::Blitz => "You can only select months starting with December 2025.",
            LeaderboardKind::Xp => "You can only select months starting with August 2025.",
        }
    }

    pub fn default_sort(&self) -> SortKey {
        SortKey {
            column: SortColumn::Score,
            descending: true,
        }
    }
}

impl fmt::Display for LeaderboardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for LeaderboardKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blitz" => Ok(LeaderboardKind::Blitz),
            "xp" => Ok(LeaderboardKind::Xp),
            other => anyhow::bail!("unknown leaderboard kind '{}' (expected blitz or xp)", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlitzEntry {
    pub acc: String,
    pub name: String,
    /// Blitz score rating at 10x scale.
    pub bsr: i64,
}

impl BlitzEntry {
    pub fn display_bsr(&self) -> f64 {
        self.bsr as f64 / 10.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpEntry {
    pub acc: String,
    pub name: String,
    pub xp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardEntry {
    Blitz(BlitzEntry),
    Xp(XpEntry),
}

impl LeaderboardEntry {
    pub fn display_name(&self) -> &str {
        match self {
            LeaderboardEntry::Blitz(e) => &e.name,
            LeaderboardEntry::Xp(e) => &e.name,
        }
    }

    /// Raw score as stored by the archive (bsr stays at 10x scale).
    pub fn score(&self) -> i64 {
        match self {
            LeaderboardEntry::Blitz(e) => e.bsr,
            LeaderboardEntry::Xp(e) => e.xp,
        }
    }

    pub fn display_score(&self) -> f64 {
        match self {
            LeaderboardEntry::Blitz(e) => e.display_bsr(),
            LeaderboardEntry::Xp(e) => e.xp as f64,
        }
    }
}

impl From<BlitzEntry> for LeaderboardEntry {
    fn from(entry: BlitzEntry) -> Self {
        LeaderboardEntry::Blitz(entry)
    }
}

impl From<XpEntry> for LeaderboardEntry {
    fn from(entry: XpEntry) -> Self {
        LeaderboardEntry::Xp(entry)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Score,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: SortColumn,
    pub descending: bool,
}

/// Stable sort, so equal keys keep the order the archive sent them in.
pub fn sort_entries(entries: &mut [LeaderboardEntry], key: SortKey) {
    entries.sort_by(|a, b| {
        let ordering = match key.column {
            SortColumn::Name => a.display_name().cmp(b.display_name()),
            SortColumn::Score => a.score().cmp(&b.score()),
        };
        if key.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotRequest {
    pub kind: LeaderboardKind,
    pub requested_timestamp: i64,
}

impl SnapshotRequest {
    pub fn new(kind: LeaderboardKind, requested_timestamp: i64) -> Self {
        Self {
            kind,
            requested_timestamp,
        }
    }

    pub fn path(&self) -> String {
        format!(
            "/v1/archive/{}_leaderboard/{}",
            self.kind.path_segment(),
            self.requested_timestamp
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotResult {
    Success {
        actual_timestamp: i64,
        entries: Vec<LeaderboardEntry>,
    },
    Failure {
        reason: String,
    },
}

impl SnapshotResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SnapshotResult::Success { .. })
    }

    /// Seconds between the requested instant and the snapshot actually served.
    pub fn drift_from(&self, requested_timestamp: i64) -> Option<i64> {
        match self {
            SnapshotResult::Success {
                actual_timestamp, ..
            } => Some((actual_timestamp - requested_timestamp).abs()),
            SnapshotResult::Failure { .. } => None,
        }
    }
}

/// Archive snapshot body. Which variant matches depends only on the fields
/// present: `data` (with `timestamp`) or `detail`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SnapshotBody<E> {
    Snapshot { timestamp: i64, data: Vec<E> },
    Detail { detail: String },
}

impl<E: Into<LeaderboardEntry>> SnapshotBody<E> {
    pub(crate) fn into_result(self) -> SnapshotResult {
        match self {
            SnapshotBody::Snapshot { timestamp, data } => SnapshotResult::Success {
                actual_timestamp: timestamp,
                entries: data.into_iter().map(Into::into).collect(),
            },
            SnapshotBody::Detail { detail } => SnapshotResult::Failure { reason: detail },
        }
    }
}
