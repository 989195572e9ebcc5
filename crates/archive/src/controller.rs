use std::sync::Arc;

use common::{ArchiveResult, ArchiveTransport};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::availability::{AvailabilityAggregator, AvailabilitySummary, MonthAvailability};
use crate::models::{
    sort_entries, LeaderboardEntry, LeaderboardKind, SnapshotRequest, SnapshotResult, SortKey,
};
use crate::resolver::SnapshotResolver;
use crate::time_normalizer::{TimeNormalizer, YearMonth};
use crate::versioned::{RequestToken, Versioned};

pub const LOAD_FAILED: &str = "Failed to load data";
pub const AVAILABILITY_LOADING: &str = "Loading...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    /// The archive answered, but has no snapshot for the request.
    OutOfRangeOrNoData(String),
    TransportFailure,
}

impl LoadFailure {
    pub fn message(&self) -> &str {
        match self {
            LoadFailure::OutOfRangeOrNoData(reason) => reason,
            LoadFailure::TransportFailure => LOAD_FAILED,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Loading {
        requested_timestamp: i64,
    },
    Error {
        requested_timestamp: i64,
        failure: LoadFailure,
    },
    Success {
        requested_timestamp: i64,
        actual_timestamp: i64,
        entries: Vec<LeaderboardEntry>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderDecision<'a> {
    Idle,
    Spinner,
    ErrorBanner(String),
    Table {
        caption: String,
        entries: &'a [LeaderboardEntry],
    },
}

/// Requests issued by one interaction, awaiting [`ArchiveViewController::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    pub snapshot: (RequestToken, SnapshotRequest),
    pub availability: Option<(RequestToken, YearMonth)>,
}

#[derive(Debug)]
pub struct CompletedLoad {
    pub snapshot: (RequestToken, SnapshotRequest, ArchiveResult<SnapshotResult>),
    pub availability: Option<(RequestToken, YearMonth, ArchiveResult<MonthAvailability>)>,
}

/// Which parts of a completed load were committed; `false` means superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub snapshot: bool,
    pub availability: Option<bool>,
}

/// View state for one leaderboard's archive page.
///
/// State transitions (`mount`, `select`, `apply`) are synchronous and take
/// `&mut self`; network I/O (`load`) only needs `&self`, so several loads may
/// be in flight at once. Every request carries a token from a [`Versioned`]
/// cell and only the latest issued token may update that cell.
pub struct ArchiveViewController<T> {
    kind: LeaderboardKind,
    normalizer: TimeNormalizer,
    resolver: SnapshotResolver<T>,
    aggregator: AvailabilityAggregator<T>,
    sort: SortKey,
    selection: String,
    view: Versioned<ViewState>,
    availability: Versioned<Option<AvailabilitySummary>>,
    availability_month: Option<YearMonth>,
}

impl<T: ArchiveTransport> ArchiveViewController<T> {
    pub fn new(kind: LeaderboardKind, transport: Arc<T>, normalizer: TimeNormalizer) -> Self {
        Self {
            kind,
            normalizer,
            resolver: SnapshotResolver::new(Arc::clone(&transport)),
            aggregator: AvailabilityAggregator::new(transport),
            sort: kind.default_sort(),
            selection: String::new(),
            view: Versioned::new(ViewState::Idle),
            availability: Versioned::new(None),
            availability_month: None,
        }
    }

    pub fn kind(&self) -> LeaderboardKind {
        self.kind
    }

    /// Current picker value.
    pub fn selection(&self) -> &str {
        &self.selection
    }

    pub fn state(&self) -> &ViewState {
        self.view.get()
    }

    pub fn availability(&self) -> Option<&AvailabilitySummary> {
        self.availability.get().as_ref()
    }

    pub fn availability_header(&self) -> String {
        self.availability()
            .map(|summary| summary.month_label.clone())
            .unwrap_or_else(|| AVAILABILITY_LOADING.to_string())
    }

    pub fn set_sort(&mut self, key: SortKey) {
        self.sort = key;
        if let ViewState::Success { entries, .. } = self.view.get_mut() {
            sort_entries(entries, key);
        }
    }

    /// Pre-fills the picker with `now` and issues the initial requests.
    pub fn mount(&mut self, now: OffsetDateTime) -> ArchiveResult<PendingLoad> {
        self.selection = self.normalizer.initial_selection_at(now)?;
        let timestamp = TimeNormalizer::canonical_now(now);
        let month = self.normalizer.current_month(now)?;
        Ok(self.issue(timestamp, month))
    }

    /// Handles a picker change. An empty value clears the picker without
    /// issuing anything.
    pub fn select(&mut self, value: &str) -> ArchiveResult<Option<PendingLoad>> {
        self.selection = value.to_string();
        if value.trim().is_empty() {
            return Ok(None);
        }
        let local = self.normalizer.parse_selection(value)?;
        let timestamp = self.normalizer.to_canonical(local)?;
        Ok(Some(self.issue(timestamp, TimeNormalizer::month_of(local))))
    }

    fn issue(&mut self, timestamp: i64, month: YearMonth) -> PendingLoad {
        let snapshot_token = self.view.issue();
        self.view.set(ViewState::Loading {
            requested_timestamp: timestamp,
        });
        debug!("{} snapshot request {} for {}", self.kind, snapshot_token, timestamp);

        let availability = if self.kind.uptime_supported() && self.availability_month != Some(month) {
            self.availability_month = Some(month);
            let token = self.availability.issue();
            debug!("{} uptime request {} for {}", self.kind, token, month);
            Some((token, month))
        } else {
            None
        };

        PendingLoad {
            snapshot: (snapshot_token, SnapshotRequest::new(self.kind, timestamp)),
            availability,
        }
    }

    /// Performs the network calls for `pending`; the snapshot and uptime
    /// requests run concurrently. Nothing is committed until [`Self::apply`].
    pub async fn load(&self, pending: PendingLoad) -> CompletedLoad {
        let (snapshot_token, request) = pending.snapshot;
        let kind = self.kind;

        let snapshot = self.resolver.resolve_request(request);
        let availability = async {
            match pending.availability {
                Some((token, month)) => Some((
                    token,
                    month,
                    self.aggregator.fetch(kind, month.year, month.month).await,
                )),
                None => None,
            }
        };
        let (snapshot_result, availability) = futures::join!(snapshot, availability);

        CompletedLoad {
            snapshot: (snapshot_token, request, snapshot_result),
            availability,
        }
    }

    pub fn apply(&mut self, completed: CompletedLoad) -> Applied {
        let (token, request, result) = completed.snapshot;
        let state = match result {
            Ok(SnapshotResult::Success {
                actual_timestamp,
                mut entries,
            }) => {
                sort_entries(&mut entries, self.sort);
                ViewState::Success {
                    requested_timestamp: request.requested_timestamp,
                    actual_timestamp,
                    entries,
                }
            }
            Ok(SnapshotResult::Failure { reason }) => ViewState::Error {
                requested_timestamp: request.requested_timestamp,
                failure: LoadFailure::OutOfRangeOrNoData(reason),
            },
            Err(e) => {
                warn!("Failed to fetch {} leaderboard: {}", self.kind, e);
                ViewState::Error {
                    requested_timestamp: request.requested_timestamp,
                    failure: LoadFailure::TransportFailure,
                }
            }
        };

        let snapshot_applied = self.view.apply(token, state);
        if snapshot_applied {
            info!("{} view updated from request {}", self.kind, token);
        } else {
            debug!(
                "Discarding stale {} snapshot response {} (latest {:?})",
                self.kind,
                token,
                self.view.latest()
            );
        }

        let availability_applied = completed
            .availability
            .map(|(token, month, result)| self.apply_availability(token, month, result));

        Applied {
            snapshot: snapshot_applied,
            availability: availability_applied,
        }
    }

    fn apply_availability(
        &mut self,
        token: RequestToken,
        month: YearMonth,
        result: ArchiveResult<MonthAvailability>,
    ) -> bool {
        if !self.availability.is_current(token) {
            debug!(
                "Discarding stale {} uptime response {} for {}",
                self.kind, token, month
            );
            return false;
        }

        let summary = match result {
            Ok(availability) => Some(AvailabilitySummary::from_month(&availability)),
            Err(e) => {
                // supplementary data: degrade to an empty card, retry on next selection
                warn!("Failed to fetch {} uptime for {}: {}", self.kind, month, e);
                self.availability_month = None;
                None
            }
        };
        self.availability.apply(token, summary)
    }

    pub async fn mount_and_load(&mut self, now: OffsetDateTime) -> ArchiveResult<Applied> {
        let pending = self.mount(now)?;
        let completed = self.load(pending).await;
        Ok(self.apply(completed))
    }

    pub async fn select_and_load(&mut self, value: &str) -> ArchiveResult<Option<Applied>> {
        let Some(pending) = self.select(value)? else {
            return Ok(None);
        };
        let completed = self.load(pending).await;
        Ok(Some(self.apply(completed)))
    }

    pub fn render(&self) -> RenderDecision<'_> {
        match self.view.get() {
            ViewState::Idle => RenderDecision::Idle,
            ViewState::Loading { .. } => RenderDecision::Spinner,
            ViewState::Error { failure, .. } => RenderDecision::ErrorBanner(format!(
                "{}. {}",
                failure.message(),
                self.kind.archive_hint()
            )),
            ViewState::Success {
                actual_timestamp,
                entries,
                ..
            } => RenderDecision::Table {
                caption: self.caption(*actual_timestamp),
                entries,
            },
        }
    }

    fn caption(&self, actual_timestamp: i64) -> String {
        match self.normalizer.local_display(actual_timestamp) {
            Ok(local) => format!(
                "Showing data for {} your timezone (snapped at {})",
                local, actual_timestamp
            ),
            Err(_) => format!("Showing data snapped at {}", actual_timestamp),
        }
    }
}
