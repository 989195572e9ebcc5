pub mod availability;
pub mod controller;
pub mod models;
pub mod resolver;
pub mod time_normalizer;
pub mod versioned;

pub use availability::{
    classify, compute_completeness, AvailabilityAggregator, AvailabilitySummary, DayAvailability,
    DayIndicator, DayStatus, MonthAvailability, StatusClass, VisualTier,
};
pub use controller::{
    Applied, ArchiveViewController, CompletedLoad, LoadFailure, PendingLoad, RenderDecision,
    ViewState,
};
pub use models::{
    sort_entries, BlitzEntry, LeaderboardEntry, LeaderboardKind, SnapshotRequest, SnapshotResult,
    SortColumn, SortKey, XpEntry,
};
pub use resolver::SnapshotResolver;
pub use time_normalizer::{LocalZone, TimeNormalizer, YearMonth};
pub use versioned::{RequestToken, Versioned};
