use std::fmt;
use std::sync::Arc;

use common::{ArchiveError, ArchiveResult, ArchiveTransport};
use serde::{Deserialize, Serialize};
use time::Month;
use tracing::{debug, info};

use crate::models::LeaderboardKind;
use crate::time_normalizer::YearMonth;

/// Per-day capture coverage as classified by the archive. The vocabulary is
/// owned by the server, so unrecognised values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DayStatus {
    FullyAvailable,
    PartiallyAvailable,
    NoData,
    Other(String),
}

impl DayStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DayStatus::FullyAvailable => "full data",
            DayStatus::PartiallyAvailable => "partially available",
            DayStatus::NoData => "no data",
            DayStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for DayStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "full data" => DayStatus::FullyAvailable,
            "partially available" => DayStatus::PartiallyAvailable,
            "no data" => DayStatus::NoData,
            _ => DayStatus::Other(raw),
        }
    }
}

impl From<DayStatus> for String {
    fn from(status: DayStatus) -> Self {
        match status {
            DayStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub day: u8,
    pub status: DayStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthAvailability {
    pub year: i32,
    pub month: u8,
    #[serde(default)]
    pub days: Vec<DayAvailability>,
}

impl MonthAvailability {
    pub fn year_month(&self) -> YearMonth {
        YearMonth::new(self.year, self.month)
    }

    pub fn count(&self, status: &DayStatus) -> usize {
        self.days.iter().filter(|d| &d.status == status).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualTier {
    Good,
    Warning,
    Danger,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusClass {
    pub tier: VisualTier,
    pub label: String,
}

pub fn classify(status: &DayStatus) -> StatusClass {
    let (tier, label) = match status {
        DayStatus::FullyAvailable => (VisualTier::Good, "Fully Available"),
        DayStatus::PartiallyAvailable => (VisualTier::Warning, "Partially Available"),
        DayStatus::NoData => (VisualTier::Danger, "Downtime"),
        DayStatus::Other(raw) => (VisualTier::Unknown, raw.as_str()),
    };
    StatusClass {
        tier,
        label: label.to_string(),
    }
}

/// Share of fully covered days, as a percentage rounded to one decimal.
/// Days absent from the response do not count; an empty month is 0.
pub fn compute_completeness(availability: &MonthAvailability) -> f64 {
    let total = availability.days.len();
    if total == 0 {
        return 0.0;
    }
    let full = availability.count(&DayStatus::FullyAvailable);
    let percentage = full as f64 / total as f64 * 100.0;
    (percentage * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayIndicator {
    pub day: u8,
    pub class: StatusClass,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilitySummary {
    pub year: i32,
    pub month: u8,
    pub month_label: String,
    pub completeness: f64,
    pub strip: Vec<DayIndicator>,
}

impl AvailabilitySummary {
    pub fn from_month(availability: &MonthAvailability) -> Self {
        Self {
            year: availability.year,
            month: availability.month,
            month_label: month_label(availability.year, availability.month),
            completeness: compute_completeness(availability),
            strip: availability
                .days
                .iter()
                .map(|d| DayIndicator {
                    day: d.day,
                    class: classify(&d.status),
                })
                .collect(),
        }
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth::new(self.year, self.month)
    }

    pub fn percentage_label(&self) -> String {
        format!("{:.1}%", self.completeness)
    }
}

/// "August 2025"; an out-of-range month falls back to the numeric form.
pub fn month_label(year: i32, month: u8) -> String {
    match Month::try_from(month) {
        Ok(m) => format!("{} {}", m, year),
        Err(_) => YearMonth::new(year, month).to_string(),
    }
}

pub struct AvailabilityAggregator<T> {
    transport: Arc<T>,
}

impl<T> Clone for AvailabilityAggregator<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: ArchiveTransport> AvailabilityAggregator<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    pub fn path(kind: LeaderboardKind, year: i32, month: u8) -> String {
        format!(
            "/v1/archive/uptime/{}_leaderboard/{}/{}",
            kind.path_segment(),
            year,
            month
        )
    }

    pub async fn fetch(
        &self,
        kind: LeaderboardKind,
        year: i32,
        month: u8,
    ) -> ArchiveResult<MonthAvailability> {
        info!("Fetching {} archive uptime for {}", kind, YearMonth::new(year, month));

        let response = self.transport.get(&Self::path(kind, year, month)).await?;
        if !response.is_success() {
            return Err(ArchiveError::Status {
                status: response.status,
                body: response.body,
            });
        }

        let availability: MonthAvailability = serde_json::from_str(&response.body)?;
        debug!(
            "{} uptime {}: {} days reported",
            kind,
            availability.year_month(),
            availability.days.len()
        );
        Ok(availability)
    }
}
