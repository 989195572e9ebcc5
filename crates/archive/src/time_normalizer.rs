use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;
use common::{ArchiveError, ArchiveResult};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Calendar month used for uptime queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u8,
}

impl YearMonth {
    pub fn new(year: i32, month: u8) -> Self {
        Self { year, month }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Where wall-clock selections live. Named and system zones resolve the
/// offset per instant, so DST transitions are honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalZone {
    Fixed(UtcOffset),
    Named(Tz),
    /// The host zone (`TZ`, else `/etc/localtime`).
    System,
}

impl LocalZone {
    /// Offset in force at `timestamp`.
    pub fn offset_at(&self, timestamp: i64) -> ArchiveResult<UtcOffset> {
        match self {
            LocalZone::Fixed(offset) => Ok(*offset),
            LocalZone::Named(tz) => offset_at_in(tz, timestamp),
            LocalZone::System => offset_at_in(&Local, timestamp),
        }
    }

    /// Offset that turns the wall-clock `local` into an instant. A repeated
    /// wall time takes its earlier instant; a skipped one is read with the
    /// offset from before the jump.
    pub fn offset_for_local(&self, local: PrimitiveDateTime) -> ArchiveResult<UtcOffset> {
        match self {
            LocalZone::Fixed(offset) => Ok(*offset),
            LocalZone::Named(tz) => offset_for_local_in(tz, local),
            LocalZone::System => offset_for_local_in(&Local, local),
        }
    }
}

impl fmt::Display for LocalZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalZone::Fixed(offset) => write!(f, "fixed offset {}", offset),
            LocalZone::Named(tz) => f.write_str(tz.name()),
            LocalZone::System => f.write_str("system timezone"),
        }
    }
}

fn utc_naive(timestamp: i64) -> ArchiveResult<NaiveDateTime> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|utc| utc.naive_utc())
        .ok_or_else(|| ArchiveError::LocalTime(format!("timestamp {} is out of range", timestamp)))
}

fn to_utc_offset<O: Offset>(offset: &O) -> ArchiveResult<UtcOffset> {
    Ok(UtcOffset::from_whole_seconds(offset.fix().local_minus_utc())?)
}

fn offset_at_in<Z: TimeZone>(zone: &Z, timestamp: i64) -> ArchiveResult<UtcOffset> {
    to_utc_offset(&zone.offset_from_utc_datetime(&utc_naive(timestamp)?))
}

fn offset_for_local_in<Z: TimeZone>(zone: &Z, local: PrimitiveDateTime) -> ArchiveResult<UtcOffset> {
    // wall-clock fields carried through chrono as a naive value
    let wall = local.assume_utc().unix_timestamp();
    match zone.offset_from_local_datetime(&utc_naive(wall)?).earliest() {
        Some(offset) => to_utc_offset(&offset),
        None => offset_at_in(zone, wall - GAP_LOOKBACK),
    }
}

const GAP_LOOKBACK: i64 = 86_400;

/// Converts between the viewer's wall-clock selection and canonical
/// (UTC epoch seconds) timestamps. Only the selector is local; wire values
/// are always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeNormalizer {
    zone: LocalZone,
}

impl TimeNormalizer {
    pub fn new(offset: UtcOffset) -> Self {
        Self::in_zone(LocalZone::Fixed(offset))
    }

    pub fn in_zone(zone: LocalZone) -> Self {
        Self { zone }
    }

    pub fn utc() -> Self {
        Self::new(UtcOffset::UTC)
    }

    /// An explicit offset wins over a named zone; with neither, the host
    /// zone is used.
    pub fn from_config(offset: Option<UtcOffset>, timezone: Option<Tz>) -> Self {
        match (offset, timezone) {
            (Some(offset), _) => Self::new(offset),
            (None, Some(tz)) => Self::in_zone(LocalZone::Named(tz)),
            (None, None) => Self::in_zone(LocalZone::System),
        }
    }

    pub fn zone(&self) -> LocalZone {
        self.zone
    }

    /// Parses a picker value (`YYYY-MM-DDTHH:MM`, seconds optional).
    pub fn parse_selection(&self, value: &str) -> ArchiveResult<PrimitiveDateTime> {
        let value = value.trim();
        let minutes = format_description!("[year]-[month]-[day]T[hour]:[minute]");
        let seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

        PrimitiveDateTime::parse(value, &minutes)
            .or_else(|_| PrimitiveDateTime::parse(value, &seconds))
            .map_err(|e| ArchiveError::InvalidSelection(format!("'{}': {}", value, e)))
    }

    /// Uses the offset in force on the selected date, not today's.
    pub fn to_canonical(&self, local: PrimitiveDateTime) -> ArchiveResult<i64> {
        let offset = self.zone.offset_for_local(local)?;
        Ok(local.assume_offset(offset).unix_timestamp())
    }

    /// Canonical form of an instant; sub-second precision is truncated.
    pub fn canonical_now(now: OffsetDateTime) -> i64 {
        now.unix_timestamp()
    }

    pub fn initial_selection_at(&self, now: OffsetDateTime) -> ArchiveResult<String> {
        let local = self.to_local(now.unix_timestamp())?;
        Ok(local.format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]"
        ))?)
    }

    pub fn to_local(&self, timestamp: i64) -> ArchiveResult<OffsetDateTime> {
        let instant = OffsetDateTime::from_unix_timestamp(timestamp)?;
        Ok(instant.to_offset(self.zone.offset_at(timestamp)?))
    }

    pub fn local_display(&self, timestamp: i64) -> ArchiveResult<String> {
        Ok(self.to_local(timestamp)?.format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second] UTC[offset_hour sign:mandatory]:[offset_minute]"
        ))?)
    }

    /// The month the viewer sees for a selection, in local terms.
    pub fn month_of(local: PrimitiveDateTime) -> YearMonth {
        YearMonth::new(local.year(), u8::from(local.month()))
    }

    pub fn current_month(&self, now: OffsetDateTime) -> ArchiveResult<YearMonth> {
        let local = self.to_local(now.unix_timestamp())?;
        Ok(YearMonth::new(local.year(), u8::from(local.month())))
    }
}
