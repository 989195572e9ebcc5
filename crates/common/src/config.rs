use std::env;
use anyhow::{Result, Context};
use chrono_tz::Tz;
use time::macros::format_description;
use time::UtcOffset;

pub const DEFAULT_TOP_ENTRIES: usize = 10;

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub kinds: Vec<String>,
    pub selection: Option<String>,
    pub top_entries: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            kinds: vec!["blitz".to_string(), "xp".to_string()],
            selection: None,
            top_entries: DEFAULT_TOP_ENTRIES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Option<String>,
    pub utc_offset: Option<UtcOffset>,
    pub timezone: Option<Tz>,
    pub viewer: ViewerConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_url = env::var("ARCHIVE_API_URL")
            .ok()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let utc_offset = match env::var("ARCHIVE_UTC_OFFSET") {
            Ok(raw) => Some(
                parse_utc_offset(&raw)
                    .with_context(|| format!("ARCHIVE_UTC_OFFSET is not a valid offset: {}", raw))?,
            ),
            Err(_) => None,
        };

        let timezone = match env::var("ARCHIVE_TIMEZONE") {
            Ok(raw) if !raw.trim().is_empty() => Some(parse_timezone(&raw)?),
            _ => None,
        };

        let kinds = env::var("ARCHIVE_KINDS")
            .ok()
            .map(|kinds_str| {
                kinds_str
                    .split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|kinds| !kinds.is_empty())
            .unwrap_or_else(|| ViewerConfig::default().kinds);

        let viewer = ViewerConfig {
            kinds,
            selection: env::var("ARCHIVE_SELECTION")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            top_entries: env::var("ARCHIVE_TOP_ENTRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TOP_ENTRIES),
        };

        Ok(Config {
            api_url,
            utc_offset,
            timezone,
            viewer,
        })
    }

    pub fn require_api_url(&self) -> Result<&String> {
        self.api_url
            .as_ref()
            .context("ARCHIVE_API_URL must be set")
    }

    pub fn require_kinds(&self) -> Result<&Vec<String>> {
        if self.viewer.kinds.is_empty() {
            anyhow::bail!("ARCHIVE_KINDS must name at least one leaderboard");
        }
        Ok(&self.viewer.kinds)
    }
}

/// Parses `+HH:MM` / `-HH:MM` (a bare `Z` is accepted as UTC).
pub fn parse_utc_offset(raw: &str) -> Result<UtcOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Ok(UtcOffset::UTC);
    }
    let format = format_description!("[offset_hour sign:mandatory]:[offset_minute]");
    UtcOffset::parse(raw, &format).with_context(|| format!("expected +HH:MM, got '{}'", raw))
}

/// Parses an IANA zone name such as `Europe/Berlin`.
pub fn parse_timezone(raw: &str) -> Result<Tz> {
    let raw = raw.trim();
    raw.parse::<Tz>()
        .map_err(|e| anyhow::anyhow!("ARCHIVE_TIMEZONE is not a known timezone '{}': {}", raw, e))
}
