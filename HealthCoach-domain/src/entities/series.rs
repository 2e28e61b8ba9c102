use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Sample time as sent by a device: an RFC 3339 string or epoch milliseconds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SampleTimestamp {
    /// Milliseconds since the Unix epoch, as produced by `Date.now()`
    EpochMillis(i64),
    /// RFC 3339 date-time with any offset
    Text(String),
}

impl SampleTimestamp {
    /// RFC 3339 in UTC with millisecond precision
    pub fn normalize(&self) -> Result<String, String> {
        let instant = match self {
            SampleTimestamp::Text(raw) => DateTime::parse_from_rfc3339(raw.trim())
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|_| {
                    format!(
                        "timestamp must be an RFC 3339 date-time or epoch milliseconds, got '{}'",
                        raw
                    )
                })?,
            SampleTimestamp::EpochMillis(millis) => Utc
                .timestamp_millis_opt(*millis)
                .single()
                .ok_or_else(|| format!("timestamp {} is out of range", millis))?,
        };

        Ok(instant.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// Normalized sample time, falling back to `received_at` when the device sent none
pub fn resolve_timestamp(timestamp: Option<&SampleTimestamp>, received_at: DateTime<Utc>) -> Result<String, String> {
    match timestamp {
        Some(timestamp) => timestamp.normalize(),
        None => Ok(received_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
    }
}

/// Time window used by history and statistics queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum TimeRange {
    /// The last 24 hours
    #[default]
    #[serde(rename = "24h")]
    Last24Hours,
    /// The last 7 days
    #[serde(rename = "7d")]
    Last7Days,
    /// The last 30 days
    #[serde(rename = "30d")]
    Last30Days,
    /// Every stored reading
    #[serde(rename = "all")]
    All,
}

impl TimeRange {
    /// Parse a range from its query string form
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "24h" => Some(TimeRange::Last24Hours),
            "7d" => Some(TimeRange::Last7Days),
            "30d" => Some(TimeRange::Last30Days),
            "all" => Some(TimeRange::All),
            _ => None,
        }
    }

    /// Query string form of the range
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Last24Hours => "24h",
            TimeRange::Last7Days => "7d",
            TimeRange::Last30Days => "30d",
            TimeRange::All => "all",
        }
    }

    /// Earliest timestamp included in the range, `None` for no lower bound
    pub fn start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeRange::Last24Hours => Some(now - Duration::hours(24)),
            TimeRange::Last7Days => Some(now - Duration::days(7)),
            TimeRange::Last30Days => Some(now - Duration::days(30)),
            TimeRange::All => None,
        }
    }

    /// `start` relative to the current time, formatted for repository filters
    pub fn start_filter(&self) -> Option<String> {
        self.start(Utc::now())
            .map(|start| start.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary statistics over every reading of one series in a range
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ReadingStats {
    /// Mean value, rounded to one decimal place
    pub average: f64,
    pub min: f64,
    pub max: f64,
    /// Most recent value in the range
    pub current: f64,
    /// Number of readings considered
    pub reading_count: usize,
    /// Range the statistics were computed over
    pub range: TimeRange,
}
