use serde::{Deserialize, Serialize};

/// A stored time-series row: one numeric value at one instant
pub trait SeriesRecord: Clone {
    /// The measured value
    fn value(&self) -> f64;

    /// RFC 3339 timestamp the value was recorded at
    fn recorded_at(&self) -> &str;
}

/// Aggregates over every reading in a time window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadingSummary {
    /// Number of readings in the window
    pub count: usize,

    /// Unrounded mean value
    pub average: f64,

    pub min: f64,
    pub max: f64,

    /// Value of the reading with the most recent timestamp
    pub latest: f64,
}

fn in_window<T: SeriesRecord>(record: &T, start_date: Option<&str>, end_date: Option<&str>) -> bool {
    start_date.map_or(true, |start| record.recorded_at() >= start)
        && end_date.map_or(true, |end| record.recorded_at() <= end)
}

/// Filter, sort and paginate records held in memory.
/// Returns the page and the number of matches before pagination.
pub fn select_page<T: SeriesRecord>(
    records: &[T],
    start_date: Option<&str>,
    end_date: Option<&str>,
    limit: Option<usize>,
    offset: Option<usize>,
    sort_desc: Option<bool>,
) -> (Vec<T>, usize) {
    let sort_desc = sort_desc.unwrap_or(false);

    let mut matches: Vec<T> = records
        .iter()
        .filter(|record| in_window(*record, start_date, end_date))
        .cloned()
        .collect();

    // Stable sort keeps insertion order for equal timestamps
    matches.sort_by(|a, b| {
        let cmp = a.recorded_at().cmp(b.recorded_at());
        if sort_desc {
            cmp.reverse()
        } else {
            cmp
        }
    });

    let total = matches.len();
    let page = matches
        .into_iter()
        .skip(offset.unwrap_or(0))
        .take(limit.unwrap_or(total))
        .collect();

    (page, total)
}

/// Aggregate every record at or after `start_date`, `None` when there are none
pub fn summarize<T: SeriesRecord>(records: &[T], start_date: Option<&str>) -> Option<ReadingSummary> {
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut latest: Option<&T> = None;

    for record in records.iter().filter(|r| in_window(*r, start_date, None)) {
        count += 1;
        sum += record.value();
        min = min.min(record.value());
        max = max.max(record.value());
        // Later insertions win ties, like rowid ordering in SQLite
        if latest.map_or(true, |l| record.recorded_at() >= l.recorded_at()) {
            latest = Some(record);
        }
    }

    latest.map(|latest| ReadingSummary {
        count,
        average: sum / count as f64,
        min,
        max,
        latest: latest.value(),
    })
}
