use health_coach_domain::entities::series::TimeRange;

use crate::entities::common::HistoryQueryParams;
use crate::entities::{ErrorResponse, PaginatedResponse};

pub const DEFAULT_LIMIT: usize = 100;
pub const MAX_LIMIT: usize = 1000;

/// Largest offset storage can address
pub const MAX_OFFSET: usize = i64::MAX as usize;

/// Parse the `range` query parameter, defaulting to 24h
pub fn parse_range(raw: Option<&str>) -> Result<TimeRange, ErrorResponse> {
    match raw {
        None => Ok(TimeRange::default()),
        Some(value) => TimeRange::parse(value).ok_or_else(|| {
            ErrorResponse::validation_error(format!("Unknown range '{}', expected 24h, 7d, 30d or all", value))
        }),
    }
}

/// Validated history query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryWindow {
    pub range: TimeRange,
    pub limit: usize,
    pub offset: usize,
    pub sort_desc: bool,
}

impl HistoryWindow {
    /// Apply defaults and bounds to the raw query parameters
    pub fn from_params(params: &HistoryQueryParams) -> Result<Self, ErrorResponse> {
        let range = parse_range(params.range.as_deref())?;

        let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 || limit > MAX_LIMIT {
            return Err(ErrorResponse::validation_error(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }

        let offset = params.offset.unwrap_or(0);
        if offset > MAX_OFFSET {
            return Err(ErrorResponse::validation_error(format!(
                "offset must be between 0 and {}",
                MAX_OFFSET
            )));
        }

        let sort_desc = match params.sort.as_deref().map(str::to_lowercase).as_deref() {
            None | Some("desc") => true,
            Some("asc") => false,
            Some(other) => {
                return Err(ErrorResponse::validation_error(format!(
                    "Invalid sort '{}', expected asc or desc",
                    other
                )))
            }
        };

        Ok(Self {
            range,
            limit,
            offset,
            sort_desc,
        })
    }

    fn link(&self, path: &str, offset: usize) -> String {
        format!(
            "{}?range={}&limit={}&offset={}&sort={}",
            path,
            self.range.as_str(),
            self.limit,
            offset,
            if self.sort_desc { "desc" } else { "asc" }
        )
    }

    /// Wrap one page of results with `next`/`previous` links relative to `path`
    pub fn paginate<T>(&self, path: &str, total_count: usize, data: Vec<T>) -> PaginatedResponse<T> {
        let next = self
            .offset
            .checked_add(self.limit)
            .filter(|next| *next < total_count)
            .map(|next| self.link(path, next));
        let previous = (self.offset > 0).then(|| self.link(path, self.offset.saturating_sub(self.limit)));

        PaginatedResponse {
            total_count,
            offset: self.offset,
            limit: self.limit,
            next,
            previous,
            data,
        }
    }
}
