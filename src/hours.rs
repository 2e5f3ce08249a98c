use std::fmt;

use chrono::{Duration, NaiveDateTime, Timelike, Utc};

use crate::error::PipelineError;

/// Display form for the `--from` / `--to` bounds.
pub const INPUT_FORMAT: &str = "%Y-%m-%dT%H:00:00";
/// Minutes and seconds are parsed and then required to be zero.
const PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
/// Fixed-width report key, e.g. `20200101010000`.
pub const KEY_FORMAT: &str = "%Y%m%d%H0000";
/// Stem used by the upstream dump files, e.g. `20200101-010000`.
pub const DUMP_FORMAT: &str = "%Y%m%d-%H0000";

/// One hour of input and output work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeBucket {
    hour: NaiveDateTime,
}

impl TimeBucket {
    pub fn hour(&self) -> NaiveDateTime {
        self.hour
    }

    pub fn key(&self) -> String {
        self.hour.format(KEY_FORMAT).to_string()
    }

    pub fn dump_stem(&self) -> String {
        self.hour.format(DUMP_FORMAT).to_string()
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hour.format(INPUT_FORMAT))
    }
}

/// Inclusive range of whole hours. `from <= to` holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourRange {
    from: NaiveDateTime,
    to: NaiveDateTime,
}

impl HourRange {
    pub fn new(from: NaiveDateTime, to: NaiveDateTime) -> Result<Self, PipelineError> {
        for bound in [from, to] {
            if !is_whole_hour(bound) {
                return Err(PipelineError::InvalidRange(format!(
                    "{} is not aligned to a whole hour",
                    bound
                )));
            }
        }

        if from > to {
            return Err(PipelineError::InvalidRange(format!(
                "from {} is after to {}",
                from.format(INPUT_FORMAT),
                to.format(INPUT_FORMAT)
            )));
        }

        Ok(Self { from, to })
    }

    /// Parses both bounds; a missing bound means the current UTC hour.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, PipelineError> {
        let from = parse_bound(from)?;
        let to = parse_bound(to)?;
        Self::new(from, to)
    }

    pub fn from(&self) -> NaiveDateTime {
        self.from
    }

    pub fn to(&self) -> NaiveDateTime {
        self.to
    }

    pub fn len(&self) -> usize {
        ((self.to - self.from).num_hours() + 1) as usize
    }

    /// Always false: a range holds at least the `from` hour.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn buckets(&self) -> impl Iterator<Item = TimeBucket> {
        let to = self.to;
        std::iter::successors(Some(self.from), move |hour| {
            let next = *hour + Duration::hours(1);
            (next <= to).then_some(next)
        })
        .map(|hour| TimeBucket { hour })
    }
}

fn parse_bound(input: Option<&str>) -> Result<NaiveDateTime, PipelineError> {
    match input {
        Some(value) => NaiveDateTime::parse_from_str(value, PARSE_FORMAT).map_err(|source| {
            PipelineError::InvalidDate {
                input: value.to_string(),
                source,
            }
        }),
        None => current_hour(),
    }
}

fn current_hour() -> Result<NaiveDateTime, PipelineError> {
    let now = Utc::now().naive_utc();
    now.date()
        .and_hms_opt(now.hour(), 0, 0)
        .ok_or_else(|| PipelineError::InvalidRange("cannot truncate current time".to_string()))
}

fn is_whole_hour(value: NaiveDateTime) -> bool {
    value.minute() == 0 && value.second() == 0 && value.nanosecond() == 0
}
