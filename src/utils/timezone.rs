use chrono::offset::Offset;
use chrono::{
    DateTime, Datelike, FixedOffset, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Utc,
};
use chrono_tz::Tz;
use std::str::FromStr;

use crate::error::AppError;

/// Zone used for date headers, month grouping and day boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Timezone {
    Local,
    Fixed(FixedOffset),
    Named(Tz),
}

/// UTC+9 all year round.
impl Default for Timezone {
    fn default() -> Self {
        Timezone::Named(chrono_tz::Asia::Tokyo)
    }
}

impl Timezone {
    /// Accepts `local`, `utc`, fixed offsets such as `+09:00`, or IANA names.
    /// `None` or an empty value selects the default UTC+9.
    pub(crate) fn parse(value: Option<&str>) -> Result<Self, AppError> {
        let Some(raw) = value else {
            return Ok(Timezone::default());
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Timezone::default());
        }
        if trimmed.eq_ignore_ascii_case("local") {
            return Ok(Timezone::Local);
        }
        if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
            return Ok(Timezone::Named(chrono_tz::UTC));
        }
        if trimmed.starts_with(['+', '-']) {
            return FixedOffset::from_str(trimmed)
                .map(Timezone::Fixed)
                .map_err(|_| AppError::InvalidTimezone {
                    input: trimmed.to_string(),
                });
        }
        Tz::from_str(trimmed)
            .map(Timezone::Named)
            .map_err(|_| AppError::InvalidTimezone {
                input: trimmed.to_string(),
            })
    }

    pub(crate) fn to_fixed_offset(self, utc: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            Timezone::Local => {
                let local = utc.with_timezone(&Local);
                let offset = local.offset().fix();
                local.with_timezone(&offset)
            }
            Timezone::Fixed(offset) => utc.with_timezone(&offset),
            Timezone::Named(tz) => {
                let local = utc.with_timezone(&tz);
                let offset = local.offset().fix();
                local.with_timezone(&offset)
            }
        }
    }

    /// Midnight of the local day containing `utc`, with the offset in
    /// effect at midnight rather than at `utc`.
    pub(crate) fn start_of_day(self, utc: DateTime<Utc>) -> DateTime<Utc> {
        let midnight = self
            .to_fixed_offset(utc)
            .date_naive()
            .and_time(NaiveTime::MIN);
        self.local_to_utc(midnight)
    }

    /// Half-open `[start, end)` covering a local calendar month.
    pub(crate) fn month_range(
        self,
        year: i32,
        month: u32,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?.and_time(NaiveTime::MIN);
        let next = first.checked_add_months(Months::new(1))?;
        Some((self.local_to_utc(first), self.local_to_utc(next)))
    }

    /// Year and month of `utc` in this zone.
    pub(crate) fn year_month(self, utc: DateTime<Utc>) -> (i32, u32) {
        let local = self.to_fixed_offset(utc);
        (local.year(), local.month())
    }

    fn local_to_utc(self, naive: NaiveDateTime) -> DateTime<Utc> {
        let offset = match self {
            // A wall time skipped by a DST gap takes the offset in force
            // at the same UTC reading
            Timezone::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.offset().fix())
                .unwrap_or_else(|| Local.offset_from_utc_datetime(&naive).fix()),
            Timezone::Fixed(offset) => offset,
            Timezone::Named(tz) => tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.offset().fix())
                .unwrap_or_else(|| tz.offset_from_utc_datetime(&naive).fix()),
        };
        resolve_local(offset, naive)
    }
}

fn resolve_local(offset: FixedOffset, naive: NaiveDateTime) -> DateTime<Utc> {
    (naive - chrono::Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}
