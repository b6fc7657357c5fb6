use chrono::{Datelike, NaiveDate};

use crate::core::YearMonth;
use crate::error::AppError;

/// Parse a `YYYY-MM` month filter.
pub(crate) fn parse_year_month(s: &str) -> Result<YearMonth, AppError> {
    let invalid = || AppError::InvalidMonth {
        input: s.to_string(),
    };
    let trimmed = s.trim();
    let (year, month) = trimmed.split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(invalid());
    }
    // Round-trip through a real date to reject month 00 or 13
    let date = NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
        .map_err(|_| invalid())?;
    Ok(YearMonth {
        year: date.year(),
        month: date.month(),
    })
}
