use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Weekday};
use uuid::Uuid;

use crate::utils::parse_date;

pub fn parse_weekday(value: &str) -> Result<Weekday> {
    value
        .trim()
        .parse::<Weekday>()
        .map_err(|_| anyhow!("invalid business day '{}'", value))
}

pub fn parse_holiday(value: &str) -> Result<NaiveDate> {
    parse_date(value).map_err(|err| anyhow!("invalid holiday: {}", err))
}

pub fn parse_account_id(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|err| anyhow!("invalid account id '{}': {}", value, err))
}

/// Longest configurable time span, one year.
pub const MAX_SPAN_HOURS: f64 = 8760.0;

pub fn validate_hours(label: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(anyhow!("{} must be a positive number of hours", label));
    }
    Ok(())
}

pub fn validate_span_hours(label: &str, value: f64) -> Result<()> {
    validate_hours(label, value)?;
    if value > MAX_SPAN_HOURS {
        return Err(anyhow!("{} must not exceed {} hours", label, MAX_SPAN_HOURS));
    }
    Ok(())
}
