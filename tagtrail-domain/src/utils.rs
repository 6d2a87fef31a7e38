use chrono::{DateTime, Utc};

pub fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn secs_to_hours(secs: i64) -> f64 {
    secs as f64 / 3600.0
}

pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    secs_to_hours((to - from).num_seconds().abs())
}

pub fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds().abs() as f64 / 60_000.0
}
