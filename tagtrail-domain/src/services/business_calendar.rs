use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Timelike,
    Utc, Weekday,
};

use crate::entities::CalendarSettings;
use crate::ports::BusinessCalendar;

/// Business time as whole weekdays with a daily window, in one fixed UTC
/// offset, minus holidays.
#[derive(Debug, Clone)]
pub struct WeekdayCalendar {
    settings: CalendarSettings,
    offset: FixedOffset,
}

impl WeekdayCalendar {
    pub fn new(settings: CalendarSettings) -> Self {
        let offset = FixedOffset::east_opt(settings.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix());
        Self { settings, offset }
    }

    /// Every moment counts as business time.
    pub fn around_the_clock() -> Self {
        Self::new(CalendarSettings {
            business_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ],
            day_start_minute: 0,
            day_end_minute: 24 * 60,
            utc_offset_minutes: 0,
            holidays: Vec::new(),
        })
    }

    pub fn settings(&self) -> &CalendarSettings {
        &self.settings
    }

    fn is_business_day(&self, date: NaiveDate) -> bool {
        self.settings.business_days.contains(&date.weekday()) && !self.settings.holidays.contains(&date)
    }

    fn window(&self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let midnight = date.and_time(NaiveTime::MIN);
        (
            midnight + Duration::minutes(i64::from(self.settings.day_start_minute)),
            midnight + Duration::minutes(i64::from(self.settings.day_end_minute)),
        )
    }

    fn local(&self, at: DateTime<Utc>) -> NaiveDateTime {
        at.with_timezone(&self.offset).naive_local()
    }
}

impl BusinessCalendar for WeekdayCalendar {
    fn is_business_moment(&self, at: DateTime<Utc>) -> bool {
        let local = self.local(at);
        if !self.is_business_day(local.date()) {
            return false;
        }
        let second = local.num_seconds_from_midnight();
        second >= self.settings.day_start_minute * 60 && second < self.settings.day_end_minute * 60
    }

    fn business_duration(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Duration {
        if to <= from {
            return Duration::zero();
        }
        let (start, end) = (self.local(from), self.local(to));

        let mut total = Duration::zero();
        let mut day = start.date();
        while day <= end.date() {
            if self.is_business_day(day) {
                let (open, close) = self.window(day);
                let lower = open.max(start);
                let upper = close.min(end);
                if upper > lower {
                    total += upper - lower;
                }
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        total
    }
}
