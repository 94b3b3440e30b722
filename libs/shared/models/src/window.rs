use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

const DAYS_PER_WEEK: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeFilter {
    Day,
    Week,
    Month,
    #[default]
    All,
}

/// Half-open `[start, end)` window on `start_time`, already converted to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

impl TimeFilter {
    /// Resolves against the server's local wall clock.
    pub fn window(&self) -> Option<TimeWindow> {
        self.window_at(&Local::now())
    }

    /// Calendar boundaries are taken in `now`'s own time zone: DAY is today's
    /// midnight to tomorrow's, WEEK starts on Monday, MONTH on the 1st.
    pub fn window_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<TimeWindow> {
        let tz = now.timezone();
        let today = now.date_naive();

        let (first, last) = match self {
            TimeFilter::Day => (today, today + Duration::days(1)),
            TimeFilter::Week => {
                let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
                (monday, monday + Duration::days(DAYS_PER_WEEK))
            }
            TimeFilter::Month => {
                let first = today.with_day(1)?;
                let next = if first.month() == 12 {
                    NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)?
                };
                (first, next)
            }
            TimeFilter::All => return None,
        };

        Some(TimeWindow {
            start: local_midnight(&tz, first),
            end: local_midnight(&tz, last),
        })
    }
}

fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::default());

    // Zones that start DST at midnight have no 00:00; use the first instant of the day.
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}
