//! Daily update slots in local wall-clock time.

use crate::config::ScheduleConfig;
use chrono::{DateTime, Days, NaiveTime, TimeZone};
use tracing::warn;

/// Fixed minute past a set of hours, every day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    minute: u32,
    hours: Vec<u32>,
}

impl Default for Schedule {
    fn default() -> Self {
        let config = ScheduleConfig::default();
        Self {
            minute: config.minute,
            hours: config.hours,
        }
    }
}

impl Schedule {
    /// Slots at `minute` past each of `hours`. `None` when nothing valid remains.
    pub fn new(minute: u32, hours: &[u32]) -> Option<Self> {
        if minute >= 60 {
            return None;
        }
        let mut hours: Vec<u32> = hours.iter().copied().filter(|h| *h < 24).collect();
        hours.sort_unstable();
        hours.dedup();
        if hours.is_empty() {
            return None;
        }
        Some(Self { minute, hours })
    }

    /// Schedule from config; an invalid one falls back to 00:01 and 12:01.
    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self::new(config.minute, &config.hours).unwrap_or_else(|| {
            warn!(
                minute = config.minute,
                hours = ?config.hours,
                "Invalid schedule, using 00:01 and 12:01"
            );
            Self::default()
        })
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn hours(&self) -> &[u32] {
        &self.hours
    }

    /// First slot strictly after `now`, in `now`'s time zone.
    ///
    /// Slots that fall into a DST gap are skipped.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        let today = now.date_naive();
        for offset in 0..=2u64 {
            let Some(date) = today.checked_add_days(Days::new(offset)) else {
                break;
            };
            for &hour in &self.hours {
                let Some(time) = NaiveTime::from_hms_opt(hour, self.minute, 0) else {
                    continue;
                };
                if let Some(slot) = date.and_time(time).and_local_timezone(tz.clone()).earliest() {
                    if slot > *now {
                        return slot;
                    }
                }
            }
        }
        now.clone() + chrono::Duration::hours(1)
    }

    /// Time to wait from `now` until the next slot.
    pub fn sleep_until_next<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> std::time::Duration {
        (self.next_after(now) - now.clone())
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }
}
