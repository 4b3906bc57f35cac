use std::collections::BTreeSet;

use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Weekend days and holiday exceptions used to count course durations in
/// working days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkCalendar {
    weekend: [bool; 7],
    holidays: BTreeSet<NaiveDate>,
}

/// Calendar range covered by a schedule and how its days were spent.
///
/// `working_days + weekend_days + holiday_days == calendar_days`, and
/// `calendar_days` is the inclusive length of `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub working_days: u32,
    pub weekend_days: u32,
    pub holiday_days: u32,
    pub calendar_days: u32,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self {
            weekend: weekend_mask([Weekday::Sat, Weekday::Sun]),
            holidays: BTreeSet::new(),
        }
    }
}

impl WorkCalendar {
    pub fn new<W, H>(weekend: W, holidays: H) -> Result<Self>
    where
        W: IntoIterator<Item = Weekday>,
        H: IntoIterator<Item = NaiveDate>,
    {
        let weekend = weekend_mask(weekend);
        if weekend.iter().all(|day| *day) {
            return Err(anyhow!("Weekend cannot cover every day of the week"));
        }
        Ok(Self {
            weekend,
            holidays: holidays.into_iter().collect(),
        })
    }

    /// Same weekend, with `holidays` added to the existing exceptions.
    pub fn with_holidays<H: IntoIterator<Item = NaiveDate>>(&self, holidays: H) -> Self {
        let mut calendar = self.clone();
        calendar.holidays.extend(holidays);
        calendar
    }

    /// Same weekend, with `holidays` as the only exceptions.
    pub fn replace_holidays<H: IntoIterator<Item = NaiveDate>>(&self, holidays: H) -> Self {
        Self {
            weekend: self.weekend,
            holidays: holidays.into_iter().collect(),
        }
    }

    pub fn weekend(&self) -> Vec<Weekday> {
        WEEK.iter()
            .copied()
            .filter(|day| self.weekend[day.num_days_from_monday() as usize])
            .collect()
    }

    pub fn holidays(&self) -> impl Iterator<Item = &NaiveDate> {
        self.holidays.iter()
    }

    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        self.weekend[date.weekday().num_days_from_monday() as usize]
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.is_weekend(date) && !self.is_holiday(date)
    }

    /// Walks forward from `start` until `working_days` working days have been
    /// counted. The last counted day is the end of the span. A holiday that
    /// falls on a weekend is counted as a weekend day.
    pub fn span(&self, start: NaiveDate, working_days: u32) -> Result<ScheduleSpan> {
        if working_days == 0 {
            return Err(anyhow!("Duration must be at least one working day"));
        }

        let mut span = ScheduleSpan {
            start,
            end: start,
            working_days: 0,
            weekend_days: 0,
            holiday_days: 0,
            calendar_days: 0,
        };
        let mut day = start;
        loop {
            span.calendar_days += 1;
            if self.is_weekend(day) {
                span.weekend_days += 1;
            } else if self.is_holiday(day) {
                span.holiday_days += 1;
            } else {
                span.working_days += 1;
                if span.working_days == working_days {
                    span.end = day;
                    return Ok(span);
                }
            }
            day = day.succ_opt().ok_or_else(|| {
                anyhow!(
                    "A {} day schedule starting {} runs past the last supported date",
                    working_days,
                    start
                )
            })?;
        }
    }

    pub fn end_date(&self, start: NaiveDate, working_days: u32) -> Result<NaiveDate> {
        Ok(self.span(start, working_days)?.end)
    }
}

fn weekend_mask<W: IntoIterator<Item = Weekday>>(days: W) -> [bool; 7] {
    let mut mask = [false; 7];
    for day in days {
        mask[day.num_days_from_monday() as usize] = true;
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_single_day_on_working_day() {
        let calendar = WorkCalendar::default();
        // Monday
        let span = calendar.span(date("2024-03-11"), 1).unwrap();
        assert_eq!(span.end, date("2024-03-11"));
        assert_eq!(span.calendar_days, 1);
        assert_eq!(span.working_days, 1);
    }

    #[test]
    fn test_skips_weekend() {
        let calendar = WorkCalendar::default();
        // Thursday + 5 working days -> Thu, Fri, Mon, Tue, Wed
        let span = calendar.span(date("2024-03-14"), 5).unwrap();
        assert_eq!(span.end, date("2024-03-20"));
        assert_eq!(span.weekend_days, 2);
        assert_eq!(span.holiday_days, 0);
        assert_eq!(span.calendar_days, 7);
    }

    #[test]
    fn test_weekend_start_is_skipped() {
        let calendar = WorkCalendar::default();
        // Saturday start, first working day is Monday
        let span = calendar.span(date("2024-03-16"), 1).unwrap();
        assert_eq!(span.start, date("2024-03-16"));
        assert_eq!(span.end, date("2024-03-18"));
        assert_eq!(span.weekend_days, 2);
        assert_eq!(span.calendar_days, 3);
    }

    #[test]
    fn test_skips_holidays() {
        let calendar =
            WorkCalendar::new([Weekday::Sat, Weekday::Sun], [date("2024-12-25")]).unwrap();
        // Mon 23, Tue 24, (Wed 25 holiday), Thu 26
        let span = calendar.span(date("2024-12-23"), 3).unwrap();
        assert_eq!(span.end, date("2024-12-26"));
        assert_eq!(span.holiday_days, 1);
        assert_eq!(span.weekend_days, 0);
    }

    #[test]
    fn test_holiday_on_weekend_counts_once() {
        let calendar =
            WorkCalendar::new([Weekday::Sat, Weekday::Sun], [date("2024-03-16")]).unwrap();
        let span = calendar.span(date("2024-03-15"), 2).unwrap();
        assert_eq!(span.end, date("2024-03-18"));
        assert_eq!(span.weekend_days, 2);
        assert_eq!(span.holiday_days, 0);
    }

    #[test]
    fn test_end_never_lands_on_holiday() {
        let calendar = WorkCalendar::default().with_holidays([date("2024-03-18")]);
        let end = calendar.end_date(date("2024-03-15"), 2).unwrap();
        assert_eq!(end, date("2024-03-19"));
    }

    #[test]
    fn test_replace_holidays() {
        let calendar = WorkCalendar::default().with_holidays([date("2024-03-18")]);
        let replaced = calendar.replace_holidays([date("2024-03-19")]);
        assert!(!replaced.is_holiday(date("2024-03-18")));
        assert!(replaced.is_holiday(date("2024-03-19")));
        assert_eq!(replaced.holidays().count(), 1);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let calendar = WorkCalendar::default();
        assert!(calendar.span(date("2024-03-15"), 0).is_err());
    }

    #[test]
    fn test_full_week_weekend_rejected() {
        assert!(WorkCalendar::new(WEEK, Vec::<NaiveDate>::new()).is_err());
    }

    #[test]
    fn test_custom_weekend() {
        let calendar =
            WorkCalendar::new([Weekday::Fri, Weekday::Sat], Vec::<NaiveDate>::new()).unwrap();
        assert_eq!(calendar.weekend(), vec![Weekday::Fri, Weekday::Sat]);
        // Thursday + 2 working days -> Thu, Sun
        let end = calendar.end_date(date("2024-03-14"), 2).unwrap();
        assert_eq!(end, date("2024-03-17"));
    }

    #[test]
    fn test_span_properties_hold() {
        let holidays = [
            date("2024-01-01"),
            date("2024-03-29"),
            date("2024-04-01"),
            date("2024-05-06"),
            date("2024-12-25"),
            date("2024-12-26"),
        ];
        let calendar = WorkCalendar::new([Weekday::Sat, Weekday::Sun], holidays).unwrap();
        let mut start = date("2023-12-20");
        while start < date("2025-01-10") {
            for duration in [1, 2, 5, 9, 20, 60] {
                let span = calendar.span(start, duration).unwrap();
                assert!(calendar.is_working_day(span.end), "{:?}", span);
                assert!(!holidays.contains(&span.end));
                assert_eq!(span.working_days, duration);
                assert_eq!(
                    span.working_days + span.weekend_days + span.holiday_days,
                    span.calendar_days
                );
                assert_eq!(
                    (span.end - span.start).num_days() + 1,
                    span.calendar_days as i64
                );
            }
            start = start.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_overflow_is_an_error() {
        let calendar = WorkCalendar::default();
        assert!(calendar.span(NaiveDate::MAX, 10).is_err());
    }
}
