//! Period classifier.
//!
//! Pure date arithmetic used by budgets and bill reminders:
//!
//! - [`window_for`] maps a budget period, its anchor and an "as of" date to
//!   the half-open window `[start, end)` the date falls in;
//! - [`urgency_of`] classifies a due date as overdue, urgent or upcoming.
//!
//! Nothing here touches the database or the clock, every function is
//! deterministic given its inputs.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Days before a due date during which a reminder counts as urgent
/// (inclusive).
pub const URGENT_WITHIN_DAYS: i64 = 3;

/// Length of a budget period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    Month,
    Year,
}

impl BudgetPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl TryFrom<&str> for BudgetPeriod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(EngineError::InvalidPeriod(format!(
                "expected 'month' or 'year', got '{other}'"
            ))),
        }
    }
}

/// How period windows are positioned on the calendar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodAlignment {
    /// Windows are calendar months / calendar years.
    #[default]
    Calendar,
    /// Windows start on the anchor's day and repeat every month / year from
    /// there. Days missing from a month (31st, Feb 29) clamp to its last day.
    Anchored,
}

/// A half-open date range `[start, end)` for one budget period instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodWindow {
    pub period: BudgetPeriod,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Stable identifier of this period instance.
    ///
    /// Month windows use `year * 12 + month0` of their start, year windows
    /// use the start year. Consecutive windows always get distinct indexes
    /// under both alignments because each window starts in a different month
    /// (or year).
    pub fn index(&self) -> i64 {
        match self.period {
            BudgetPeriod::Month => month_ordinal(self.start),
            BudgetPeriod::Year => i64::from(self.start.year()),
        }
    }

    /// Whole days left from `as_of` until the window closes, or `None` once
    /// the window has elapsed.
    pub fn days_remaining(&self, as_of: NaiveDate) -> Option<i64> {
        if as_of >= self.end {
            return None;
        }
        Some((self.end - as_of).num_days().max(0))
    }
}

/// Returns the window of `period` that contains `as_of`.
pub fn window_for(
    period: BudgetPeriod,
    alignment: PeriodAlignment,
    anchor: NaiveDate,
    as_of: NaiveDate,
) -> ResultEngine<PeriodWindow> {
    let (start, end) = match (period, alignment) {
        (BudgetPeriod::Month, PeriodAlignment::Calendar) => {
            let start = first_of_month(month_ordinal(as_of))?;
            (start, first_of_month(month_ordinal(as_of) + 1)?)
        }
        (BudgetPeriod::Year, PeriodAlignment::Calendar) => {
            let year = i64::from(as_of.year());
            (first_of_year(year)?, first_of_year(year + 1)?)
        }
        (BudgetPeriod::Month, PeriodAlignment::Anchored) => {
            let mut step = month_ordinal(as_of) - month_ordinal(anchor);
            if anchored_month(anchor, step)? > as_of {
                step -= 1;
            }
            (anchored_month(anchor, step)?, anchored_month(anchor, step + 1)?)
        }
        (BudgetPeriod::Year, PeriodAlignment::Anchored) => {
            let mut step = i64::from(as_of.year()) - i64::from(anchor.year());
            if anchored_year(anchor, step)? > as_of {
                step -= 1;
            }
            (anchored_year(anchor, step)?, anchored_year(anchor, step + 1)?)
        }
    };

    Ok(PeriodWindow { period, start, end })
}

/// Urgency of something due on a given date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyTier {
    Overdue,
    Urgent,
    Upcoming,
}

impl UrgencyTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Urgent => "urgent",
            Self::Upcoming => "upcoming",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Urgency {
    pub tier: UrgencyTier,
    pub days_until: i64,
}

pub fn urgency_of(due: NaiveDate, as_of: NaiveDate) -> Urgency {
    let days_until = (due - as_of).num_days();
    let tier = if days_until < 0 {
        UrgencyTier::Overdue
    } else if days_until <= URGENT_WITHIN_DAYS {
        UrgencyTier::Urgent
    } else {
        UrgencyTier::Upcoming
    };
    Urgency { tier, days_until }
}

fn month_ordinal(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn out_of_range() -> EngineError {
    EngineError::InvalidDate("date out of supported range".to_string())
}

fn ymd(year: i64, month: u32, day: u32) -> ResultEngine<NaiveDate> {
    let year = i32::try_from(year).map_err(|_| out_of_range())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(out_of_range)
}

fn first_of_month(ordinal: i64) -> ResultEngine<NaiveDate> {
    // month0 is in 0..12, the cast cannot truncate.
    ymd(ordinal.div_euclid(12), ordinal.rem_euclid(12) as u32 + 1, 1)
}

fn first_of_year(year: i64) -> ResultEngine<NaiveDate> {
    ymd(year, 1, 1)
}

fn last_day_of_month(year: i64, month: u32) -> ResultEngine<u32> {
    let next = first_of_month(year * 12 + i64::from(month))?;
    next.pred_opt().map(|d| d.day()).ok_or_else(out_of_range)
}

fn clamped(year: i64, month: u32, day: u32) -> ResultEngine<NaiveDate> {
    let day = day.min(last_day_of_month(year, month)?);
    ymd(year, month, day)
}

fn anchored_month(anchor: NaiveDate, step: i64) -> ResultEngine<NaiveDate> {
    let ordinal = month_ordinal(anchor) + step;
    clamped(
        ordinal.div_euclid(12),
        ordinal.rem_euclid(12) as u32 + 1,
        anchor.day(),
    )
}

fn anchored_year(anchor: NaiveDate, step: i64) -> ResultEngine<NaiveDate> {
    clamped(i64::from(anchor.year()) + step, anchor.month(), anchor.day())
}
