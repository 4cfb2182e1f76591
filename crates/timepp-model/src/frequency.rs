//! Calendar frequencies for time indexes.
//!
//! Frequencies use pandas-style offset aliases (`"D"`, `"H"`, `"15min"`,
//! `"MS"`, ...). Only the units listed in [`FrequencyUnit`] are accepted.
//!
//! Start-anchored month, quarter and year steps (`MS`, `QS`, `YS`) count
//! calendar months from the start of a range, so `2024-01-31 + 1 month` is
//! `2024-02-29` and the step after that is `2024-03-31`, not `2024-03-29`.
//! End-anchored steps (`M`/`ME`, `Q`/`QE`, `Y`/`A`/`YE`) land on the last day
//! of each month, of each calendar quarter (March, June, September,
//! December) or of each year; a range starting mid-period rolls forward to
//! the first period end.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Base unit of a [`Frequency`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FrequencyUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
    MonthEnd,
    QuarterEnd,
    YearEnd,
}

impl FrequencyUnit {
    /// Canonical offset alias for this unit.
    pub fn code(&self) -> &'static str {
        match self {
            FrequencyUnit::Second => "S",
            FrequencyUnit::Minute => "min",
            FrequencyUnit::Hour => "H",
            FrequencyUnit::Day => "D",
            FrequencyUnit::Week => "W",
            FrequencyUnit::Month => "MS",
            FrequencyUnit::Quarter => "QS",
            FrequencyUnit::Year => "YS",
            FrequencyUnit::MonthEnd => "ME",
            FrequencyUnit::QuarterEnd => "QE",
            FrequencyUnit::YearEnd => "YE",
        }
    }

    /// Whether steps land on the last day of a month, quarter or year.
    pub fn is_period_end(&self) -> bool {
        matches!(
            self,
            FrequencyUnit::MonthEnd | FrequencyUnit::QuarterEnd | FrequencyUnit::YearEnd
        )
    }

    fn from_code(code: &str) -> Option<Self> {
        let unit = match code {
            "S" | "s" => FrequencyUnit::Second,
            "T" | "t" | "min" | "MIN" => FrequencyUnit::Minute,
            "H" | "h" => FrequencyUnit::Hour,
            "D" | "d" => FrequencyUnit::Day,
            "MS" => FrequencyUnit::Month,
            "QS" => FrequencyUnit::Quarter,
            "YS" | "AS" => FrequencyUnit::Year,
            "M" | "ME" => FrequencyUnit::MonthEnd,
            "Q" | "QE" => FrequencyUnit::QuarterEnd,
            "Y" | "A" | "YE" => FrequencyUnit::YearEnd,
            // Anchored weekly aliases (W-SUN, W-MON, ...) step by seven days.
            w if w == "W" || w == "w" || w.starts_with("W-") => FrequencyUnit::Week,
            _ => return None,
        };
        Some(unit)
    }
}

/// A regular step between consecutive index timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Frequency {
    multiple: u32,
    unit: FrequencyUnit,
}

impl Frequency {
    pub const SECONDLY: Frequency = Frequency::new(FrequencyUnit::Second);
    pub const MINUTELY: Frequency = Frequency::new(FrequencyUnit::Minute);
    pub const HOURLY: Frequency = Frequency::new(FrequencyUnit::Hour);
    pub const DAILY: Frequency = Frequency::new(FrequencyUnit::Day);
    pub const WEEKLY: Frequency = Frequency::new(FrequencyUnit::Week);
    pub const MONTHLY: Frequency = Frequency::new(FrequencyUnit::Month);
    pub const QUARTERLY: Frequency = Frequency::new(FrequencyUnit::Quarter);
    pub const YEARLY: Frequency = Frequency::new(FrequencyUnit::Year);
    pub const MONTH_END: Frequency = Frequency::new(FrequencyUnit::MonthEnd);
    pub const QUARTER_END: Frequency = Frequency::new(FrequencyUnit::QuarterEnd);
    pub const YEAR_END: Frequency = Frequency::new(FrequencyUnit::YearEnd);

    /// A frequency of one `unit`.
    pub const fn new(unit: FrequencyUnit) -> Self {
        Self { multiple: 1, unit }
    }

    /// A frequency of `multiple` units; `None` when `multiple` is zero.
    pub fn with_multiple(unit: FrequencyUnit, multiple: u32) -> Option<Self> {
        (multiple > 0).then_some(Self { multiple, unit })
    }

    pub fn unit(&self) -> FrequencyUnit {
        self.unit
    }

    pub fn multiple(&self) -> u32 {
        self.multiple
    }

    /// Fixed length of one step, or `None` for calendar units (months and up).
    pub fn fixed_step(&self) -> Option<TimeDelta> {
        let n = i64::from(self.multiple);
        match self.unit {
            FrequencyUnit::Second => TimeDelta::try_seconds(n),
            FrequencyUnit::Minute => TimeDelta::try_minutes(n),
            FrequencyUnit::Hour => TimeDelta::try_hours(n),
            FrequencyUnit::Day => TimeDelta::try_days(n),
            FrequencyUnit::Week => TimeDelta::try_weeks(n),
            _ => None,
        }
    }

    fn months_per_step(&self) -> Option<u32> {
        let per_unit = match self.unit {
            FrequencyUnit::Month => 1,
            FrequencyUnit::Quarter => 3,
            FrequencyUnit::Year => 12,
            _ => return None,
        };
        self.multiple.checked_mul(per_unit)
    }

    /// Timestamp `steps` steps after `start`, or `None` on overflow.
    pub fn nth_after(&self, start: NaiveDateTime, steps: u32) -> Option<NaiveDateTime> {
        if let Some(step) = self.fixed_step() {
            let offset = step.checked_mul(i32::try_from(steps).ok()?)?;
            return start.checked_add_signed(offset);
        }
        if self.unit.is_period_end() {
            return self.nth_period_end(start, steps);
        }
        let months = self.months_per_step()?.checked_mul(steps)?;
        start.checked_add_months(Months::new(months))
    }

    fn nth_period_end(&self, start: NaiveDateTime, steps: u32) -> Option<NaiveDateTime> {
        let months_per_unit: i64 = match self.unit {
            FrequencyUnit::MonthEnd => 1,
            FrequencyUnit::QuarterEnd => 3,
            FrequencyUnit::YearEnd => 12,
            _ => return None,
        };
        let month0 = i64::from(start.month0());
        let to_period_end = months_per_unit - 1 - month0 % months_per_unit;
        let first = i64::from(start.year()) * 12 + month0 + to_period_end;
        let target = first + months_per_unit * i64::from(self.multiple) * i64::from(steps);
        let year = i32::try_from(target.div_euclid(12)).ok()?;
        let month = u32::try_from(target.rem_euclid(12)).ok()? + 1;
        let last_day = NaiveDate::from_ymd_opt(year, month, 1)?
            .checked_add_months(Months::new(1))?
            .pred_opt()?;
        Some(last_day.and_time(start.time()))
    }

    /// Regular grid from `start` to `end`, both inclusive when on the grid.
    ///
    /// Returns an empty grid when `start > end`.
    pub fn date_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDateTime> {
        let mut grid = Vec::new();
        let mut steps = 0u32;
        while let Some(ts) = self.nth_after(start, steps) {
            if ts > end {
                break;
            }
            grid.push(ts);
            steps += 1;
        }
        grid
    }

    /// Seasonal period implied by this frequency's unit.
    ///
    /// Follows the conventional mapping used for seasonal decomposition:
    /// one minute per hour, one hour per day, one day per week, and so on.
    pub fn seasonal_period(&self) -> usize {
        match self.unit {
            FrequencyUnit::Second => 60,
            FrequencyUnit::Minute => 60,
            FrequencyUnit::Hour => 24,
            FrequencyUnit::Day => 7,
            FrequencyUnit::Week => 52,
            FrequencyUnit::Month | FrequencyUnit::MonthEnd => 12,
            FrequencyUnit::Quarter | FrequencyUnit::QuarterEnd => 4,
            FrequencyUnit::Year | FrequencyUnit::YearEnd => 1,
        }
    }

    /// Best-fitting frequency for a fixed step, preferring the largest unit.
    pub fn from_step(step: TimeDelta) -> Option<Self> {
        let seconds = step.num_seconds();
        if seconds <= 0 || step.subsec_nanos() != 0 {
            return None;
        }
        let candidates = [
            (FrequencyUnit::Week, 7 * 86_400),
            (FrequencyUnit::Day, 86_400),
            (FrequencyUnit::Hour, 3_600),
            (FrequencyUnit::Minute, 60),
            (FrequencyUnit::Second, 1),
        ];
        candidates.into_iter().find_map(|(unit, unit_seconds)| {
            if seconds % unit_seconds == 0 {
                let multiple = u32::try_from(seconds / unit_seconds).ok()?;
                Frequency::with_multiple(unit, multiple)
            } else {
                None
            }
        })
    }

    /// Best-fitting end-anchored frequency for month ends `months` apart,
    /// the first of them in calendar month `first_month` (1 to 12).
    pub fn from_month_ends(months: u32, first_month: u32) -> Option<Self> {
        if months % 12 == 0 && first_month == 12 {
            Frequency::with_multiple(FrequencyUnit::YearEnd, months / 12)
        } else if months % 3 == 0 && first_month % 3 == 0 {
            Frequency::with_multiple(FrequencyUnit::QuarterEnd, months / 3)
        } else {
            Frequency::with_multiple(FrequencyUnit::MonthEnd, months)
        }
    }

    /// Best-fitting start-anchored frequency for a step in calendar months.
    pub fn from_months(months: u32) -> Option<Self> {
        if months % 12 == 0 {
            Frequency::with_multiple(FrequencyUnit::Year, months / 12)
        } else if months % 3 == 0 {
            Frequency::with_multiple(FrequencyUnit::Quarter, months / 3)
        } else {
            Frequency::with_multiple(FrequencyUnit::Month, months)
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.multiple == 1 {
            f.write_str(self.unit.code())
        } else {
            write!(f, "{}{}", self.multiple, self.unit.code())
        }
    }
}

impl FromStr for Frequency {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|ch: char| !ch.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, code) = trimmed.split_at(split);
        let invalid = |reason| ModelError::InvalidFrequency {
            value: s.to_string(),
            reason,
        };
        let multiple = if digits.is_empty() {
            1
        } else {
            digits
                .parse::<u32>()
                .map_err(|_| invalid("multiple is out of range"))?
        };
        if multiple == 0 {
            return Err(invalid("multiple must be positive"));
        }
        let unit = FrequencyUnit::from_code(code).ok_or_else(|| {
            invalid("expected one of S, min, H, D, W, MS, ME, QS, QE, YS, YE (optionally prefixed by a multiple)")
        })?;
        Ok(Self { multiple, unit })
    }
}

impl TryFrom<String> for Frequency {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Frequency> for String {
    fn from(value: Frequency) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn parses_aliases_and_multiples() {
        assert_eq!("D".parse::<Frequency>().unwrap(), Frequency::DAILY);
        assert_eq!("h".parse::<Frequency>().unwrap(), Frequency::HOURLY);
        assert_eq!("T".parse::<Frequency>().unwrap(), Frequency::MINUTELY);
        assert_eq!("W-SUN".parse::<Frequency>().unwrap(), Frequency::WEEKLY);
        assert_eq!("A".parse::<Frequency>().unwrap(), Frequency::YEAR_END);
        assert_eq!("M".parse::<Frequency>().unwrap(), Frequency::MONTH_END);
        assert_eq!("MS".parse::<Frequency>().unwrap(), Frequency::MONTHLY);
        assert_eq!("QE".parse::<Frequency>().unwrap(), Frequency::QUARTER_END);

        let freq: Frequency = "15min".parse().unwrap();
        assert_eq!(freq.unit(), FrequencyUnit::Minute);
        assert_eq!(freq.multiple(), 15);
        assert_eq!(freq.to_string(), "15min");
    }

    #[test]
    fn rejects_unknown_codes() {
        assert!("X".parse::<Frequency>().is_err());
        assert!("0D".parse::<Frequency>().is_err());
        assert!("".parse::<Frequency>().is_err());
    }

    #[test]
    fn daily_range_is_inclusive() {
        let grid = Frequency::DAILY.date_range(ts(2024, 1, 1), ts(2024, 1, 5));
        assert_eq!(grid.len(), 5);
        assert_eq!(grid[4], ts(2024, 1, 5));
    }

    #[test]
    fn month_steps_are_anchored_at_start() {
        let grid = Frequency::MONTHLY.date_range(ts(2024, 1, 31), ts(2024, 4, 30));
        assert_eq!(
            grid,
            vec![ts(2024, 1, 31), ts(2024, 2, 29), ts(2024, 3, 31), ts(2024, 4, 30)]
        );
    }

    #[test]
    fn month_end_steps_land_on_last_days() {
        let grid = Frequency::MONTH_END.date_range(ts(2024, 2, 29), ts(2024, 5, 31));
        assert_eq!(
            grid,
            vec![ts(2024, 2, 29), ts(2024, 3, 31), ts(2024, 4, 30), ts(2024, 5, 31)]
        );
    }

    #[test]
    fn period_ends_roll_forward_from_mid_period_start() {
        let quarters = Frequency::QUARTER_END.date_range(ts(2024, 2, 10), ts(2024, 12, 31));
        assert_eq!(
            quarters,
            vec![ts(2024, 3, 31), ts(2024, 6, 30), ts(2024, 9, 30), ts(2024, 12, 31)]
        );
        let years = Frequency::YEAR_END.date_range(ts(2023, 7, 1), ts(2025, 12, 31));
        assert_eq!(years, vec![ts(2023, 12, 31), ts(2024, 12, 31), ts(2025, 12, 31)]);
    }

    #[test]
    fn month_end_multiples_and_codes() {
        let freq: Frequency = "2ME".parse().unwrap();
        assert_eq!(freq.to_string(), "2ME");
        let grid = freq.date_range(ts(2024, 1, 31), ts(2024, 7, 31));
        assert_eq!(
            grid,
            vec![ts(2024, 1, 31), ts(2024, 3, 31), ts(2024, 5, 31), ts(2024, 7, 31)]
        );
        assert_eq!(Frequency::QUARTER_END.seasonal_period(), 4);
    }

    #[test]
    fn empty_range_when_start_after_end() {
        assert!(Frequency::DAILY
            .date_range(ts(2024, 2, 1), ts(2024, 1, 1))
            .is_empty());
    }

    #[test]
    fn from_step_prefers_largest_unit() {
        assert_eq!(
            Frequency::from_step(TimeDelta::days(14)).unwrap().to_string(),
            "2W"
        );
        assert_eq!(
            Frequency::from_step(TimeDelta::hours(6)).unwrap().to_string(),
            "6H"
        );
        assert_eq!(Frequency::from_months(3).unwrap(), Frequency::QUARTERLY);
        assert_eq!(Frequency::from_month_ends(3, 6).unwrap(), Frequency::QUARTER_END);
        assert_eq!(Frequency::from_month_ends(3, 2).unwrap().to_string(), "3ME");
    }

    #[test]
    fn serde_uses_alias_string() {
        let json = serde_json::to_string(&Frequency::DAILY).unwrap();
        assert_eq!(json, "\"D\"");
        let back: Frequency = serde_json::from_str("\"2H\"").unwrap();
        assert_eq!(back.multiple(), 2);
    }
}
