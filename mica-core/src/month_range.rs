use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem::replace;

/// A calendar month. Ordering is chronological (year first, then month).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1 = January, 12 = December
    pub month: u32,
}

impl YearMonth {
    /// Returns `None` if `month` is outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(YearMonth { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following month, rolling December over into January.
    pub fn succ(self) -> Self {
        if self.month >= 12 {
            YearMonth {
                year: self.year + 1,
                month: 1,
            }
        } else {
            YearMonth {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Step back `months` calendar months.
    pub fn minus_months(self, months: u32) -> Self {
        let index = self.index() - i64::from(months);
        YearMonth::from_index(index)
    }

    /// Number of months from `self` to `other`, counting both ends.
    /// Zero when `other` is before `self`.
    pub fn months_through(self, other: YearMonth) -> usize {
        let diff = other.index() - self.index();
        if diff < 0 {
            0
        } else {
            diff as usize + 1
        }
    }

    fn index(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    fn from_index(index: i64) -> Self {
        YearMonth {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// An iterator that yields each month from the start month
/// through the end month (inclusive), across year boundaries.
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct MonthRange(pub YearMonth, pub YearMonth);

impl Iterator for MonthRange {
    type Item = YearMonth;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 <= self.1 {
            let next = self.0.succ();
            Some(replace(&mut self.0, next))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.months_through(self.1);
        (n, Some(n))
    }
}

impl ExactSizeIterator for MonthRange {}
