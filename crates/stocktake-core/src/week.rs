//! Reporting-week arithmetic.
//!
//! A reporting week starts on Sunday (weekday index 0) and is identified by
//! that date, rendered as `YYYY-MM-DD`. Every [`WeekKey`] is normalised on
//! construction, so a key can never point into the middle of a week.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// The canonical identifier of one reporting week: the Sunday it begins on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey(NaiveDate);

impl WeekKey {
  /// `strftime` pattern used for the textual key.
  pub const FORMAT: &'static str = "%Y-%m-%d";

  /// The week containing `date`.
  pub fn containing(date: NaiveDate) -> Self {
    let offset = u64::from(date.weekday().num_days_from_sunday());
    // Saturates at the calendar floor.
    Self(date.checked_sub_days(Days::new(offset)).unwrap_or(date))
  }

  /// The week containing `instant`, judged by its own calendar date.
  pub fn at<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
    Self::containing(instant.date_naive())
  }

  /// The week containing today's local date.
  pub fn current() -> Self { Self::at(&Local::now()) }

  /// The week immediately before this one.
  pub fn previous(self) -> Self {
    self
      .0
      .checked_sub_days(Days::new(7))
      .map_or(self, Self)
  }

  /// The week immediately after this one.
  pub fn next(self) -> Self {
    self
      .0
      .checked_add_days(Days::new(7))
      .map_or(self, Self)
  }

  /// First day (Sunday) of the week.
  pub fn start_date(self) -> NaiveDate { self.0 }
}

/// Start of the week containing `date`, or of the current week when `None`.
pub fn week_start(date: Option<NaiveDate>) -> WeekKey {
  date.map_or_else(WeekKey::current, WeekKey::containing)
}

/// Start of the week before the one containing `date` (default: today).
pub fn previous_week_start(date: Option<NaiveDate>) -> WeekKey {
  week_start(date).previous()
}

impl fmt::Display for WeekKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.format(Self::FORMAT))
  }
}

impl FromStr for WeekKey {
  type Err = Error;

  /// Parses any `YYYY-MM-DD` date and snaps it to the start of its week.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    NaiveDate::parse_from_str(s.trim(), Self::FORMAT)
      .map(Self::containing)
      .map_err(|_| Error::InvalidWeek(s.to_owned()))
  }
}

impl From<NaiveDate> for WeekKey {
  fn from(date: NaiveDate) -> Self { Self::containing(date) }
}

impl Serialize for WeekKey {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for WeekKey {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
  }
}
