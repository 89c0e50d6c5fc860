//! # Calendar
//!
//! $$
//! \Delta t\in\{\tfrac1{252},\tfrac1{52},\tfrac1{12}\}
//! $$
//!
//! Sampling frequencies and the observation dates they produce.

use std::fmt::Display;

use chrono::Datelike;
use chrono::Days;
use chrono::Months;
use chrono::NaiveDate;
use chrono::Weekday;

/// Observation frequency of a simulated price series.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Frequency {
  #[default]
  Daily,
  Weekly,
  Monthly,
}

impl Frequency {
  /// Observations per year: 252 trading days, 52 weeks or 12 months.
  pub fn periods_per_year(self) -> u32 {
    match self {
      Frequency::Daily => 252,
      Frequency::Weekly => 52,
      Frequency::Monthly => 12,
    }
  }

  /// Length of one step in years.
  pub fn time_step(self) -> f64 {
    1.0 / self.periods_per_year() as f64
  }

  /// Parse a frequency label; unknown labels fall back to daily.
  pub fn from_str(s: &str) -> Self {
    match s.to_lowercase().as_str() {
      "weekly" | "week" | "w" => Self::Weekly,
      "monthly" | "month" | "m" => Self::Monthly,
      _ => Self::Daily,
    }
  }
}

impl Display for Frequency {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Frequency::Daily => write!(f, "daily"),
      Frequency::Weekly => write!(f, "weekly"),
      Frequency::Monthly => write!(f, "monthly"),
    }
  }
}

fn is_weekend(date: NaiveDate) -> bool {
  matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn next_weekday(mut date: NaiveDate) -> Option<NaiveDate> {
  while is_weekend(date) {
    date = date.checked_add_days(Days::new(1))?;
  }
  Some(date)
}

fn advance(date: NaiveDate, frequency: Frequency) -> Option<NaiveDate> {
  match frequency {
    Frequency::Daily => next_weekday(date.checked_add_days(Days::new(1))?),
    Frequency::Weekly => date.checked_add_days(Days::new(7)),
    Frequency::Monthly => date.checked_add_months(Months::new(1)),
  }
}

/// `num_points` observation dates starting at `start`.
///
/// Daily sequences skip weekends and begin on the first weekday on or after `start`.
/// The sequence stops early only if the calendar overflows.
pub fn generate_date_sequence(
  start: NaiveDate,
  num_points: usize,
  frequency: Frequency,
) -> Vec<NaiveDate> {
  let mut dates = Vec::with_capacity(num_points);
  let first = match frequency {
    Frequency::Daily => next_weekday(start),
    _ => Some(start),
  };

  let mut current = first;
  while dates.len() < num_points {
    let Some(date) = current else { break };
    dates.push(date);
    current = advance(date, frequency);
  }

  dates
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn daily_sequence_skips_weekends() {
    // 2024-01-05 is a Friday
    let dates = generate_date_sequence(ymd(2024, 1, 5), 4, Frequency::Daily);
    assert_eq!(
      dates,
      vec![ymd(2024, 1, 5), ymd(2024, 1, 8), ymd(2024, 1, 9), ymd(2024, 1, 10)]
    );
  }

  #[test]
  fn daily_sequence_starting_on_weekend_moves_to_monday() {
    let dates = generate_date_sequence(ymd(2024, 1, 6), 2, Frequency::Daily);
    assert_eq!(dates, vec![ymd(2024, 1, 8), ymd(2024, 1, 9)]);
  }

  #[test]
  fn weekly_and_monthly_steps() {
    let weekly = generate_date_sequence(ymd(2024, 1, 1), 3, Frequency::Weekly);
    assert_eq!(weekly, vec![ymd(2024, 1, 1), ymd(2024, 1, 8), ymd(2024, 1, 15)]);

    let monthly = generate_date_sequence(ymd(2024, 1, 31), 3, Frequency::Monthly);
    assert_eq!(
      monthly,
      vec![ymd(2024, 1, 31), ymd(2024, 2, 29), ymd(2024, 3, 29)]
    );
  }

  #[test]
  fn frequency_steps() {
    assert_eq!(Frequency::Daily.time_step(), 1.0 / 252.0);
    assert_eq!(Frequency::from_str("Weekly"), Frequency::Weekly);
    assert_eq!(Frequency::from_str("monthly").periods_per_year(), 12);
    assert_eq!(Frequency::from_str("??"), Frequency::Daily);
  }
}
