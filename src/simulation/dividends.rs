//! # Dividend Schedule
//!
//! $$
//! D_t = S_t\,\frac{q}{4}\quad\text{on the first observation of each quarter-end month}
//! $$
//!
use chrono::Datelike;
use chrono::NaiveDate;

use crate::error::MptError;
use crate::error::Result;
use crate::error::ensure_len;

/// Months in which a quarterly dividend is paid.
pub const DIVIDEND_MONTHS: [u32; 4] = [3, 6, 9, 12];

/// Dividend per observation date; zero unless `enabled` and the date opens a quarter-end month.
///
/// At most one payment per (year, quarter), equal to `price * annual_yield / 4`.
pub fn generate_dividends(
  dates: &[NaiveDate],
  prices: &[f64],
  annual_yield: f64,
  enabled: bool,
) -> Result<Vec<f64>> {
  ensure_len("price series", dates.len(), prices.len())?;
  if !(annual_yield >= 0.0) {
    return Err(MptError::InvalidInput(format!(
      "dividend yield must be non-negative, got {annual_yield}"
    )));
  }

  let mut dividends = vec![0.0; dates.len()];
  if !enabled {
    return Ok(dividends);
  }

  let mut last_paid: Option<(i32, u32)> = None;
  for (i, date) in dates.iter().enumerate() {
    let month = date.month();
    if !DIVIDEND_MONTHS.contains(&month) {
      continue;
    }
    let quarter = (date.year(), month);
    if last_paid == Some(quarter) {
      continue;
    }
    dividends[i] = prices[i] * annual_yield / 4.0;
    last_paid = Some(quarter);
  }

  Ok(dividends)
}
