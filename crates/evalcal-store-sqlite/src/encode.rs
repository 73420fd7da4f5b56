//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Dates are stored as the Unix timestamp of midnight UTC, the way a hosted
//! document database stores a timestamp field. They are converted back to a
//! plain calendar date here, so no timestamp ever leaves this crate. Catalog
//! values are stored as their display labels.

use chrono::{DateTime, NaiveDate, NaiveTime};
use evalcal_core::{
  catalog::{Catalog, Course, Instrument, Subject},
  evaluation::{Evaluation, EvaluationId},
  user::UserId,
};

use crate::{Error, Result};

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_date(date: NaiveDate) -> i64 { date.and_time(NaiveTime::MIN).and_utc().timestamp() }

pub fn decode_date(ts: i64) -> Result<NaiveDate> {
  DateTime::from_timestamp(ts, 0)
    .map(|dt| dt.date_naive())
    .ok_or_else(|| Error::DateParse(format!("timestamp out of range: {ts}")))
}

// ─── Catalogs ────────────────────────────────────────────────────────────────

pub fn encode_label<C: Catalog>(value: C) -> String { value.to_string() }

pub fn decode_label<C: Catalog>(label: &str) -> Result<C> { Ok(C::parse_label(label)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `evaluations` row.
pub struct RawEvaluation {
  pub id:             String,
  pub date_ts:        i64,
  pub subject:        String,
  pub course:         String,
  pub content:        String,
  pub instrument:     String,
  pub instrument_url: String,
  pub creator_id:     String,
}

impl RawEvaluation {
  pub const COLUMNS: &'static str =
    "id, date_ts, subject, course, content, instrument, instrument_url, creator_id";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      date_ts:        row.get(1)?,
      subject:        row.get(2)?,
      course:         row.get(3)?,
      content:        row.get(4)?,
      instrument:     row.get(5)?,
      instrument_url: row.get(6)?,
      creator_id:     row.get(7)?,
    })
  }

  pub fn from_evaluation(evaluation: &Evaluation) -> Self {
    Self {
      id:             evaluation.id.as_str().to_owned(),
      date_ts:        encode_date(evaluation.date),
      subject:        encode_label(evaluation.subject),
      course:         encode_label(evaluation.course),
      content:        evaluation.content.clone(),
      instrument:     encode_label(evaluation.instrument),
      instrument_url: evaluation.instrument_url.clone(),
      creator_id:     evaluation.creator_id.as_str().to_owned(),
    }
  }

  pub fn into_evaluation(self) -> Result<Evaluation> {
    Ok(Evaluation {
      id:             EvaluationId::new(self.id),
      date:           decode_date(self.date_ts)?,
      subject:        decode_label::<Subject>(&self.subject)?,
      course:         decode_label::<Course>(&self.course)?,
      content:        self.content,
      instrument:     decode_label::<Instrument>(&self.instrument)?,
      instrument_url: self.instrument_url,
      creator_id:     UserId::new(self.creator_id),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn date_is_stored_as_utc_midnight() {
    let date = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
    let ts = encode_date(date);
    assert_eq!(ts, 1_721_001_600);
    assert_eq!(decode_date(ts).unwrap(), date);
  }

  #[test]
  fn unknown_label_is_a_core_error() {
    let err = decode_label::<Course>("5°Z").unwrap_err();
    assert!(matches!(err, Error::Core(evalcal_core::Error::UnknownCatalogValue { .. })));
  }
}
