//! Evaluation records — the sole persisted entity.
//!
//! An [`Evaluation`] is read-only once delivered to a consumer. Writes go
//! through [`NewEvaluation`] (creation) and [`EvaluationPatch`] (partial
//! replacement); both are validated before a backend ever sees them.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  catalog::{Course, Instrument, Subject},
  user::UserId,
};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque, backend-assigned evaluation identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationId(String);

impl EvaluationId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for EvaluationId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for EvaluationId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for EvaluationId {
  fn from(s: String) -> Self { Self(s) }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A scheduled academic assessment.
///
/// Serialises with the camelCase field names of the stored document
/// (`instrumentUrl`, `creatorId`) and `date` as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
  pub id:             EvaluationId,
  pub date:           NaiveDate,
  pub subject:        Subject,
  pub course:         Course,
  pub content:        String,
  pub instrument:     Instrument,
  #[serde(default)]
  pub instrument_url: String,
  pub creator_id:     UserId,
}

/// Everything needed to create an evaluation. The id is assigned by the
/// backend and the creator by the caller's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvaluation {
  pub date:           NaiveDate,
  pub subject:        Subject,
  pub course:         Course,
  pub content:        String,
  pub instrument:     Instrument,
  #[serde(default)]
  pub instrument_url: String,
}

/// Partial replacement of an evaluation's editable fields. `None` leaves a
/// field untouched; `id` and `creator_id` are not representable here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationPatch {
  pub date:           Option<NaiveDate>,
  pub subject:        Option<Subject>,
  pub course:         Option<Course>,
  pub content:        Option<String>,
  pub instrument:     Option<Instrument>,
  pub instrument_url: Option<String>,
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Parse a canonical `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_owned()))
}

/// Enforce the content and instrument-link rules, clearing a link the
/// instrument does not take.
fn check_fields(content: &str, instrument: Instrument, url: &mut String) -> Result<()> {
  if content.trim().is_empty() {
    return Err(Error::Validation("content must not be empty".into()));
  }
  if instrument.requires_url() {
    if url.trim().is_empty() {
      return Err(Error::Validation(format!("{instrument} requires an instrument URL")));
    }
  } else {
    url.clear();
  }
  Ok(())
}

impl NewEvaluation {
  /// Validate and normalise for storage.
  pub fn normalized(mut self) -> Result<Self> {
    check_fields(&self.content, self.instrument, &mut self.instrument_url)?;
    Ok(self)
  }
}

impl Evaluation {
  /// Materialise a stored record from validated input.
  pub fn from_new(id: EvaluationId, new: NewEvaluation, creator_id: UserId) -> Self {
    Self {
      id,
      date: new.date,
      subject: new.subject,
      course: new.course,
      content: new.content,
      instrument: new.instrument,
      instrument_url: new.instrument_url,
      creator_id,
    }
  }

  /// Merge `patch` over this record and validate the result. Identity and
  /// ownership are carried over unchanged.
  pub fn patched(&self, patch: EvaluationPatch) -> Result<Self> {
    let mut next = self.clone();
    if let Some(date) = patch.date {
      next.date = date;
    }
    if let Some(subject) = patch.subject {
      next.subject = subject;
    }
    if let Some(course) = patch.course {
      next.course = course;
    }
    if let Some(content) = patch.content {
      next.content = content;
    }
    if let Some(instrument) = patch.instrument {
      next.instrument = instrument;
    }
    if let Some(url) = patch.instrument_url {
      next.instrument_url = url;
    }
    check_fields(&next.content, next.instrument, &mut next.instrument_url)?;
    Ok(next)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rubric() -> NewEvaluation {
    NewEvaluation {
      date:           parse_date("2024-07-15").unwrap(),
      subject:        Subject::Mathematics,
      course:         Course::Medio3A,
      content:        "Ecuaciones de segundo grado".into(),
      instrument:     Instrument::Rubric,
      instrument_url: "https://x/y.pdf".into(),
    }
  }

  fn stored() -> Evaluation {
    Evaluation::from_new("eval1".into(), rubric(), "u1".into())
  }

  #[test]
  fn serialises_with_document_field_names() {
    let value = serde_json::to_value(stored()).unwrap();
    assert_eq!(value["date"], "2024-07-15");
    assert_eq!(value["course"], "3°A");
    assert_eq!(value["instrument"], "Rúbrica");
    assert_eq!(value["instrumentUrl"], "https://x/y.pdf");
    assert_eq!(value["creatorId"], "u1");
    assert_eq!(value["id"], "eval1");
  }

  #[test]
  fn missing_instrument_url_deserialises_empty() {
    let ev: Evaluation = serde_json::from_str(
      r#"{"id":"eval2","date":"2024-07-22","subject":"Lengua y Literatura",
          "course":"1°B","content":"Cien Años de Soledad",
          "instrument":"Prueba Global","creatorId":"another-teacher-uid"}"#,
    )
    .unwrap();
    assert_eq!(ev.instrument_url, "");
    assert_eq!(ev.instrument, Instrument::GlobalTest);
  }

  #[test]
  fn rejects_blank_content() {
    let mut new = rubric();
    new.content = "   ".into();
    assert!(matches!(new.normalized(), Err(Error::Validation(_))));
  }

  #[test]
  fn rubric_without_url_is_rejected() {
    let mut new = rubric();
    new.instrument_url.clear();
    assert!(matches!(new.normalized(), Err(Error::Validation(_))));
  }

  #[test]
  fn url_is_cleared_for_instruments_without_one() {
    let mut new = rubric();
    new.instrument = Instrument::WrittenTest;
    let new = new.normalized().unwrap();
    assert_eq!(new.instrument_url, "");
  }

  #[test]
  fn patch_preserves_identity_and_owner() {
    let original = stored();
    let patched = original
      .patched(EvaluationPatch {
        content: Some("Funciones cuadráticas".into()),
        course: Some(Course::Medio3B),
        ..Default::default()
      })
      .unwrap();
    assert_eq!(patched.id, original.id);
    assert_eq!(patched.creator_id, original.creator_id);
    assert_eq!(patched.content, "Funciones cuadráticas");
    assert_eq!(patched.course, Course::Medio3B);
    assert_eq!(patched.instrument_url, original.instrument_url);
  }

  #[test]
  fn patch_switching_instrument_drops_stale_url() {
    let patched = stored()
      .patched(EvaluationPatch {
        instrument: Some(Instrument::GlobalTest),
        ..Default::default()
      })
      .unwrap();
    assert_eq!(patched.instrument_url, "");
  }

  #[test]
  fn patch_to_checklist_needs_url() {
    let mut base = stored();
    base.instrument = Instrument::WrittenTest;
    base.instrument_url.clear();
    let result = base.patched(EvaluationPatch {
      instrument: Some(Instrument::Checklist),
      ..Default::default()
    });
    assert!(matches!(result, Err(Error::Validation(_))));
  }

  #[test]
  fn parse_date_rejects_timestamps() {
    assert!(parse_date("2024-07-15").is_ok());
    assert_eq!(
      parse_date("2024-07-15T00:00:00Z"),
      Err(Error::InvalidDate("2024-07-15T00:00:00Z".into()))
    );
  }
}
