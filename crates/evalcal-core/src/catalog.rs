//! Fixed catalogs for the enumerated evaluation fields.
//!
//! Every value is stored and transmitted as its Spanish display label, e.g.
//! `"Matemática"` or `"3°A"`, and parses back from exactly that label.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::{Error, Result};

/// Shared behaviour of the three catalogs.
pub trait Catalog: Copy + fmt::Display + FromStr + IntoEnumIterator {
  /// Human-readable catalog name used in error messages.
  const KIND: &'static str;

  /// Parse a display label, reporting which catalog rejected it.
  fn parse_label(label: &str) -> Result<Self> {
    Self::from_str(label).map_err(|_| Error::UnknownCatalogValue {
      kind:  Self::KIND,
      value: label.to_owned(),
    })
  }

  /// Every value in declaration order.
  fn all() -> Vec<Self> { Self::iter().collect() }
}

// ─── Subject ─────────────────────────────────────────────────────────────────

/// School subject (asignatura).
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
pub enum Subject {
  #[serde(rename = "Matemática")]
  #[strum(serialize = "Matemática")]
  Mathematics,
  #[serde(rename = "Lengua y Literatura")]
  #[strum(serialize = "Lengua y Literatura")]
  Language,
  #[serde(rename = "Historia, Geografía y Cs. Sociales")]
  #[strum(serialize = "Historia, Geografía y Cs. Sociales")]
  History,
  #[serde(rename = "Ciencias Naturales")]
  #[strum(serialize = "Ciencias Naturales")]
  NaturalSciences,
  #[serde(rename = "Biología")]
  #[strum(serialize = "Biología")]
  Biology,
  #[serde(rename = "Química")]
  #[strum(serialize = "Química")]
  Chemistry,
  #[serde(rename = "Física")]
  #[strum(serialize = "Física")]
  Physics,
  #[serde(rename = "Inglés")]
  #[strum(serialize = "Inglés")]
  English,
  #[serde(rename = "Educación Física y Salud")]
  #[strum(serialize = "Educación Física y Salud")]
  PhysicalEducation,
  #[serde(rename = "Artes Visuales")]
  #[strum(serialize = "Artes Visuales")]
  VisualArts,
  #[serde(rename = "Música")]
  #[strum(serialize = "Música")]
  Music,
  #[serde(rename = "Tecnología")]
  #[strum(serialize = "Tecnología")]
  Technology,
  #[serde(rename = "Filosofía")]
  #[strum(serialize = "Filosofía")]
  Philosophy,
  #[serde(rename = "Religión")]
  #[strum(serialize = "Religión")]
  Religion,
}

impl Catalog for Subject {
  const KIND: &'static str = "subject";
}

// ─── Course ──────────────────────────────────────────────────────────────────

/// Class group: grade (7° and 8° básico, 1° to 4° medio) plus section letter.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
pub enum Course {
  #[serde(rename = "7°A")]
  #[strum(serialize = "7°A")]
  Basic7A,
  #[serde(rename = "7°B")]
  #[strum(serialize = "7°B")]
  Basic7B,
  #[serde(rename = "7°C")]
  #[strum(serialize = "7°C")]
  Basic7C,
  #[serde(rename = "8°A")]
  #[strum(serialize = "8°A")]
  Basic8A,
  #[serde(rename = "8°B")]
  #[strum(serialize = "8°B")]
  Basic8B,
  #[serde(rename = "8°C")]
  #[strum(serialize = "8°C")]
  Basic8C,
  #[serde(rename = "1°A")]
  #[strum(serialize = "1°A")]
  Medio1A,
  #[serde(rename = "1°B")]
  #[strum(serialize = "1°B")]
  Medio1B,
  #[serde(rename = "1°C")]
  #[strum(serialize = "1°C")]
  Medio1C,
  #[serde(rename = "2°A")]
  #[strum(serialize = "2°A")]
  Medio2A,
  #[serde(rename = "2°B")]
  #[strum(serialize = "2°B")]
  Medio2B,
  #[serde(rename = "2°C")]
  #[strum(serialize = "2°C")]
  Medio2C,
  #[serde(rename = "3°A")]
  #[strum(serialize = "3°A")]
  Medio3A,
  #[serde(rename = "3°B")]
  #[strum(serialize = "3°B")]
  Medio3B,
  #[serde(rename = "3°C")]
  #[strum(serialize = "3°C")]
  Medio3C,
  #[serde(rename = "4°A")]
  #[strum(serialize = "4°A")]
  Medio4A,
  #[serde(rename = "4°B")]
  #[strum(serialize = "4°B")]
  Medio4B,
  #[serde(rename = "4°C")]
  #[strum(serialize = "4°C")]
  Medio4C,
}

impl Catalog for Course {
  const KIND: &'static str = "course";
}

// ─── Instrument ──────────────────────────────────────────────────────────────

/// Grading instrument used for an evaluation.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
pub enum Instrument {
  #[serde(rename = "Prueba Escrita")]
  #[strum(serialize = "Prueba Escrita")]
  WrittenTest,
  #[serde(rename = "Prueba Global")]
  #[strum(serialize = "Prueba Global")]
  GlobalTest,
  #[serde(rename = "Rúbrica")]
  #[strum(serialize = "Rúbrica")]
  Rubric,
  #[serde(rename = "Pauta de Cotejo")]
  #[strum(serialize = "Pauta de Cotejo")]
  Checklist,
  #[serde(rename = "Disertación")]
  #[strum(serialize = "Disertación")]
  Presentation,
  #[serde(rename = "Trabajo Práctico")]
  #[strum(serialize = "Trabajo Práctico")]
  PracticalWork,
  #[serde(rename = "Control de Lectura")]
  #[strum(serialize = "Control de Lectura")]
  ReadingQuiz,
  #[serde(rename = "Informe")]
  #[strum(serialize = "Informe")]
  Report,
}

impl Instrument {
  /// Rubrics and checklists are published documents; the evaluation must
  /// link to them.
  pub fn requires_url(self) -> bool {
    matches!(self, Instrument::Rubric | Instrument::Checklist)
  }
}

impl Catalog for Instrument {
  const KIND: &'static str = "instrument";
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn labels_round_trip_through_display() {
    for subject in Subject::all() {
      assert_eq!(Subject::parse_label(&subject.to_string()), Ok(subject));
    }
    for course in Course::all() {
      assert_eq!(Course::parse_label(&course.to_string()), Ok(course));
    }
    for instrument in Instrument::all() {
      assert_eq!(Instrument::parse_label(&instrument.to_string()), Ok(instrument));
    }
  }

  #[test]
  fn serde_uses_display_label() {
    let json = serde_json::to_string(&Course::Medio3A).unwrap();
    assert_eq!(json, "\"3°A\"");
    let subject: Subject = serde_json::from_str("\"Lengua y Literatura\"").unwrap();
    assert_eq!(subject, Subject::Language);
    assert_eq!(
      serde_json::to_string(&Subject::History).unwrap(),
      format!("\"{}\"", Subject::History)
    );
  }

  #[test]
  fn unknown_label_names_the_catalog() {
    let err = Course::parse_label("9°Z").unwrap_err();
    assert_eq!(
      err,
      Error::UnknownCatalogValue { kind: "course", value: "9°Z".into() }
    );
  }

  #[test]
  fn only_rubric_and_checklist_need_a_url() {
    let needing: Vec<_> =
      Instrument::all().into_iter().filter(|i| i.requires_url()).collect();
    assert_eq!(needing, vec![Instrument::Rubric, Instrument::Checklist]);
  }
}
