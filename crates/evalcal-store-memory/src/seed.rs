//! Demo account and demo evaluations.

use chrono::NaiveDate;
use evalcal_core::{
  catalog::{Course, Instrument, Subject},
  evaluation::Evaluation,
  user::UserId,
};

pub const DEMO_TEACHER_UID: &str = "mock-teacher-uid-123";
pub const DEMO_TEACHER_EMAIL: &str = "profesor@lir.cl";
pub const DEMO_TEACHER_PASSWORD: &str = "password123";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

pub(crate) fn demo_evaluations() -> Vec<Evaluation> {
  vec![
    Evaluation {
      id:             "eval1".into(),
      date:           date(2024, 7, 15),
      subject:        Subject::Mathematics,
      course:         Course::Medio3A,
      content:        "Ecuaciones de segundo grado".into(),
      instrument:     Instrument::Rubric,
      instrument_url: "https://example.com/rubrica-matematica.pdf".into(),
      creator_id:     UserId::new(DEMO_TEACHER_UID),
    },
    Evaluation {
      id:             "eval2".into(),
      date:           date(2024, 7, 22),
      subject:        Subject::Language,
      course:         Course::Medio1B,
      content:        "Análisis de \"Cien Años de Soledad\"".into(),
      instrument:     Instrument::GlobalTest,
      instrument_url: String::new(),
      creator_id:     UserId::new("another-teacher-uid"),
    },
    Evaluation {
      id:             "eval3".into(),
      date:           date(2024, 7, 22),
      subject:        Subject::History,
      course:         Course::Medio4C,
      content:        "La Guerra Fría".into(),
      instrument:     Instrument::Checklist,
      instrument_url: "https://example.com/pauta-historia.pdf".into(),
      creator_id:     UserId::new(DEMO_TEACHER_UID),
    },
  ]
}
