//! Read-side selections over a delivered snapshot.
//!
//! Everything here is pure: it borrows a slice of evaluations and returns a
//! new, independently owned vector. Snapshots themselves are never mutated.

use chrono::{Datelike, NaiveDate};

use crate::{
  catalog::{Course, Subject},
  evaluation::Evaluation,
  user::UserId,
};

/// Course/subject filter of the public calendar. `None` is the "all"
/// wildcard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationFilter {
  pub course:  Option<Course>,
  pub subject: Option<Subject>,
}

impl EvaluationFilter {
  pub fn matches(&self, evaluation: &Evaluation) -> bool {
    self.course.is_none_or(|c| evaluation.course == c)
      && self.subject.is_none_or(|s| evaluation.subject == s)
  }

  pub fn apply(&self, evaluations: &[Evaluation]) -> Vec<Evaluation> {
    evaluations.iter().filter(|e| self.matches(e)).cloned().collect()
  }
}

/// Stable ascending sort by date.
pub fn sort_by_date(evaluations: &mut [Evaluation]) {
  evaluations.sort_by_key(|e| e.date);
}

/// The dashboard list: evaluations owned by `uid`, earliest first.
pub fn created_by(evaluations: &[Evaluation], uid: &UserId) -> Vec<Evaluation> {
  let mut mine: Vec<_> =
    evaluations.iter().filter(|e| &e.creator_id == uid).cloned().collect();
  sort_by_date(&mut mine);
  mine
}

/// Evaluations scheduled on `date`.
pub fn on_date(evaluations: &[Evaluation], date: NaiveDate) -> Vec<Evaluation> {
  evaluations.iter().filter(|e| e.date == date).cloned().collect()
}

/// Evaluations falling in the given calendar month, earliest first.
pub fn in_month(evaluations: &[Evaluation], year: i32, month: u32) -> Vec<Evaluation> {
  let mut selected: Vec<_> = evaluations
    .iter()
    .filter(|e| e.date.year() == year && e.date.month() == month)
    .cloned()
    .collect();
  sort_by_date(&mut selected);
  selected
}
