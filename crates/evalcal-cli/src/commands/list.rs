use chrono::NaiveDate;
use clap::Args;
use evalcal_core::{
  catalog::{Course, Subject},
  evaluation::Evaluation,
  query::{EvaluationFilter, created_by, in_month, on_date},
};

use super::{Backend, Credentials, Month, Services, catalog, date, month};

#[derive(Args)]
pub struct ListArgs {
  #[arg(long, value_parser = catalog::<Course>)]
  course:   Option<Course>,
  #[arg(long, value_parser = catalog::<Subject>)]
  subject:  Option<Subject>,
  /// Only evaluations in this month (`YYYY-MM`).
  #[arg(long, value_parser = month)]
  month:    Option<Month>,
  /// Only evaluations on this day (`YYYY-MM-DD`).
  #[arg(long, value_parser = date)]
  on:       Option<NaiveDate>,
  /// Only evaluations created by the signed-in teacher.
  #[arg(long, requires = "email")]
  mine:     bool,
  #[arg(long)]
  email:    Option<String>,
  #[arg(long, env = "EVALCAL_PASSWORD", hide_env_values = true)]
  password: Option<String>,
  /// Print JSON instead of a table.
  #[arg(long)]
  json:     bool,
}

pub async fn run<B: Backend>(services: &Services<B>, args: ListArgs) -> anyhow::Result<()> {
  let snapshot = services.store.snapshot().await?;
  let filter = EvaluationFilter { course: args.course, subject: args.subject };
  let mut rows = filter.apply(&snapshot.evaluations);

  if args.mine
    && let Some(email) = args.email
  {
    let user = services.sign_in(Credentials { email, password: args.password }).await?;
    rows = created_by(&rows, &user.uid);
    services.session.sign_out().await?;
  }
  if let Some(Month { year, month }) = args.month {
    rows = in_month(&rows, year, month);
  }
  if let Some(day) = args.on {
    rows = on_date(&rows, day);
  }

  tracing::debug!(version = snapshot.version, shown = rows.len(), "listing");
  if args.json {
    println!("{}", serde_json::to_string_pretty(&rows)?);
  } else {
    print_table(&rows);
  }
  Ok(())
}

pub fn print_table(rows: &[Evaluation]) {
  if rows.is_empty() {
    println!("(no evaluations)");
    return;
  }
  for e in rows {
    println!(
      "{}  {:<4}  {:<36}  {:<20}  {}  [{}]",
      e.date,
      e.course.to_string(),
      e.subject.to_string(),
      e.instrument.to_string(),
      e.content,
      e.id,
    );
    if !e.instrument_url.is_empty() {
      println!("{:>12}{}", "", e.instrument_url);
    }
  }
}
