//! Mutating commands. Each signs in first; edits and removals are limited to
//! the signed-in teacher's own records.

use chrono::NaiveDate;
use clap::Args;
use evalcal_core::{
  catalog::{Course, Instrument, Subject},
  evaluation::{EvaluationId, EvaluationPatch, NewEvaluation},
  user::AuthenticatedUser,
};

use super::{Backend, Credentials, Services, catalog, date};

#[derive(Args)]
pub struct AddArgs {
  #[command(flatten)]
  credentials: Credentials,
  #[arg(long, value_parser = date)]
  date:        NaiveDate,
  #[arg(long, value_parser = catalog::<Course>)]
  course:      Course,
  #[arg(long, value_parser = catalog::<Subject>)]
  subject:     Subject,
  #[arg(long)]
  content:     String,
  #[arg(long, value_parser = catalog::<Instrument>)]
  instrument:  Instrument,
  /// Link to the rubric or checklist document.
  #[arg(long)]
  url:         Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
  #[command(flatten)]
  credentials: Credentials,
  id:          String,
  #[arg(long, value_parser = date)]
  date:        Option<NaiveDate>,
  #[arg(long, value_parser = catalog::<Course>)]
  course:      Option<Course>,
  #[arg(long, value_parser = catalog::<Subject>)]
  subject:     Option<Subject>,
  #[arg(long)]
  content:     Option<String>,
  #[arg(long, value_parser = catalog::<Instrument>)]
  instrument:  Option<Instrument>,
  #[arg(long)]
  url:         Option<String>,
}

#[derive(Args)]
pub struct RemoveArgs {
  #[command(flatten)]
  credentials: Credentials,
  id:          String,
}

pub async fn add<B: Backend>(services: &Services<B>, args: AddArgs) -> anyhow::Result<()> {
  let user = services.sign_in(args.credentials).await?;
  let input = NewEvaluation {
    date:           args.date,
    subject:        args.subject,
    course:         args.course,
    content:        args.content,
    instrument:     args.instrument,
    instrument_url: args.url.unwrap_or_default(),
  };

  let created = services.store.create(input, user.uid).await?;
  println!("created {}", created.id);
  services.session.sign_out().await?;
  Ok(())
}

pub async fn edit<B: Backend>(services: &Services<B>, args: EditArgs) -> anyhow::Result<()> {
  let user = services.sign_in(args.credentials).await?;
  let id = EvaluationId::new(args.id);
  let known = check_owner(services, &user, &id).await?;

  let patch = EvaluationPatch {
    date:           args.date,
    subject:        args.subject,
    course:         args.course,
    content:        args.content,
    instrument:     args.instrument,
    instrument_url: args.url,
  };
  services.store.update(&id, patch).await?;
  report(known, "updated", &id);
  services.session.sign_out().await?;
  Ok(())
}

pub async fn remove<B: Backend>(services: &Services<B>, args: RemoveArgs) -> anyhow::Result<()> {
  let user = services.sign_in(args.credentials).await?;
  let id = EvaluationId::new(args.id);
  let known = check_owner(services, &user, &id).await?;

  services.store.delete(&id).await?;
  report(known, "removed", &id);
  services.session.sign_out().await?;
  Ok(())
}

/// Refuse to touch another teacher's record. Returns whether `id` exists;
/// an unknown id is left to the store's missing-record policy.
async fn check_owner<B: Backend>(
  services: &Services<B>,
  user: &AuthenticatedUser,
  id: &EvaluationId,
) -> anyhow::Result<bool> {
  let snapshot = services.store.snapshot().await?;
  match snapshot.get(id) {
    Some(existing) if existing.creator_id != user.uid => {
      anyhow::bail!("evaluation {id} belongs to another teacher")
    }
    Some(_) => Ok(true),
    None => Ok(false),
  }
}

fn report(known: bool, verb: &str, id: &EvaluationId) {
  if known {
    println!("{verb} {id}");
  } else {
    println!("no evaluation {id}; nothing changed");
  }
}
