//! [`SqliteStore`] — the SQLite implementation of both backend traits.

use std::{
  path::Path,
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
};

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use evalcal_core::{
  backend::{AuthBackend, DocumentBackend},
  evaluation::{Evaluation, EvaluationId, NewEvaluation},
  user::{AuthenticatedUser, UserId},
};
use rand_core::OsRng;
use rusqlite::OptionalExtension as _;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{Error, Result, encode::RawEvaluation, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An evaluation store and teacher registry backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:   tokio_rusqlite::Connection,
  /// Evaluation writes made through this connection. `PRAGMA data_version`
  /// only moves for commits from other connections.
  writes: Arc<AtomicU64>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, writes: Arc::default() };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, writes: Arc::default() };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Register a teacher account, storing an argon2 hash of `password`.
  ///
  /// Returns the new account with a freshly generated uid.
  pub async fn add_teacher(&self, email: &str, password: &str) -> Result<AuthenticatedUser> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| Error::PasswordHash(e.to_string()))?
      .to_string();

    let uid = Uuid::new_v4().hyphenated().to_string();
    let email_owned = email.to_owned();
    let uid_param = uid.clone();

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT OR IGNORE INTO teachers (uid, email, password_hash) VALUES (?1, ?2, ?3)",
          rusqlite::params![uid_param, email_owned, hash],
        )?;
        Ok(n)
      })
      .await?;

    if inserted == 0 {
      return Err(Error::DuplicateEmail(email.to_owned()));
    }
    info!(%uid, email, "teacher registered");
    Ok(AuthenticatedUser { uid: UserId::new(uid), email: Some(email.to_owned()) })
  }
}

// ─── AuthBackend impl ────────────────────────────────────────────────────────

impl AuthBackend for SqliteStore {
  type Error = Error;

  async fn verify_credentials<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> Result<Option<AuthenticatedUser>> {
    let email_param = email.to_owned();

    let row: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT uid, password_hash FROM teachers WHERE email = ?1",
              rusqlite::params![email_param],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    let Some((uid, stored_hash)) = row else {
      debug!(email, "no such teacher");
      return Ok(None);
    };

    let parsed = PasswordHash::new(&stored_hash).map_err(|e| Error::PasswordHash(e.to_string()))?;
    if Argon2::default().verify_password(password.as_bytes(), &parsed).is_err() {
      debug!(email, "password mismatch");
      return Ok(None);
    }

    Ok(Some(AuthenticatedUser { uid: UserId::new(uid), email: Some(email.to_owned()) }))
  }

  async fn end_session(&self) -> Result<()> {
    // Sessions are process-local; nothing is persisted for them.
    Ok(())
  }
}

// ─── DocumentBackend impl ────────────────────────────────────────────────────

impl DocumentBackend for SqliteStore {
  type Error = Error;

  async fn revision(&self) -> Result<u64> {
    let data_version: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("PRAGMA data_version", [], |row| row.get(0))?))
      .await?;
    Ok(data_version.unsigned_abs() + self.writes.load(Ordering::Acquire))
  }

  async fn list_evaluations(&self) -> Result<Vec<Evaluation>> {
    let raws: Vec<RawEvaluation> = self
      .conn
      .call(|conn| {
        let sql = format!("SELECT {} FROM evaluations ORDER BY rowid", RawEvaluation::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawEvaluation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvaluation::into_evaluation).collect()
  }

  async fn insert_evaluation(
    &self,
    input: NewEvaluation,
    creator_id: UserId,
  ) -> Result<Evaluation> {
    let evaluation = Evaluation::from_new(
      EvaluationId::new(Uuid::new_v4().hyphenated().to_string()),
      input,
      creator_id,
    );
    let raw = RawEvaluation::from_evaluation(&evaluation);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO evaluations (
             id, date_ts, subject, course, content, instrument, instrument_url, creator_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            raw.id,
            raw.date_ts,
            raw.subject,
            raw.course,
            raw.content,
            raw.instrument,
            raw.instrument_url,
            raw.creator_id,
          ],
        )?;
        Ok(())
      })
      .await?;
    self.writes.fetch_add(1, Ordering::AcqRel);

    Ok(evaluation)
  }

  async fn replace_evaluation(&self, evaluation: Evaluation) -> Result<bool> {
    let raw = RawEvaluation::from_evaluation(&evaluation);

    // Ownership is fixed at insert: creator_id is never SET.
    let changed = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE evaluations
              SET date_ts = ?2, subject = ?3, course = ?4, content = ?5,
                  instrument = ?6, instrument_url = ?7
            WHERE id = ?1",
          rusqlite::params![
            raw.id,
            raw.date_ts,
            raw.subject,
            raw.course,
            raw.content,
            raw.instrument,
            raw.instrument_url,
          ],
        )?;
        Ok(n)
      })
      .await?;

    if changed > 0 {
      self.writes.fetch_add(1, Ordering::AcqRel);
    }
    Ok(changed > 0)
  }

  async fn delete_evaluation<'a>(&'a self, id: &'a EvaluationId) -> Result<bool> {
    let id_str = id.as_str().to_owned();

    let removed = self
      .conn
      .call(move |conn| {
        let n = conn.execute("DELETE FROM evaluations WHERE id = ?1", rusqlite::params![id_str])?;
        Ok(n)
      })
      .await?;

    if removed > 0 {
      self.writes.fetch_add(1, Ordering::AcqRel);
    }
    Ok(removed > 0)
  }
}
