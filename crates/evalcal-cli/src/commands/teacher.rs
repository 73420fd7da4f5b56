//! Account administration for the SQLite backend.

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use evalcal_store_sqlite::SqliteStore;
use rand_core::OsRng;

use super::read_password;

pub fn hash_password(password: &str) -> anyhow::Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| anyhow::anyhow!("hashing failed: {e}"))?
    .to_string();
  Ok(hash)
}

pub async fn add_teacher(store: &SqliteStore, email: &str) -> anyhow::Result<()> {
  let password = read_password(std::env::var("EVALCAL_PASSWORD").ok())?;
  if password.is_empty() {
    anyhow::bail!("password must not be empty");
  }
  let teacher = store.add_teacher(email, &password).await?;
  println!("registered {} as {}", email, teacher.uid);
  Ok(())
}
