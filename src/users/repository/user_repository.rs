use thiserror::Error;

use crate::shared::model::user::TestUser;

#[derive(Debug, Error)]
pub enum UserRepositoryError {
  #[error("Database error: {0}")]
  DatabaseError(#[from] sqlx::Error),

  #[error("MongoDB error: {0}")]
  MongoError(#[from] mongodb::error::Error),

  #[error("Serialization error: {0}")]
  SerializationError(#[from] serde_json::Error),

  #[error("Invalid connection URI: {0}")]
  InvalidUri(#[from] url::ParseError),

  #[error("Invalid user definition: {0}")]
  ValidationError(#[from] validator::ValidationErrors),

  #[error("Database {0} does not exist")]
  DatabaseMissing(String),

  #[error("User {0} already exists")]
  AlreadyExists(String),

  #[error("User {0} not found")]
  NotFound(String),

  #[error(
    "Role {0} still owns objects, run REASSIGN OWNED or DROP OWNED in its \
     databases before removing it"
  )]
  OwnsObjects(String),

  #[error("Other error: {0}")]
  Other(String),
}

/// Account management on one database server.
pub trait UserRepository {
  async fn exists(&self, user: &TestUser) -> Result<bool, UserRepositoryError>;

  /// Creates the account and its grants. Returns `AlreadyExists` when the
  /// server reports a duplicate.
  async fn create(&self, user: &TestUser) -> Result<(), UserRepositoryError>;

  /// Drops the account. Returns `NotFound` when there is nothing to drop.
  async fn remove(&self, user: &TestUser) -> Result<(), UserRepositoryError>;
}

/// Masks the password in a statement before it is logged.
pub fn redact(statement: &str, password: &str) -> String {
  if password.is_empty() {
    return statement.to_string();
  }
  statement.replace(password, "****")
}
