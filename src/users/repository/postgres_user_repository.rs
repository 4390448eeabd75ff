use std::sync::Arc;

use log::debug;
use sqlx::{Pool, Postgres};

use super::user_repository::{redact, UserRepository, UserRepositoryError};
use crate::database::PostgresDatabase;
use crate::shared::model::user::TestUser;
use crate::shared::role::{privileges, Role};

// SQLSTATE duplicate_object
const DUPLICATE_OBJECT: &str = "42710";
// SQLSTATE dependent_objects_still_exist
const DEPENDENT_OBJECTS_STILL_EXIST: &str = "2BP01";

pub struct PostgresUserRepository {
  pool: Arc<Pool<Postgres>>,
}

impl PostgresUserRepository {
  pub fn new(database: &PostgresDatabase) -> Self {
    Self {
      pool: database.pool.clone(),
    }
  }

  async fn database_exists(
    &self,
    database: &str,
  ) -> Result<bool, UserRepositoryError> {
    let row: Option<i32> =
      sqlx::query_scalar("SELECT 1 FROM pg_database WHERE datname = $1")
        .bind(database)
        .fetch_optional(&*self.pool)
        .await?;
    Ok(row.is_some())
  }
}

impl UserRepository for PostgresUserRepository {
  async fn exists(&self, user: &TestUser) -> Result<bool, UserRepositoryError> {
    let row: Option<i32> =
      sqlx::query_scalar("SELECT 1 FROM pg_roles WHERE rolname = $1")
        .bind(&user.user_name)
        .fetch_optional(&*self.pool)
        .await?;
    Ok(row.is_some())
  }

  async fn create(&self, user: &TestUser) -> Result<(), UserRepositoryError> {
    if !self.database_exists(&user.database).await? {
      return Err(UserRepositoryError::DatabaseMissing(user.database.clone()));
    }

    let mut transaction = self.pool.begin().await?;
    for statement in create_statements(user) {
      debug!("postgres: {}", redact(&statement, &user.password));
      let executed = sqlx::query(&statement).execute(&mut *transaction).await;
      if let Err(error) = executed {
        return Err(map_error(error, user));
      }
    }
    transaction.commit().await?;
    Ok(())
  }

  async fn remove(&self, user: &TestUser) -> Result<(), UserRepositoryError> {
    if !self.exists(user).await? {
      return Err(UserRepositoryError::NotFound(user.user_name.clone()));
    }

    // Checked before `begin`, the pool holds a single connection.
    let database_exists = self.database_exists(&user.database).await?;
    let mut transaction = self.pool.begin().await?;
    if database_exists {
      let revoke = format!(
        "REVOKE ALL ON DATABASE {} FROM {}",
        quote_ident(&user.database),
        quote_ident(&user.user_name)
      );
      sqlx::query(&revoke)
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_error(error, user))?;
    }
    let drop = format!("DROP ROLE IF EXISTS {}", quote_ident(&user.user_name));
    sqlx::query(&drop)
      .execute(&mut *transaction)
      .await
      .map_err(|error| map_error(error, user))?;
    transaction.commit().await?;
    Ok(())
  }
}

fn map_error(error: sqlx::Error, user: &TestUser) -> UserRepositoryError {
  let code = error
    .as_database_error()
    .and_then(|e| e.code())
    .map(|code| code.into_owned());
  classify(code.as_deref(), user)
    .unwrap_or_else(|| UserRepositoryError::from(error))
}

/// SQLSTATEs that carry meaning for provisioning.
pub fn classify(
  code: Option<&str>,
  user: &TestUser,
) -> Option<UserRepositoryError> {
  match code? {
    DUPLICATE_OBJECT => {
      Some(UserRepositoryError::AlreadyExists(user.user_name.clone()))
    }
    DEPENDENT_OBJECTS_STILL_EXIST => {
      Some(UserRepositoryError::OwnsObjects(user.user_name.clone()))
    }
    _ => None,
  }
}

/// `CREATE ROLE` followed by the database grant.
pub fn create_statements(user: &TestUser) -> Vec<String> {
  let grants = privileges(&user.roles, Role::postgres_privileges).join(", ");
  vec![
    format!(
      "CREATE ROLE {} WITH LOGIN PASSWORD {}",
      quote_ident(&user.user_name),
      quote_literal(&user.password)
    ),
    format!(
      "GRANT {} ON DATABASE {} TO {}",
      grants,
      quote_ident(&user.database),
      quote_ident(&user.user_name)
    ),
  ]
}

pub fn quote_ident(ident: &str) -> String {
  format!("\"{}\"", ident.replace('"', "\"\""))
}

pub fn quote_literal(value: &str) -> String {
  format!("'{}'", value.replace('\'', "''"))
}
