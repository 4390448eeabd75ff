use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use log::{debug, warn};
use sqlx::mysql::MySqlDatabaseError;
use sqlx::{MySql, Pool};

use super::user_repository::{redact, UserRepository, UserRepositoryError};
use crate::database::MySqlDatabase;
use crate::shared::model::user::TestUser;
use crate::shared::role::{privileges, Role};

// ER_CANNOT_USER, raised by CREATE USER on an existing account.
const CANNOT_USER: u16 = 1396;

pub struct MySqlUserRepository {
  pool: Arc<Pool<MySql>>,
}

impl MySqlUserRepository {
  pub fn new(database: &MySqlDatabase) -> Self {
    Self {
      pool: database.pool.clone(),
    }
  }
}

impl UserRepository for MySqlUserRepository {
  async fn exists(&self, user: &TestUser) -> Result<bool, UserRepositoryError> {
    let count: i64 = sqlx::query_scalar(
      "SELECT COUNT(*) FROM mysql.user WHERE User = ? AND Host = ?",
    )
    .bind(&user.user_name)
    .bind(&user.host)
    .fetch_one(&*self.pool)
    .await?;
    Ok(count > 0)
  }

  // DDL commits implicitly in MySQL, so there is no transaction here.
  async fn create(&self, user: &TestUser) -> Result<(), UserRepositoryError> {
    let pool = &*self.pool;
    create_with_rollback(user, |statement| async move {
      debug!("mysql: {}", redact(&statement, &user.password));
      sqlx::query(&statement).execute(pool).await.map(|_| ())
    })
    .await
    .map_err(|error| map_error(error, user))
  }

  async fn remove(&self, user: &TestUser) -> Result<(), UserRepositoryError> {
    if !self.exists(user).await? {
      return Err(UserRepositoryError::NotFound(user.user_name.clone()));
    }
    sqlx::query(&drop_statement(user))
      .execute(&*self.pool)
      .await
      .map_err(|error| map_error(error, user))?;
    Ok(())
  }
}

/// Runs `CREATE USER` and then the grant. When the grant fails the account
/// is dropped again, otherwise the next run would find it and skip it.
async fn create_with_rollback<E, F, Fut>(
  user: &TestUser,
  mut execute: F,
) -> Result<(), E>
where
  E: Display,
  F: FnMut(String) -> Fut,
  Fut: Future<Output = Result<(), E>>,
{
  let mut statements = create_statements(user).into_iter();
  if let Some(create_user) = statements.next() {
    execute(create_user).await?;
  }
  for grant in statements {
    if let Err(error) = execute(grant).await {
      warn!("grant for {} failed, dropping the account", user.user_name);
      if let Err(rollback) = execute(drop_statement(user)).await {
        warn!("could not drop {}: {}", user.user_name, rollback);
      }
      return Err(error);
    }
  }
  Ok(())
}

fn map_error(error: sqlx::Error, user: &TestUser) -> UserRepositoryError {
  let number = error
    .as_database_error()
    .and_then(|e| e.try_downcast_ref::<MySqlDatabaseError>())
    .map(|e| e.number());
  classify(number, user).unwrap_or_else(|| UserRepositoryError::from(error))
}

/// Server error numbers that carry meaning for provisioning.
pub fn classify(
  number: Option<u16>,
  user: &TestUser,
) -> Option<UserRepositoryError> {
  match number? {
    CANNOT_USER => {
      Some(UserRepositoryError::AlreadyExists(user.user_name.clone()))
    }
    _ => None,
  }
}

pub fn drop_statement(user: &TestUser) -> String {
  format!("DROP USER IF EXISTS {}", account(user))
}

/// `CREATE USER` followed by the schema grant.
pub fn create_statements(user: &TestUser) -> Vec<String> {
  let grants = privileges(&user.roles, Role::mysql_privileges).join(", ");
  vec![
    format!(
      "CREATE USER {} IDENTIFIED BY {}",
      account(user),
      quote_literal(&user.password)
    ),
    format!(
      "GRANT {} ON {}.* TO {}",
      grants,
      quote_ident(&user.database),
      account(user)
    ),
  ]
}

fn account(user: &TestUser) -> String {
  format!(
    "{}@{}",
    quote_literal(&user.user_name),
    quote_literal(&user.host)
  )
}

pub fn quote_ident(ident: &str) -> String {
  format!("`{}`", ident.replace('`', "``"))
}

pub fn quote_literal(value: &str) -> String {
  format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}
