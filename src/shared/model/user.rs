use crate::shared::role::Role;

/// A fixture account a test suite logs in with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestUser {
  pub user_name: String,
  pub password: String,
  pub database: String,
  pub roles: Vec<Role>,
  /// MySQL account host, ignored elsewhere.
  pub host: String,
}

impl TestUser {
  /// Database the user is defined in. MongoDB authenticates against it.
  pub fn auth_database(&self) -> &str {
    &self.database
  }
}
