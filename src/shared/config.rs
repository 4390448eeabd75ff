use std::env;

use serde::{Deserialize, Serialize};

use crate::shared::backend::Backend;

/// Administrative connection strings, one per backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
  pub mongodb_uri: String,
  pub postgres_url: String,
  pub mysql_url: String,
}

impl Config {
  pub fn admin_uri(&self, backend: Backend) -> &str {
    match backend {
      Backend::Mongodb => &self.mongodb_uri,
      Backend::Postgresql => &self.postgres_url,
      Backend::Mysql => &self.mysql_url,
    }
  }

  pub fn with_admin_uri(mut self, backend: Backend, uri: String) -> Self {
    match backend {
      Backend::Mongodb => self.mongodb_uri = uri,
      Backend::Postgresql => self.postgres_url = uri,
      Backend::Mysql => self.mysql_url = uri,
    }
    self
  }
}

impl Default for Config {
  fn default() -> Self {
    let mongodb_uri = env::var("TESTDB_MONGODB_URI")
      .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let postgres_url = env::var("TESTDB_POSTGRES_URL")
      .unwrap_or_else(|_| "postgres://postgres@localhost/postgres".to_string());
    let mysql_url = env::var("TESTDB_MYSQL_URL")
      .unwrap_or_else(|_| "mysql://root@localhost:3306/mysql".to_string());
    Self {
      mongodb_uri,
      postgres_url,
      mysql_url,
    }
  }
}
