use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::shared::{model::user::TestUser, role::Role};

#[derive(
  Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  Mongodb,
  Postgresql,
  Mysql,
}

impl Backend {
  pub fn all() -> [Backend; 3] {
    [Backend::Mongodb, Backend::Postgresql, Backend::Mysql]
  }

  /// The account the pwman test suite expects on this backend.
  pub fn fixture(&self) -> TestUser {
    match self {
      Backend::Mongodb => TestUser {
        user_name: "tester".to_string(),
        password: "12345678".to_string(),
        database: "pwmantest".to_string(),
        roles: vec![Role::DbAdmin, Role::ReadWrite],
        host: "localhost".to_string(),
      },
      Backend::Postgresql => TestUser {
        user_name: "tester".to_string(),
        password: "123456".to_string(),
        database: "pwman".to_string(),
        roles: vec![Role::All],
        host: "localhost".to_string(),
      },
      Backend::Mysql => TestUser {
        user_name: "pwman".to_string(),
        password: "123456".to_string(),
        database: "pwmantest".to_string(),
        roles: vec![Role::All],
        host: "localhost".to_string(),
      },
    }
  }
}

impl fmt::Display for Backend {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Backend::Mongodb => "mongodb",
      Backend::Postgresql => "postgresql",
      Backend::Mysql => "mysql",
    };
    f.write_str(name)
  }
}
