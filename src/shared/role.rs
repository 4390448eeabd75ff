use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Role {
  #[serde(rename = "dbAdmin")]
  DbAdmin,
  #[serde(rename = "readWrite")]
  ReadWrite,
  #[serde(rename = "read")]
  Read,
  #[serde(rename = "all")]
  All,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::DbAdmin => "dbAdmin",
      Role::ReadWrite => "readWrite",
      Role::Read => "read",
      Role::All => "all",
    }
  }

  /// Built-in MongoDB roles granted on the user's database.
  pub fn mongo_roles(&self) -> &'static [&'static str] {
    match self {
      Role::DbAdmin => &["dbAdmin"],
      Role::ReadWrite => &["readWrite"],
      Role::Read => &["read"],
      Role::All => &["dbOwner"],
    }
  }

  /// Database level privileges, `GRANT ... ON DATABASE`.
  pub fn postgres_privileges(&self) -> &'static [&'static str] {
    match self {
      Role::DbAdmin => &["CREATE"],
      Role::ReadWrite => &["CONNECT", "TEMPORARY"],
      Role::Read => &["CONNECT"],
      Role::All => &["ALL PRIVILEGES"],
    }
  }

  /// Schema level privileges, `GRANT ... ON db.*`.
  pub fn mysql_privileges(&self) -> &'static [&'static str] {
    match self {
      Role::DbAdmin => &["CREATE", "DROP", "ALTER", "INDEX"],
      Role::ReadWrite => &["SELECT", "INSERT", "UPDATE", "DELETE"],
      Role::Read => &["SELECT"],
      Role::All => &["ALL PRIVILEGES"],
    }
  }
}

/// Flattens the privileges of `roles` in first-seen order without
/// duplicates. `All` swallows every other role.
pub fn privileges(
  roles: &[Role],
  map: fn(&Role) -> &'static [&'static str],
) -> Vec<&'static str> {
  if roles.contains(&Role::All) {
    return map(&Role::All).to_vec();
  }
  let mut privileges: Vec<&'static str> = Vec::new();
  for privilege in roles.iter().flat_map(map) {
    if !privileges.contains(privilege) {
      privileges.push(*privilege);
    }
  }
  privileges
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = String;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value.to_ascii_lowercase().as_str() {
      "dbadmin" => Ok(Role::DbAdmin),
      "readwrite" => Ok(Role::ReadWrite),
      "read" => Ok(Role::Read),
      "all" => Ok(Role::All),
      other => Err(format!(
        "unknown role '{}', expected one of dbAdmin, readWrite, read, all",
        other
      )),
    }
  }
}
