use lazy_static::lazy_static;
use regex::Regex;
use validator::{Validate as _, ValidationError, ValidationErrors};
use validator_derive::Validate;

use crate::shared::backend::Backend;
use crate::shared::model::user::TestUser;
use crate::shared::role::Role;

/// MySQL stores account names in a 32 character column.
pub const MYSQL_USER_NAME_MAX: usize = 32;

lazy_static! {
  static ref USER_NAME: Regex =
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]*$").unwrap();
  static ref DATABASE_NAME: Regex =
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_-]*$").unwrap();
}

#[derive(Debug, Clone, Validate)]
pub struct ProvisionUserDTO {
  #[validate(length(min = 1, max = 63), regex(path = *USER_NAME))]
  pub user_name: String,
  #[validate(length(min = 6))]
  pub password: String,
  #[validate(length(min = 1, max = 63), regex(path = *DATABASE_NAME))]
  pub database: String,
  #[validate(length(min = 1))]
  pub roles: Vec<Role>,
  #[validate(length(min = 1, max = 255))]
  pub host: String,
}

impl ProvisionUserDTO {
  /// Field rules plus the limits of the backend the user is meant for.
  pub fn validate_for(
    &self,
    backend: Backend,
  ) -> Result<(), ValidationErrors> {
    self.validate()?;
    if backend == Backend::Mysql
      && self.user_name.chars().count() > MYSQL_USER_NAME_MAX
    {
      let mut errors = ValidationErrors::new();
      errors.add(
        "user_name",
        ValidationError::new("length").with_message(
          "MySQL account names are limited to 32 characters".into(),
        ),
      );
      return Err(errors);
    }
    Ok(())
  }
}

impl From<TestUser> for ProvisionUserDTO {
  fn from(user: TestUser) -> Self {
    Self {
      user_name: user.user_name,
      password: user.password,
      database: user.database,
      roles: user.roles,
      host: user.host,
    }
  }
}

impl From<ProvisionUserDTO> for TestUser {
  fn from(dto: ProvisionUserDTO) -> Self {
    Self {
      user_name: dto.user_name,
      password: dto.password,
      database: dto.database,
      roles: dto.roles,
      host: dto.host,
    }
  }
}
