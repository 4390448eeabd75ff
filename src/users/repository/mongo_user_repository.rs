use log::debug;
use mongodb::bson::{doc, Document};
use mongodb::error::ErrorKind;
use mongodb::Client;

use super::user_repository::{UserRepository, UserRepositoryError};
use crate::database::MongoDatabase;
use crate::shared::model::user::TestUser;
use crate::shared::role::{privileges, Role};

const USER_NOT_FOUND: i32 = 11;
const USER_ALREADY_EXISTS: i32 = 51003;

pub struct MongoUserRepository {
  client: Client,
}

impl MongoUserRepository {
  pub fn new(database: &MongoDatabase) -> Self {
    Self {
      client: database.client.clone(),
    }
  }

  async fn run(
    &self,
    user: &TestUser,
    command: Document,
  ) -> Result<Document, mongodb::error::Error> {
    self
      .client
      .database(user.auth_database())
      .run_command(command)
      .await
  }
}

impl UserRepository for MongoUserRepository {
  async fn exists(&self, user: &TestUser) -> Result<bool, UserRepositoryError> {
    let reply = self.run(user, users_info_command(user)).await?;
    let users = reply.get_array("users").map_err(|error| {
      UserRepositoryError::Other(format!("malformed usersInfo reply: {}", error))
    })?;
    debug!("usersInfo for {} returned {} entries", user.user_name, users.len());
    Ok(!users.is_empty())
  }

  async fn create(&self, user: &TestUser) -> Result<(), UserRepositoryError> {
    self
      .run(user, create_user_command(user))
      .await
      .map(|_| ())
      .map_err(|error| map_error(error, user))
  }

  async fn remove(&self, user: &TestUser) -> Result<(), UserRepositoryError> {
    self
      .run(user, drop_user_command(user))
      .await
      .map(|_| ())
      .map_err(|error| map_error(error, user))
  }
}

fn map_error(
  error: mongodb::error::Error,
  user: &TestUser,
) -> UserRepositoryError {
  classify(command_code(&error), user)
    .unwrap_or_else(|| UserRepositoryError::from(error))
}

/// Server codes that carry meaning for provisioning.
pub fn classify(
  code: Option<i32>,
  user: &TestUser,
) -> Option<UserRepositoryError> {
  match code? {
    USER_ALREADY_EXISTS => {
      Some(UserRepositoryError::AlreadyExists(user.user_name.clone()))
    }
    USER_NOT_FOUND => {
      Some(UserRepositoryError::NotFound(user.user_name.clone()))
    }
    _ => None,
  }
}

fn command_code(error: &mongodb::error::Error) -> Option<i32> {
  match error.kind.as_ref() {
    ErrorKind::Command(command_error) => Some(command_error.code),
    _ => None,
  }
}

pub fn users_info_command(user: &TestUser) -> Document {
  doc! { "usersInfo": user.user_name.as_str() }
}

pub fn create_user_command(user: &TestUser) -> Document {
  let roles: Vec<Document> = privileges(&user.roles, Role::mongo_roles)
    .into_iter()
    .map(|role| doc! { "role": role, "db": user.database.as_str() })
    .collect();
  doc! {
    "createUser": user.user_name.as_str(),
    "pwd": user.password.as_str(),
    "roles": roles,
  }
}

pub fn drop_user_command(user: &TestUser) -> Document {
  doc! { "dropUser": user.user_name.as_str() }
}
