mod database;
mod shared;
mod users;

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use database::{MongoDatabase, MySqlDatabase, PostgresDatabase};
use env_logger::Env;
use futures::future::join_all;
use log::{error, info};
use shared::backend::Backend;
use shared::config::Config;
use shared::model::user::TestUser;
use shared::role::Role;
use users::dto::provision_user_dto::ProvisionUserDTO;
use users::repository::mongo_user_repository::MongoUserRepository;
use users::repository::mysql_user_repository::MySqlUserRepository;
use users::repository::postgres_user_repository::PostgresUserRepository;
use users::repository::user_repository::UserRepositoryError;
use users::rto::provision_report_rto::{ConnectionUriRto, ProvisionReportRto};
use users::{connection_uri, execute, Action, Outcome};

const EXIT_ABSENT: u8 = 1;
const EXIT_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "testdb-provision")]
#[command(
  about = "Creates the database users an integration test suite logs in with",
  long_about = None
)]
struct Cli {
  #[command(subcommand)]
  command: Command,

  #[command(flatten)]
  user: UserArgs,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
  /// Create the user and its grants unless it already exists
  Ensure,
  /// Drop the user if it exists
  Remove,
  /// Report whether the user exists, exit code 1 when it does not
  Check,
  /// Print the connection URI the test suite should use
  Uri,
}

#[derive(Args, Debug)]
struct UserArgs {
  /// Backend to provision, repeatable. Defaults to mongodb
  #[arg(short, long = "backend", value_enum, global = true)]
  backends: Vec<Backend>,

  /// Provision every backend
  #[arg(long, global = true, conflicts_with = "backends")]
  all: bool,

  #[arg(short, long, global = true)]
  user: Option<String>,

  #[arg(short, long, global = true)]
  password: Option<String>,

  #[arg(short, long, global = true)]
  database: Option<String>,

  /// Role to grant on the database, repeatable
  #[arg(short, long = "role", global = true)]
  roles: Vec<Role>,

  /// MySQL account host
  #[arg(long, global = true)]
  host: Option<String>,

  /// Administrative connection URI, only with a single backend
  #[arg(long, global = true)]
  admin_uri: Option<String>,
}

impl UserArgs {
  fn selected_backends(&self) -> Vec<Backend> {
    if self.all {
      return Backend::all().to_vec();
    }
    if self.backends.is_empty() {
      return vec![Backend::Mongodb];
    }
    let mut backends: Vec<Backend> = Vec::new();
    for backend in &self.backends {
      if !backends.contains(backend) {
        backends.push(*backend);
      }
    }
    backends
  }

  /// Flags layered over the backend's fixture account.
  fn overlay(&self, fixture: TestUser) -> ProvisionUserDTO {
    let mut dto = ProvisionUserDTO::from(fixture);
    if let Some(user) = &self.user {
      dto.user_name = user.clone();
    }
    if let Some(password) = &self.password {
      dto.password = password.clone();
    }
    if let Some(database) = &self.database {
      dto.database = database.clone();
    }
    if !self.roles.is_empty() {
      dto.roles = self.roles.clone();
    }
    if let Some(host) = &self.host {
      dto.host = host.clone();
    }
    dto
  }

  fn config(
    &self,
    backends: &[Backend],
  ) -> Result<Config, UserRepositoryError> {
    let config = Config::default();
    match (&self.admin_uri, backends) {
      (None, _) => Ok(config),
      (Some(uri), [backend]) => {
        Ok(config.with_admin_uri(*backend, uri.clone()))
      }
      (Some(_), _) => Err(UserRepositoryError::Other(
        "--admin-uri needs exactly one backend".to_string(),
      )),
    }
  }

  fn test_users(
    &self,
    backends: &[Backend],
  ) -> Result<Vec<(Backend, TestUser)>, UserRepositoryError> {
    backends
      .iter()
      .map(|backend| -> Result<(Backend, TestUser), UserRepositoryError> {
        let dto = self.overlay(backend.fixture());
        dto.validate_for(*backend)?;
        Ok((*backend, TestUser::from(dto)))
      })
      .collect()
  }
}

#[tokio::main]
async fn main() -> ExitCode {
  dotenvy::dotenv().ok();
  env_logger::Builder::from_env(Env::default().default_filter_or("info"))
    .init();

  let cli = Cli::parse();
  match run(cli).await {
    Ok(code) => code,
    Err(error) => {
      error!("{}", error);
      ExitCode::from(EXIT_ERROR)
    }
  }
}

async fn run(cli: Cli) -> Result<ExitCode, UserRepositoryError> {
  let backends = cli.user.selected_backends();
  let config = cli.user.config(&backends)?;
  let test_users = cli.user.test_users(&backends)?;

  let action = match cli.command {
    Command::Uri => {
      for (backend, user) in &test_users {
        let rto = ConnectionUriRto {
          backend: *backend,
          uri: connection_uri(config.admin_uri(*backend), user)?,
        };
        println!("{}", serde_json::to_string(&rto)?);
      }
      return Ok(ExitCode::SUCCESS);
    }
    Command::Ensure => Action::Ensure,
    Command::Remove => Action::Remove,
    Command::Check => Action::Check,
  };

  let results = join_all(
    test_users
      .iter()
      .map(|(backend, user)| run_backend(&config, *backend, action, user)),
  )
  .await;

  let mut failed = false;
  let mut absent = false;
  for ((backend, user), result) in test_users.iter().zip(results) {
    match result {
      Ok(outcome) => {
        absent |= outcome == Outcome::Absent;
        let report = ProvisionReportRto::new(*backend, user, outcome);
        println!("{}", serde_json::to_string(&report)?);
      }
      Err(error) => {
        failed = true;
        error!("{}: {}", backend, error);
      }
    }
  }

  if failed {
    return Ok(ExitCode::from(EXIT_ERROR));
  }
  if absent && action == Action::Check {
    return Ok(ExitCode::from(EXIT_ABSENT));
  }
  Ok(ExitCode::SUCCESS)
}

async fn run_backend(
  config: &Config,
  backend: Backend,
  action: Action,
  user: &TestUser,
) -> Result<Outcome, UserRepositoryError> {
  let admin_uri = config.admin_uri(backend);
  info!("{}: {:?} user {}", backend, action, user.user_name);
  match backend {
    Backend::Mongodb => {
      let database = MongoDatabase::connect(admin_uri).await?;
      let outcome =
        execute(&MongoUserRepository::new(&database), action, user).await;
      database.close().await;
      outcome
    }
    Backend::Postgresql => {
      let database = PostgresDatabase::connect(admin_uri).await?;
      let outcome =
        execute(&PostgresUserRepository::new(&database), action, user).await;
      database.close().await;
      outcome
    }
    Backend::Mysql => {
      let database = MySqlDatabase::connect(admin_uri).await?;
      let outcome =
        execute(&MySqlUserRepository::new(&database), action, user).await;
      database.close().await;
      outcome
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(
      std::iter::once("testdb-provision").chain(args.iter().copied()),
    )
    .expect("arguments should parse")
  }

  #[test]
  fn test_defaults_to_mongodb_fixture() {
    let cli = parse(&["ensure"]);
    assert_eq!(cli.command, Command::Ensure);

    let backends = cli.user.selected_backends();
    assert_eq!(backends, vec![Backend::Mongodb]);

    let users = cli.user.test_users(&backends).unwrap();
    assert_eq!(users[0].1, Backend::Mongodb.fixture());
  }

  #[test]
  fn test_flags_override_fixture() {
    let cli = parse(&[
      "ensure",
      "--backend",
      "mysql",
      "--user",
      "ci",
      "--role",
      "read",
      "--role",
      "dbAdmin",
      "--host",
      "%",
    ]);
    let users = cli.user.test_users(&cli.user.selected_backends()).unwrap();
    let (backend, user) = &users[0];

    assert_eq!(*backend, Backend::Mysql);
    assert_eq!(user.user_name, "ci");
    assert_eq!(user.password, "123456");
    assert_eq!(user.roles, vec![Role::Read, Role::DbAdmin]);
    assert_eq!(user.host, "%");
  }

  #[test]
  fn test_all_and_repeated_backends() {
    let cli = parse(&["check", "--all"]);
    assert_eq!(cli.user.selected_backends(), Backend::all().to_vec());

    let cli = parse(&["check", "-b", "mysql", "-b", "mysql", "-b", "mongodb"]);
    assert_eq!(
      cli.user.selected_backends(),
      vec![Backend::Mysql, Backend::Mongodb]
    );
  }

  #[test]
  fn test_invalid_user_fails_before_connecting() {
    let cli = parse(&["ensure", "--password", "short"]);
    let result = cli.user.test_users(&cli.user.selected_backends());
    assert!(matches!(result, Err(UserRepositoryError::ValidationError(_))));
  }

  #[test]
  fn test_long_user_name_rejected_for_mysql_only() {
    let long_name = "u".repeat(40);
    let cli = parse(&["ensure", "-b", "postgresql", "--user", &long_name]);
    assert!(cli.user.test_users(&cli.user.selected_backends()).is_ok());

    let cli = parse(&["ensure", "-b", "mysql", "--user", &long_name]);
    let result = cli.user.test_users(&cli.user.selected_backends());
    assert!(matches!(result, Err(UserRepositoryError::ValidationError(_))));
  }

  #[test]
  fn test_admin_uri_requires_single_backend() {
    let cli = parse(&["uri", "--all", "--admin-uri", "mongodb://elsewhere"]);
    assert!(cli.user.config(&cli.user.selected_backends()).is_err());

    let cli = parse(&["uri", "--admin-uri", "mongodb://elsewhere:27017"]);
    let config = cli.user.config(&cli.user.selected_backends()).unwrap();
    assert_eq!(
      config.admin_uri(Backend::Mongodb),
      "mongodb://elsewhere:27017"
    );
  }

  #[test]
  fn test_unknown_role_is_rejected() {
    let result =
      Cli::try_parse_from(["testdb-provision", "ensure", "--role", "root"]);
    assert!(result.is_err());
  }
}
