use std::sync::Arc;

use mongodb::Client;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::{MySql, Pool, Postgres};

use crate::users::repository::user_repository::UserRepositoryError;

// Provisioning runs a handful of statements, one connection is enough.
const MAX_CONNECTIONS: u32 = 1;

pub struct PostgresDatabase {
  pub pool: Arc<Pool<Postgres>>,
}

impl PostgresDatabase {
  pub async fn connect(url: &str) -> Result<Self, UserRepositoryError> {
    let pool = PgPoolOptions::new()
      .max_connections(MAX_CONNECTIONS)
      .connect(url)
      .await?;
    Ok(Self {
      pool: Arc::new(pool),
    })
  }

  pub async fn close(&self) {
    self.pool.close().await;
  }
}

pub struct MySqlDatabase {
  pub pool: Arc<Pool<MySql>>,
}

impl MySqlDatabase {
  pub async fn connect(url: &str) -> Result<Self, UserRepositoryError> {
    let pool = MySqlPoolOptions::new()
      .max_connections(MAX_CONNECTIONS)
      .connect(url)
      .await?;
    Ok(Self {
      pool: Arc::new(pool),
    })
  }

  pub async fn close(&self) {
    self.pool.close().await;
  }
}

pub struct MongoDatabase {
  pub client: Client,
}

impl MongoDatabase {
  pub async fn connect(uri: &str) -> Result<Self, UserRepositoryError> {
    let client = Client::with_uri_str(uri).await?;
    Ok(Self { client })
  }

  pub async fn close(self) {
    self.client.shutdown().await;
  }
}
