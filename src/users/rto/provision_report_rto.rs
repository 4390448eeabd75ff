use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::backend::Backend;
use crate::shared::model::user::TestUser;
use crate::users::Outcome;

/// One line of the report printed for every backend touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionReportRto {
  pub backend: Backend,
  pub user_name: String,
  pub database: String,
  pub outcome: Outcome,
  pub at: DateTime<Utc>,
}

impl ProvisionReportRto {
  pub fn new(backend: Backend, user: &TestUser, outcome: Outcome) -> Self {
    Self {
      backend,
      user_name: user.user_name.clone(),
      database: user.database.clone(),
      outcome,
      at: Utc::now(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionUriRto {
  pub backend: Backend,
  pub uri: String,
}
