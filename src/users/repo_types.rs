use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Option<i64>,       // assigned by the store on first flush
    pub name: Option<String>,
    pub email: Option<String>,
}

impl User {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite only the supplied fields. `""` and `"0"` count as absent.
    pub fn apply(&mut self, name: Option<String>, email: Option<String>) {
        if let Some(name) = name.filter(|v| is_supplied(v)) {
            self.name = Some(name);
        }
        if let Some(email) = email.filter(|v| is_supplied(v)) {
            self.email = Some(email);
        }
    }
}

fn is_supplied(v: &str) -> bool {
    !v.is_empty() && v != "0"
}
