use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{MapError, Record, Row, SqlValue};

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String, // unique across users
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, not exposed in JSON
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime, // stamped by the repository on insert
}

impl User {
    /// A not-yet-persisted user with a fresh id; the hash and creation date
    /// are filled in by the service and repository.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            password_hash: String::new(),
            created_date: OffsetDateTime::UNIX_EPOCH,
        }
    }
}

/// Fields an update may carry; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl Record for User {
    type Patch = UserPatch;

    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["id", "name", "email", "passwordhash", "createddate"];
    const UPDATE_COLUMNS: &'static [&'static str] = &["name", "email", "passwordhash"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        let mut values = vec![SqlValue::Uuid(self.id)];
        values.extend(self.update_values());
        values.push(SqlValue::Timestamp(self.created_date));
        values
    }

    fn update_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.name.clone()),
            SqlValue::Text(self.email.clone()),
            SqlValue::Text(self.password_hash.clone()),
        ]
    }

    fn map_row(row: Option<&Row>) -> Result<Self, MapError> {
        super::mapper::map_user(row)
    }

    fn patch_id(patch: &UserPatch) -> Uuid {
        patch.id
    }

    fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(password_hash) = patch.password_hash {
            self.password_hash = password_hash;
        }
    }

    fn stamp_created(&mut self, now: OffsetDateTime) {
        self.created_date = now;
    }
}
