use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{repo_types::User, services::UserChanges};
use crate::outcome::ValidationOutcome;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl CreateUserRequest {
    pub fn normalize(&mut self) {
        self.email = normalize_email(&self.email);
    }

    pub fn validate(&self) -> ValidationOutcome {
        let mut v = ValidationOutcome::default();
        if self.name.trim().is_empty() {
            v.push("Name is required");
        }
        if !is_valid_email(&self.email) {
            v.push("Invalid email");
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            v.push("Password too short");
        }
        v
    }

    /// Splits into the user to store and the plain password to hash.
    pub fn into_parts(self) -> (User, String) {
        (User::new(self.name, self.email), self.password)
    }
}

/// Request body for `PUT /users`. Omitted fields are left as stored.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn normalize(&mut self) {
        if let Some(email) = self.email.as_deref() {
            self.email = Some(normalize_email(email));
        }
    }

    /// Checks only the fields that are present.
    pub fn validate(&self) -> ValidationOutcome {
        let mut v = ValidationOutcome::default();
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            v.push("Name is required");
        }
        if self.email.as_deref().is_some_and(|e| !is_valid_email(e)) {
            v.push("Invalid email");
        }
        if self
            .password
            .as_deref()
            .is_some_and(|p| p.len() < MIN_PASSWORD_LEN)
        {
            v.push("Password too short");
        }
        v
    }

    pub fn into_changes(self) -> UserChanges {
        UserChanges {
            id: self.user_id,
            name: self.name,
            email: self.email,
            password: self.password,
        }
    }

    /// The registration a PUT for an unknown id falls back to.
    pub fn into_create(self) -> Option<CreateUserRequest> {
        Some(CreateUserRequest {
            name: self.name?,
            email: self.email?,
            password: self.password?,
        })
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}
