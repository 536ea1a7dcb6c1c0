use super::repo_types::User;
use crate::db::{MapError, Row};

pub fn map_user(row: Option<&Row>) -> Result<User, MapError> {
    let row = row.ok_or(MapError::NullInput)?;
    Ok(User {
        id: row.uuid("id")?,
        name: row.text("name")?,
        email: row.text("email")?,
        password_hash: row.text("passwordhash")?,
        created_date: row.timestamp("createddate")?,
    })
}
