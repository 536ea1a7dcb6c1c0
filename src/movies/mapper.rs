use super::repo_types::Movie;
use crate::db::{MapError, Row};

pub fn map_movie(row: Option<&Row>) -> Result<Movie, MapError> {
    let row = row.ok_or(MapError::NullInput)?;
    Ok(Movie {
        id: row.uuid("id")?,
        title: row.text("title")?,
        category: row.text("category")?,
        release_date: row.timestamp("releasedate")?,
    })
}
