use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{MapError, Record, Row, SqlValue};

/// Movie record in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: Uuid,
    pub title: String, // unique across movies
    pub category: String,
    #[serde(with = "time::serde::rfc3339")]
    pub release_date: OffsetDateTime,
}

/// Fields an update may carry; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct MoviePatch {
    pub id: Uuid,
    pub title: Option<String>,
    pub category: Option<String>,
    pub release_date: Option<OffsetDateTime>,
}

impl Record for Movie {
    type Patch = MoviePatch;

    const TABLE: &'static str = "movies";
    const COLUMNS: &'static [&'static str] = &["id", "title", "category", "releasedate"];
    const UPDATE_COLUMNS: &'static [&'static str] = &["title", "category", "releasedate"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        let mut values = vec![SqlValue::Uuid(self.id)];
        values.extend(self.update_values());
        values
    }

    fn update_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.title.clone()),
            SqlValue::Text(self.category.clone()),
            SqlValue::Timestamp(self.release_date),
        ]
    }

    fn map_row(row: Option<&Row>) -> Result<Self, MapError> {
        super::mapper::map_movie(row)
    }

    fn patch_id(patch: &MoviePatch) -> Uuid {
        patch.id
    }

    fn apply(&mut self, patch: MoviePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(release_date) = patch.release_date {
            self.release_date = release_date;
        }
    }
}
