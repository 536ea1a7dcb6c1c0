use time::OffsetDateTime;
use uuid::Uuid;

/// A single column value, as decoded from (or bound to) the store.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Uuid(Uuid),
    Timestamp(OffsetDateTime),
}

impl SqlValue {
    fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::Int(_) => "int",
            SqlValue::Text(_) => "text",
            SqlValue::Uuid(_) => "uuid",
            SqlValue::Timestamp(_) => "timestamp",
        }
    }
}

/// Failure to turn a [`Row`] into an entity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("no row was given to the mapper")]
    NullInput,
    #[error("row is missing column `{0}`")]
    MissingField(&'static str),
    #[error("column `{column}` holds {found}, expected {expected}")]
    UnexpectedType {
        column: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

/// One result row: column names and values in result-set order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, SqlValue)>,
}

impl Row {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, column: impl Into<String>, value: SqlValue) {
        self.fields.push((column.into(), value));
    }

    /// Looks a column up by name; position is irrelevant.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    fn require(&self, column: &'static str) -> Result<&SqlValue, MapError> {
        self.get(column).ok_or(MapError::MissingField(column))
    }

    pub fn uuid(&self, column: &'static str) -> Result<Uuid, MapError> {
        match self.require(column)? {
            SqlValue::Uuid(v) => Ok(*v),
            other => Err(unexpected(column, "uuid", other)),
        }
    }

    pub fn text(&self, column: &'static str) -> Result<String, MapError> {
        match self.require(column)? {
            SqlValue::Text(v) => Ok(v.clone()),
            other => Err(unexpected(column, "text", other)),
        }
    }

    pub fn timestamp(&self, column: &'static str) -> Result<OffsetDateTime, MapError> {
        match self.require(column)? {
            SqlValue::Timestamp(v) => Ok(*v),
            other => Err(unexpected(column, "timestamp", other)),
        }
    }
}

impl<S: Into<String>> FromIterator<(S, SqlValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (S, SqlValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

fn unexpected(column: &'static str, expected: &'static str, found: &SqlValue) -> MapError {
    MapError::UnexpectedType {
        column,
        expected,
        found: found.kind(),
    }
}
