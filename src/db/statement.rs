use super::row::SqlValue;

/// SQL text with `$n` placeholders and the values bound to them, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, value: SqlValue) -> Self {
        self.params.push(value);
        self
    }

    pub fn bind_all(mut self, values: impl IntoIterator<Item = SqlValue>) -> Self {
        self.params.extend(values);
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }
}

/// `$1, $2, ..` for `count` parameters starting after `offset`.
pub(crate) fn placeholders(offset: usize, count: usize) -> Vec<String> {
    (offset + 1..=offset + count).map(|n| format!("${n}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_in_order() {
        let stmt = Statement::new("SELECT 1 WHERE a = $1 AND b = $2")
            .bind(SqlValue::Int(1))
            .bind_all([SqlValue::Bool(true)]);
        assert_eq!(stmt.params(), &[SqlValue::Int(1), SqlValue::Bool(true)]);
        assert!(stmt.sql().starts_with("SELECT 1"));
    }

    #[test]
    fn placeholders_continue_from_offset() {
        assert_eq!(placeholders(0, 3), vec!["$1", "$2", "$3"]);
        assert_eq!(placeholders(3, 1), vec!["$4"]);
        assert!(placeholders(2, 0).is_empty());
    }
}
