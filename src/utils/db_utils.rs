use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    Bool(bool),
    DateTime(DateTime<Utc>),
    Null,
}

impl From<Option<String>> for SqlValue {
    fn from(value: Option<String>) -> Self {
        value.map(SqlValue::String).unwrap_or(SqlValue::Null)
    }
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build a guarded UPDATE
/// ===============================
/// `guard` is a trusted SQL predicate appended to the WHERE clause, so the
/// update only lands while the row still satisfies it.
pub fn build_update_sql(
    table: &str,
    assignments: Vec<(&str, SqlValue)>,
    id_column: &str,
    id_value: &str,
    guard: Option<&str>,
) -> Option<SqlUpdate> {
    if assignments.is_empty() {
        return None;
    }

    let set_clause = assignments
        .iter()
        .map(|(column, _)| format!("{} = ?", column))
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);
    if let Some(guard) = guard {
        sql.push_str(" AND ");
        sql.push_str(guard);
    }

    let mut values: Vec<SqlValue> = assignments.into_iter().map(|(_, v)| v).collect();
    values.push(SqlValue::String(id_value.to_string()));

    Some(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_guarded_update() {
        let update = build_update_sql(
            "leave_requests",
            vec![
                ("status", SqlValue::String("rejected".into())),
                ("remarks", SqlValue::from(None::<String>)),
            ],
            "id",
            "abc",
            Some("status = 'pending'"),
        )
        .unwrap();

        assert_eq!(
            update.sql,
            "UPDATE leave_requests SET status = ?, remarks = ? WHERE id = ? AND status = 'pending'"
        );
        assert_eq!(update.values.len(), 3);
        assert_eq!(update.values[1], SqlValue::Null);
        assert_eq!(update.values[2], SqlValue::String("abc".into()));
    }

    #[test]
    fn empty_assignments_build_nothing() {
        assert!(build_update_sql("leave_requests", vec![], "id", "abc", None).is_none());
    }
}
