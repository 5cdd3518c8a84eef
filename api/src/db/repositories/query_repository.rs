// Read-only SQL pass-through implementation
// Runs parameterised queries over the read-only database role backing
// downstream consumers.

use sea_orm::{DatabaseConnection, DbBackend, FromQueryResult, JsonValue, Statement};
use serde_json::Value;

use crate::db::DbError;

/// Repository executing parameterised read-only queries
#[derive(Clone)]
pub struct QueryRepository {
    conn: DatabaseConnection,
}

impl QueryRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Execute a parameterised query and return its rows as JSON objects.
    /// Positional `$n` placeholders are bound from `replacements` in order.
    pub async fn select(
        &self,
        query: &str,
        replacements: Vec<Value>,
    ) -> Result<Vec<JsonValue>, DbError> {
        let values = replacements
            .into_iter()
            .map(to_query_value)
            .collect::<Result<Vec<_>, _>>()?;

        let statement = Statement::from_sql_and_values(DbBackend::Postgres, query, values);

        JsonValue::find_by_statement(statement)
            .all(&self.conn)
            .await
            .map_err(Into::into)
    }
}

/// Map a JSON replacement value onto a bindable query value
fn to_query_value(value: Value) -> Result<sea_orm::Value, DbError> {
    match value {
        Value::Null => Ok(sea_orm::Value::String(None)),
        Value::Bool(b) => Ok(b.into()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i.into())
            } else if let Some(f) = n.as_f64() {
                Ok(f.into())
            } else {
                Err(DbError::InvalidParameter(n.to_string()))
            }
        }
        Value::String(s) => Ok(s.into()),
        other => Err(DbError::InvalidParameter(format!(
            "arrays and objects cannot be bound: {}",
            other
        ))),
    }
}
