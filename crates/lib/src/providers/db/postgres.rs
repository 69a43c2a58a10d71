//! # PostgreSQL Storage Provider
//!
//! Each query gets its own connection and runs inside a `READ ONLY`
//! transaction that is always rolled back. The connection is closed explicitly
//! once the query finishes, whatever the outcome.

use crate::{errors::PromptError, providers::db::storage::Storage, types::Row};
use async_trait::async_trait;
use serde_json::{Number, Value};
use sqlx::{
    postgres::{PgConnection, PgRow},
    types::BigDecimal,
    Column, Connection, Row as _, TypeInfo, ValueRef,
};
use std::fmt::{self, Debug};
use tracing::{debug, warn};

/// A provider for a PostgreSQL database reached through a connection URL.
#[derive(Clone)]
pub struct PostgresProvider {
    url: String,
}

impl PostgresProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Debug for PostgresProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresProvider").finish_non_exhaustive()
    }
}

fn map_sqlx_error(err: sqlx::Error) -> PromptError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => PromptError::StorageConnection(err.to_string()),
        other => PromptError::StorageQueryFailed(other.to_string()),
    }
}

fn float_to_json(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

/// Decodes one non-null column by its Postgres type name.
fn decode_column(row: &PgRow, index: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    let value = match type_name {
        "BOOL" => Value::Bool(row.try_get::<bool, _>(index)?),
        "INT2" => Value::from(row.try_get::<i16, _>(index)?),
        "INT4" => Value::from(row.try_get::<i32, _>(index)?),
        "INT8" => Value::from(row.try_get::<i64, _>(index)?),
        "FLOAT4" => float_to_json(f64::from(row.try_get::<f32, _>(index)?)),
        "FLOAT8" => float_to_json(row.try_get::<f64, _>(index)?),
        "NUMERIC" => {
            let decimal: BigDecimal = row.try_get(index)?;
            let text = decimal.to_string();
            text.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::String(text))
        }
        "DATE" => Value::String(row.try_get::<chrono::NaiveDate, _>(index)?.to_string()),
        "TIMESTAMP" => Value::String(row.try_get::<chrono::NaiveDateTime, _>(index)?.to_string()),
        "TIMESTAMPTZ" => Value::String(
            row.try_get::<chrono::DateTime<chrono::Utc>, _>(index)?
                .to_rfc3339(),
        ),
        "JSON" | "JSONB" => row.try_get::<Value, _>(index)?,
        _ => row
            .try_get::<String, _>(index)
            .map(Value::String)
            .unwrap_or_else(|_| Value::String(format!("<{}>", type_name.to_lowercase()))),
    };
    Ok(value)
}

fn pg_row_to_json(row: &PgRow) -> Result<Row, PromptError> {
    let mut row_map = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        let is_null = row.try_get_raw(index).map_err(map_sqlx_error)?.is_null();
        let value = if is_null {
            Value::Null
        } else {
            decode_column(row, index, column.type_info().name()).map_err(map_sqlx_error)?
        };
        row_map.insert(column.name().to_string(), value);
    }
    Ok(row_map)
}

async fn fetch_read_only(conn: &mut PgConnection, sql: &str) -> Result<Vec<Row>, PromptError> {
    let mut tx = conn.begin().await.map_err(map_sqlx_error)?;
    sqlx::query("SET TRANSACTION READ ONLY")
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

    let rows = sqlx::query(sql)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
    tx.rollback().await.map_err(map_sqlx_error)?;

    rows.iter().map(pg_row_to_json).collect()
}

#[async_trait]
impl Storage for PostgresProvider {
    fn name(&self) -> &str {
        "PostgreSQL"
    }

    async fn fetch_rows(&self, sql: &str) -> Result<Vec<Row>, PromptError> {
        debug!(sql = %sql, "--> Executing PostgreSQL query");

        let mut conn = PgConnection::connect(&self.url)
            .await
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;

        let result = fetch_read_only(&mut conn, sql).await;

        if let Err(e) = conn.close().await {
            warn!("Failed to close PostgreSQL connection cleanly: {e}");
        }

        result
    }
}
