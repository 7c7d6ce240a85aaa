//! Relational-store broker backed by PostgreSQL.
//!
//! Events land as JSONB rows in a single table, one row per publish. The
//! table is created on construction when missing.
//!
//! Uses runtime queries (`sqlx::query`) rather than the compile-time macros,
//! so building the crate needs no DATABASE_URL.
//!
//! ## Configuration
//!
//! | Key               | Description             | Default  |
//! |-------------------|-------------------------|----------|
//! | `url`             | Postgres connection URL | required |
//! | `table`           | Target table name       | `events` |
//! | `max_connections` | Connection pool size    | `5`      |

use std::str::FromStr;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use eventrelay_core::{EndpointConfig, Event};

use crate::error::{BrokerError, Result};
use crate::traits::EventBroker;

fn default_table() -> String {
    "events".to_string()
}

fn default_max_connections() -> u32 {
    5
}

/// Parsed configuration for the SQL broker.
#[derive(Debug, Clone, Deserialize)]
pub struct SqlParams {
    /// Table events are inserted into.
    #[serde(default = "default_table")]
    pub table: String,

    /// Connection pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl SqlParams {
    /// Parse broker parameters from the endpoint's parameter bag.
    pub fn from_endpoint_config(config: &EndpointConfig) -> Result<Self> {
        let params: SqlParams = serde_json::from_value(Value::Object(config.params.clone()))
            .map_err(|e| BrokerError::ConfigError(format!("invalid sql parameters: {}", e)))?;

        if !is_sql_identifier(&params.table) {
            return Err(BrokerError::ConfigError(format!(
                "invalid table name '{}'",
                params.table
            )));
        }

        Ok(params)
    }
}

/// The table name is interpolated into DDL and DML, so it is restricted to
/// plain identifier characters.
fn is_sql_identifier(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Relational-store event broker.
pub struct SqlBroker {
    table: String,
    insert_sql: String,
    pool: PgPool,
}

impl SqlBroker {
    /// Connect to Postgres and ensure the target table exists.
    pub async fn from_endpoint_config(config: &EndpointConfig) -> Result<Self> {
        let params = SqlParams::from_endpoint_config(config)?;
        let url = config.url.as_deref().ok_or_else(|| {
            BrokerError::ConfigError("missing required 'url' for the sql broker".to_string())
        })?;

        let options = PgConnectOptions::from_str(url)
            .map_err(|e| BrokerError::ConfigError(format!("invalid database url: {}", e)))?;

        let pool = PgPoolOptions::new()
            .max_connections(params.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| BrokerError::ConnectionError(format!("database connect failed: {}", e)))?;

        let create_sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                 id BIGSERIAL PRIMARY KEY,
                 created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                 payload JSONB NOT NULL
             )",
            params.table
        );
        sqlx::query(&create_sql).execute(&pool).await.map_err(|e| {
            BrokerError::ConnectionError(format!("creating table '{}' failed: {}", params.table, e))
        })?;

        tracing::info!(table = %params.table, "sql event broker connected");

        Ok(Self {
            insert_sql: format!("INSERT INTO {} (payload) VALUES ($1)", params.table),
            table: params.table,
            pool,
        })
    }
}

#[async_trait]
impl EventBroker for SqlBroker {
    fn kind(&self) -> &str {
        "sql"
    }

    async fn publish(&mut self, event: &Event) -> Result<()> {
        sqlx::query(&self.insert_sql)
            .bind(Value::Object(event.clone()))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                BrokerError::PublishError(format!("insert into '{}' failed: {}", self.table, e))
            })?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // Parameter parsing
    // ---------------------------------------------------------------

    #[test]
    fn test_params_defaults() {
        let params = SqlParams::from_endpoint_config(&EndpointConfig::default()).unwrap();
        assert_eq!(params.table, "events");
        assert_eq!(params.max_connections, 5);
    }

    #[test]
    fn test_params_overrides() {
        let config = EndpointConfig::new("sql")
            .with_param("table", "conversation_events")
            .with_param("max_connections", 12);

        let params = SqlParams::from_endpoint_config(&config).unwrap();
        assert_eq!(params.table, "conversation_events");
        assert_eq!(params.max_connections, 12);
    }

    #[test]
    fn test_params_reject_injectable_table_name() {
        let config = EndpointConfig::new("sql").with_param("table", "events; DROP TABLE x");

        let err = SqlParams::from_endpoint_config(&config).unwrap_err();
        assert!(matches!(err, BrokerError::ConfigError(_)));
    }

    // ---------------------------------------------------------------
    // Identifier validation
    // ---------------------------------------------------------------

    #[test]
    fn test_identifier_accepts_plain_names() {
        assert!(is_sql_identifier("events"));
        assert!(is_sql_identifier("conversation_events"));
        assert!(is_sql_identifier("_staging"));
        assert!(is_sql_identifier("events2"));
    }

    #[test]
    fn test_identifier_rejects_everything_else() {
        assert!(!is_sql_identifier(""));
        assert!(!is_sql_identifier("2events"));
        assert!(!is_sql_identifier("events table"));
        assert!(!is_sql_identifier("events;"));
        assert!(!is_sql_identifier("events\"x\""));
    }

    // ---------------------------------------------------------------
    // Construction errors
    // ---------------------------------------------------------------

    #[tokio::test]
    async fn test_missing_url_is_config_error() {
        let config = EndpointConfig::new("sql");

        let err = SqlBroker::from_endpoint_config(&config).await.unwrap_err();
        match err {
            BrokerError::ConfigError(msg) => assert!(msg.contains("url")),
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_url_is_config_error() {
        let config = EndpointConfig::new("sql").with_url("this is not a database url");

        let err = SqlBroker::from_endpoint_config(&config).await.unwrap_err();
        assert!(matches!(err, BrokerError::ConfigError(_)));
    }
}
