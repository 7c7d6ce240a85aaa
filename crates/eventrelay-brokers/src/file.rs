//! Flat-file broker: appends events to a JSON-lines log.
//!
//! ## Configuration
//!
//! | Key    | Description                             | Default        |
//! |--------|-----------------------------------------|----------------|
//! | `path` | Log file, created if missing, appended  | `events.jsonl` |

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use eventrelay_core::{EndpointConfig, Event};

use crate::error::{BrokerError, Result};
use crate::traits::EventBroker;

fn default_path() -> String {
    "events.jsonl".to_string()
}

/// Parsed configuration for the file broker.
#[derive(Debug, Clone, Deserialize)]
pub struct FileParams {
    /// File events are appended to, one JSON object per line.
    #[serde(default = "default_path")]
    pub path: String,
}

impl FileParams {
    /// Parse broker parameters from the endpoint's parameter bag.
    pub fn from_endpoint_config(config: &EndpointConfig) -> Result<Self> {
        serde_json::from_value(Value::Object(config.params.clone()))
            .map_err(|e| BrokerError::ConfigError(format!("invalid file parameters: {}", e)))
    }
}

/// Flat-file event broker.
pub struct FileBroker {
    path: String,
    file: File,
}

impl FileBroker {
    /// Open (create if missing) the log file for appending.
    pub async fn from_endpoint_config(config: &EndpointConfig) -> Result<Self> {
        let params = FileParams::from_endpoint_config(config)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&params.path)
            .await
            .map_err(|e| {
                BrokerError::ConnectionError(format!(
                    "opening event log '{}' failed: {}",
                    params.path, e
                ))
            })?;

        tracing::info!(path = %params.path, "file event broker opened");

        Ok(Self {
            path: params.path,
            file,
        })
    }

    /// Path of the log file this broker appends to.
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl EventBroker for FileBroker {
    fn kind(&self) -> &str {
        "file"
    }

    async fn publish(&mut self, event: &Event) -> Result<()> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        self.file.write_all(&line).await?;
        self.file.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.file.flush().await?;
        Ok(())
    }
}
