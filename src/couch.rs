use log::{debug, error, warn};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::config::Config;

#[derive(Debug, Serialize)]
struct AuditEntry<'a> {
    message: &'a Value,
    date: String,
}

/// Best-effort copy of every inbound payload into CouchDB.
#[derive(Debug, Clone)]
pub struct AuditLogger {
    http: Client,
    couch_url: Option<String>,
}

impl AuditLogger {
    pub fn new(http: &Client, config: &Config) -> Self {
        Self {
            http: http.clone(),
            couch_url: config.couch_url.clone(),
        }
    }

    /// Starts logging `payload` in the background. Nothing waits on the
    /// returned handle in the request path; failures only reach the log.
    pub fn spawn(&self, payload: Value) -> JoinHandle<()> {
        let logger = self.clone();
        tokio::spawn(async move { logger.log(&payload).await })
    }

    pub async fn log(&self, payload: &Value) {
        let Some(url) = self.couch_url.as_deref() else {
            warn!("COUCH_URL is not set, skipping audit log");
            return;
        };

        let entry = AuditEntry {
            message: payload,
            date: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        };

        let result = self
            .http
            .post(url)
            .header("Accept", "application/json")
            .json(&entry)
            .send()
            .await;

        match result {
            Ok(response) if response.status() == StatusCode::CREATED => {
                debug!("audit log stored");
            }
            Ok(response) => {
                error!("logging to CouchDB failed with status {}", response.status());
            }
            Err(e) => {
                error!("logging to CouchDB failed: {}", e);
            }
        }
    }
}
