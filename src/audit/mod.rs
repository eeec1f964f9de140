//! Interaction log
//!
//! Append-only record of every diagnosis, estimate and conversation turn.
//! Writes are fire-and-forget: a failing backend is reported with a warning
//! and never changes what the customer sees.

use crate::classifier::normalize;
use crate::device::DeviceContext;
use crate::error::AssistantError;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Conversation,
    Diagnosis,
    Estimate,
    Unrecognized,
}

impl InteractionKind {
    fn to_db(self) -> &'static str {
        match self {
            InteractionKind::Conversation => "conversation",
            InteractionKind::Diagnosis => "diagnosis",
            InteractionKind::Estimate => "estimate",
            InteractionKind::Unrecognized => "unrecognized",
        }
    }

    fn from_db(kind: &str) -> Self {
        match kind {
            "conversation" => InteractionKind::Conversation,
            "diagnosis" => InteractionKind::Diagnosis,
            "estimate" => InteractionKind::Estimate,
            _ => InteractionKind::Unrecognized,
        }
    }
}

/// One logged interaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub record_id: Uuid,
    pub session_id: Option<Uuid>,
    pub kind: InteractionKind,
    pub input: String,
    /// Hex SHA-256 of the normalized input, for grouping repeats
    pub input_fingerprint: String,
    pub outcome: serde_json::Value,
    pub device: DeviceContext,
    pub created_at: DateTime<Utc>,
}

impl InteractionRecord {
    pub fn new(
        kind: InteractionKind,
        input: impl Into<String>,
        outcome: serde_json::Value,
        session_id: Option<Uuid>,
        device: DeviceContext,
    ) -> Self {
        let input = input.into();
        let input_fingerprint = compute_input_fingerprint(&input);

        Self {
            record_id: Uuid::new_v4(),
            session_id,
            kind,
            input,
            input_fingerprint,
            outcome,
            device,
            created_at: Utc::now(),
        }
    }
}

/// SHA256 of the trimmed, normalized input
pub fn compute_input_fingerprint(input: &str) -> String {
    let digest = Sha256::digest(normalize(input.trim()).as_bytes());
    hex::encode(digest)
}

/// Storage backend for interactions
#[async_trait::async_trait]
pub trait InteractionLog: Send + Sync {
    async fn append(&self, record: InteractionRecord) -> Result<()>;

    /// Most recent first
    async fn recent(&self, limit: usize) -> Result<Vec<InteractionRecord>>;

    fn backend_name(&self) -> &'static str;
}

//
// ================= In-memory =================
//

pub struct InMemoryInteractionLog {
    records: Arc<RwLock<Vec<InteractionRecord>>>,
}

impl InMemoryInteractionLog {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

impl Default for InMemoryInteractionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl InteractionLog for InMemoryInteractionLog {
    async fn append(&self, record: InteractionRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.push(record);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<InteractionRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().rev().take(limit).cloned().collect())
    }

    fn backend_name(&self) -> &'static str {
        "in-memory"
    }
}

//
// ================= Postgres =================
//

pub struct PostgresInteractionLog {
    pool: PgPool,
    schema_ready: Arc<OnceCell<()>>,
}

impl PostgresInteractionLog {
    pub fn connect_lazy(url: &str) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect_lazy(url)
            .map_err(|e| {
                AssistantError::DatabaseError(format!("Invalid database URL: {}", e))
            })?;

        Ok(Self {
            pool,
            schema_ready: Arc::new(OnceCell::new()),
        })
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.schema_ready
            .get_or_try_init(|| async {
                sqlx::query(
                    r#"
                    CREATE TABLE IF NOT EXISTS interaction_log (
                      record_id UUID PRIMARY KEY,
                      session_id UUID,
                      kind TEXT NOT NULL,
                      input TEXT NOT NULL,
                      input_fingerprint TEXT NOT NULL,
                      outcome JSONB NOT NULL,
                      device_type TEXT NOT NULL,
                      device_os TEXT NOT NULL,
                      created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                    );
                    "#,
                )
                .execute(&self.pool)
                .await?;

                sqlx::query(
                    r#"
                    CREATE INDEX IF NOT EXISTS idx_interaction_log_created
                    ON interaction_log (created_at DESC);
                    "#,
                )
                .execute(&self.pool)
                .await?;

                Ok::<(), sqlx::Error>(())
            })
            .await
            .map_err(|e| {
                AssistantError::DatabaseError(format!(
                    "Failed to initialize interaction log schema: {}",
                    e
                ))
            })?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl InteractionLog for PostgresInteractionLog {
    async fn append(&self, record: InteractionRecord) -> Result<()> {
        self.ensure_schema().await?;

        sqlx::query(
            r#"
            INSERT INTO interaction_log
              (record_id, session_id, kind, input, input_fingerprint, outcome, device_type, device_os, created_at)
            VALUES
              ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.record_id)
        .bind(record.session_id)
        .bind(record.kind.to_db())
        .bind(&record.input)
        .bind(&record.input_fingerprint)
        .bind(&record.outcome)
        .bind(record.device.device_type.as_str())
        .bind(&record.device.os)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AssistantError::DatabaseError(format!("Failed to insert interaction: {}", e))
        })?;

        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<InteractionRecord>> {
        self.ensure_schema().await?;

        let rows = sqlx::query(
            r#"
            SELECT record_id, session_id, kind, input, input_fingerprint, outcome,
                   device_type, device_os, created_at
            FROM interaction_log
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AssistantError::DatabaseError(format!("Failed to load interactions: {}", e))
        })?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let kind: String = row.try_get("kind").unwrap_or_default();
            let device_type: String = row.try_get("device_type").unwrap_or_default();

            records.push(InteractionRecord {
                record_id: row.try_get("record_id").unwrap_or_else(|_| Uuid::new_v4()),
                session_id: row.try_get("session_id").ok().flatten(),
                kind: InteractionKind::from_db(&kind),
                input: row.try_get("input").unwrap_or_default(),
                input_fingerprint: row.try_get("input_fingerprint").unwrap_or_default(),
                outcome: row
                    .try_get("outcome")
                    .unwrap_or(serde_json::Value::Null),
                device: DeviceContext {
                    device_type: serde_json::from_value(serde_json::Value::String(device_type))
                        .unwrap_or(crate::device::DeviceType::Unknown),
                    os: row.try_get("device_os").unwrap_or_else(|_| "unknown".to_string()),
                },
                created_at: row.try_get("created_at").unwrap_or_else(|_| Utc::now()),
            });
        }

        Ok(records)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

/// Pick Postgres when a URL is configured, otherwise keep records in memory
pub fn build_interaction_log(database_url: Option<&str>) -> Arc<dyn InteractionLog> {
    if let Some(url) = database_url {
        match PostgresInteractionLog::connect_lazy(url) {
            Ok(log) => {
                info!("Interaction log backend: postgres");
                return Arc::new(log);
            }
            Err(error) => {
                warn!(
                    "Failed to initialize postgres interaction log, falling back to in-memory: {}",
                    error
                );
            }
        }
    }

    info!("Interaction log backend: in-memory");
    Arc::new(InMemoryInteractionLog::new())
}

//
// ================= Recorder =================
//

/// Fire-and-forget writer in front of an [`InteractionLog`]
#[derive(Clone)]
pub struct InteractionRecorder {
    log: Arc<dyn InteractionLog>,
}

impl InteractionRecorder {
    pub fn new(log: Arc<dyn InteractionLog>) -> Self {
        Self { log }
    }

    pub fn log(&self) -> &Arc<dyn InteractionLog> {
        &self.log
    }

    /// Spawn the append on the current runtime. Errors are logged, never
    /// returned. Outside a runtime the write is skipped and `None` returned.
    pub fn record(&self, record: InteractionRecord) -> Option<JoinHandle<()>> {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(
                    record_id = %record.record_id,
                    kind = ?record.kind,
                    "No tokio runtime, interaction not recorded"
                );
                return None;
            }
        };
        let log = Arc::clone(&self.log);

        Some(handle.spawn(async move {
            let record_id = record.record_id;
            let kind = record.kind;

            match log.append(record).await {
                Ok(()) => debug!(%record_id, ?kind, "Interaction recorded"),
                Err(error) => warn!(
                    %record_id,
                    backend = log.backend_name(),
                    "Interaction log write failed, result already returned: {}",
                    error
                ),
            }
        }))
    }
}
