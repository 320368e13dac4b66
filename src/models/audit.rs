//! Audit domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditLog {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub subject_type: String,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<Uuid>,
    pub changes_summary: Option<String>,
    pub source_ip: Option<String>,
    pub trace_id: Option<String>,
    pub result: String,
    pub error_message: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Audit log filters
#[derive(Debug, Default, Deserialize)]
pub struct AuditLogFilters {
    pub subject_id: Option<Uuid>,
    pub resource_type: Option<String>,
    pub resource_id: Option<Uuid>,
    pub action: Option<String>,
    pub result: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}
