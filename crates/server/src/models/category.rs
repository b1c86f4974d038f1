use chrono::{DateTime, Utc};
use hemline_core::CategoryId;
use serde::Serialize;

/// A catalog category. Names are unique case-insensitively.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}
