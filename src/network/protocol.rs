//! Wire protocol: one JSON object per line
//!
//! Requests carry an optional `id` echoed back in the response; a fresh UUID
//! is used when the caller sends none.

use crate::classifier::{Outcome, OutcomeKind};
use crate::stats::StatisticsSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestKind {
    /// Classify a grid. Absent rows are `null`.
    Mutant {
        #[serde(default)]
        dna: Option<Vec<Option<String>>>,
    },
    /// Read the statistics snapshot
    Stats,
}

/// A request line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub kind: RequestKind,
}

impl Request {
    pub fn mutant<S: Into<String>>(rows: impl IntoIterator<Item = S>) -> Self {
        Self {
            id: None,
            kind: RequestKind::Mutant {
                dna: Some(rows.into_iter().map(|r| Some(r.into())).collect()),
            },
        }
    }

    pub fn stats() -> Self {
        Self { id: None, kind: RequestKind::Stats }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Serialize as a newline-terminated JSON line
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim())
    }
}

/// A response line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: String,
    /// 200 mutant or stats, 403 human, 400 invalid, 500 internal failure
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatisticsSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Response {
    fn new(id: Option<String>, status: u16) -> Self {
        Self {
            id: id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            status,
            outcome: None,
            stats: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn outcome(id: Option<String>, outcome: &Outcome) -> Self {
        let mut response = Self::new(id, outcome.status());
        response.outcome = Some(outcome.kind());
        if let Outcome::Invalid(e) = outcome {
            response.error = Some(e.to_string());
        }
        response
    }

    pub fn stats(id: Option<String>, stats: StatisticsSnapshot) -> Self {
        let mut response = Self::new(id, 200);
        response.stats = Some(stats);
        response
    }

    pub fn error(id: Option<String>, status: u16, message: impl Into<String>) -> Self {
        let mut response = Self::new(id, status);
        response.error = Some(message.into());
        response
    }

    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim())
    }
}
