use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{common::ElectionStatus, db::election::Election, mongodb::Id};

/// A new election, as submitted by an admin.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionSpec {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// A manual status change, as submitted by an admin.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusOverride {
    pub status: ElectionStatus,
}

/// An API-friendly election description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionDescription {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: ElectionStatus,
}

impl From<Election> for ElectionDescription {
    fn from(election: Election) -> Self {
        Self {
            id: election.id,
            title: election.election.title,
            description: election.election.description,
            start_date: election.election.start_time,
            end_date: election.election.end_time,
            status: election.election.status,
        }
    }
}

/// An election plus its vote count, for list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionSummary {
    #[serde(flatten)]
    pub election: ElectionDescription,
    pub total_votes: u64,
}

/// Response carrying a list of elections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectionsResponse<T> {
    pub success: bool,
    pub elections: Vec<T>,
}

/// Response carrying a single election.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub election: ElectionDescription,
}
