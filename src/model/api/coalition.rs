use serde::{Deserialize, Serialize};

use crate::model::{db::coalition::Coalition, mongodb::Id};

/// A new coalition, as submitted by an admin.
/// The election ID arrives as a hex string and is parsed by the route.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoalitionSpec {
    pub election_id: String,
    pub name: String,
    pub symbol: Option<String>,
    pub color: Option<String>,
}

/// An API-friendly coalition description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoalitionDescription {
    pub id: Id,
    pub election_id: Id,
    pub name: String,
    pub symbol: Option<String>,
    pub color: String,
}

impl From<Coalition> for CoalitionDescription {
    fn from(coalition: Coalition) -> Self {
        Self {
            id: coalition.id,
            election_id: coalition.coalition.election_id,
            name: coalition.coalition.name,
            symbol: coalition.coalition.symbol,
            color: coalition.coalition.color,
        }
    }
}

/// Response carrying a list of coalitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoalitionsResponse {
    pub success: bool,
    pub coalitions: Vec<CoalitionDescription>,
}

/// Response carrying a single coalition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoalitionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub coalition: CoalitionDescription,
}
