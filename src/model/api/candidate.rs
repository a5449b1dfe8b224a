use serde::{Deserialize, Serialize};

use crate::model::{
    db::candidate::{Candidate, Position},
    mongodb::Id,
};

use super::coalition::CoalitionDescription;

/// A new candidate, as submitted by an admin.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSpec {
    pub election_id: String,
    pub coalition_id: Option<String>,
    pub name: String,
    pub position: Position,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

/// An API-friendly candidate description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDescription {
    pub id: Id,
    pub election_id: Id,
    pub coalition_id: Option<Id>,
    pub name: String,
    pub position: Position,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

impl From<Candidate> for CandidateDescription {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id,
            election_id: candidate.candidate.election_id,
            coalition_id: candidate.candidate.coalition_id,
            name: candidate.candidate.name,
            position: candidate.candidate.position,
            bio: candidate.candidate.bio,
            image_url: candidate.candidate.image_url,
        }
    }
}

/// A coalition with its candidates, as shown on the ballot page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoalitionSlate {
    #[serde(flatten)]
    pub coalition: CoalitionDescription,
    pub candidates: Vec<CandidateDescription>,
}

/// Response carrying a ballot: every coalition with its members, plus any
/// independents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResponse {
    pub success: bool,
    pub coalitions: Vec<CoalitionSlate>,
    pub independents: Vec<CandidateDescription>,
}

/// Response carrying a single candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateDetailResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub candidate: CandidateDescription,
}
