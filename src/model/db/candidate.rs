use std::ops::{Deref, DerefMut};

use mongodb::bson::{to_bson, Bson};
use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// The posts a candidate can stand for. Listed in the order slates display
/// them.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Chairperson,
    ViceChair,
    Secretary,
    SportsPerson,
    Treasurer,
    GenderRepresentative,
}

impl From<Position> for Bson {
    fn from(position: Position) -> Self {
        to_bson(&position).expect("position serialisation is infallible")
    }
}

/// Core candidate data. A candidate may be independent, in which case they
/// have no coalition.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCore {
    pub election_id: Id,
    pub coalition_id: Option<Id>,
    pub name: String,
    pub position: Position,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

/// A candidate without an ID.
pub type NewCandidate = CandidateCore;

/// A candidate from the database, with its unique ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub candidate: CandidateCore,
}

impl Deref for Candidate {
    type Target = CandidateCore;

    fn deref(&self) -> &Self::Target {
        &self.candidate
    }
}

impl DerefMut for Candidate {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.candidate
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl CandidateCore {
        pub fn example(election_id: Id, coalition_id: Option<Id>) -> Self {
            Self {
                election_id,
                coalition_id,
                name: "Brian Otieno".to_string(),
                position: Position::Chairperson,
                bio: Some("Third-year economics student".to_string()),
                image_url: None,
            }
        }
    }

    impl Candidate {
        pub fn example(election_id: Id, coalition_id: Option<Id>) -> Self {
            Self {
                id: Id::new(),
                candidate: CandidateCore::example(election_id, coalition_id),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_serialise_snake_case() {
        assert_eq!(Bson::from(Position::ViceChair), Bson::from("vice_chair"));
        assert_eq!(
            Bson::from(Position::GenderRepresentative),
            Bson::from("gender_representative")
        );
        assert_eq!(
            Bson::from(Position::SportsPerson),
            Bson::from("sports_person")
        );
    }

    #[test]
    fn positions_order_by_seniority() {
        assert!(Position::Chairperson < Position::ViceChair);
        assert!(Position::ViceChair < Position::Secretary);
        assert!(Position::SportsPerson < Position::Treasurer);
    }
}
