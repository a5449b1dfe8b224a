use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Colour given to coalitions that don't pick one.
pub const DEFAULT_COLOR: &str = "#10b981";

/// Core coalition data. Names are unique within an election, enforced by a
/// collection index.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoalitionCore {
    pub election_id: Id,
    pub name: String,
    pub symbol: Option<String>,
    pub color: String,
}

/// A coalition without an ID.
pub type NewCoalition = CoalitionCore;

/// A coalition from the database, with its unique ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct Coalition {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub coalition: CoalitionCore,
}

impl Deref for Coalition {
    type Target = CoalitionCore;

    fn deref(&self) -> &Self::Target {
        &self.coalition
    }
}

impl DerefMut for Coalition {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.coalition
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl CoalitionCore {
        pub fn example(election_id: Id) -> Self {
            Self {
                election_id,
                name: "Unity Alliance".to_string(),
                symbol: Some("tree".to_string()),
                color: "#2563eb".to_string(),
            }
        }
    }

    impl Coalition {
        pub fn example(election_id: Id) -> Self {
            Self {
                id: Id::new(),
                coalition: CoalitionCore::example(election_id),
            }
        }
    }
}
