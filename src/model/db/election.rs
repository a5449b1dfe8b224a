use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{common::ElectionStatus, mongodb::Id};

/// Core election data.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ElectionCore {
    pub title: String,
    pub description: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub end_time: DateTime<Utc>,
    pub status: ElectionStatus,
    pub created_by: Id,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl ElectionCore {
    /// The status this election should hold at `now`, regardless of how
    /// stale the stored status is.
    pub fn current_status(&self, now: DateTime<Utc>) -> ElectionStatus {
        self.status.derive(self.start_time, self.end_time, now)
    }

    /// Check that a vote may be admitted at `now`.
    ///
    /// The stored status must say active AND the clock must agree that the
    /// window is still open; a stale active status past the end time does
    /// not admit votes.
    pub fn ensure_open_for_voting(&self, now: DateTime<Utc>) -> Result<()> {
        if self.status != ElectionStatus::Active {
            return Err(Error::bad_request("This election is not currently active"));
        }
        if now >= self.end_time {
            return Err(Error::bad_request("This election has ended"));
        }
        Ok(())
    }
}

/// An election without an ID.
pub type NewElection = ElectionCore;

/// An election from the database, with its unique ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct Election {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub election: ElectionCore,
}

impl Deref for Election {
    type Target = ElectionCore;

    fn deref(&self) -> &Self::Target {
        &self.election
    }
}

impl DerefMut for Election {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.election
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use chrono::Duration;

    use super::*;

    impl ElectionCore {
        /// An election currently in its voting window.
        pub fn example() -> Self {
            let now = Utc::now();
            Self {
                title: "Student Council 2024".to_string(),
                description: "Annual student council election".to_string(),
                start_time: now - Duration::hours(1),
                end_time: now + Duration::days(1),
                status: ElectionStatus::Active,
                created_by: Id::new(),
                created_at: now - Duration::days(7),
            }
        }
    }

    impl Election {
        pub fn example() -> Self {
            Self {
                id: Id::new(),
                election: ElectionCore::example(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn active_election_admits_votes() {
        let election = ElectionCore::example();
        assert!(election.ensure_open_for_voting(Utc::now()).is_ok());
    }

    #[test]
    fn non_active_statuses_are_rejected() {
        let mut election = ElectionCore::example();
        election.status = ElectionStatus::Upcoming;
        assert!(election.ensure_open_for_voting(Utc::now()).is_err());

        election.status = ElectionStatus::Closed;
        assert!(election.ensure_open_for_voting(Utc::now()).is_err());
    }

    #[test]
    fn stale_active_status_past_the_end_is_rejected() {
        let mut election = ElectionCore::example();
        // Stored status still says active but the window closed a second ago.
        election.end_time = Utc::now() - Duration::seconds(1);
        assert!(election.ensure_open_for_voting(Utc::now()).is_err());
    }

    #[test]
    fn voting_at_the_exact_end_instant_is_rejected() {
        let election = ElectionCore::example();
        assert!(election.ensure_open_for_voting(election.end_time).is_err());
    }

    #[test]
    fn current_status_tracks_the_clock() {
        let election = ElectionCore::example();
        assert_eq!(
            election.current_status(election.end_time + Duration::seconds(1)),
            ElectionStatus::Closed
        );
        assert_eq!(
            election.current_status(Utc::now()),
            ElectionStatus::Active
        );
    }
}
