use chrono::{DateTime, Utc};
use mongodb::bson::{to_bson, Bson};
use serde::{Deserialize, Serialize};

/// The lifecycle state of an election.
///
/// `Upcoming` may become `Active`, and `Active` may become `Closed`; those
/// are the only transitions. `Closed` is terminal, so an admin override to
/// closed sticks even once the clock says otherwise.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    Upcoming,
    Active,
    Closed,
}

impl ElectionStatus {
    /// The status a new election starts in, given its voting window.
    pub fn initial(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now >= end {
            Self::Closed
        } else if now >= start {
            Self::Active
        } else {
            Self::Upcoming
        }
    }

    /// The status this election should hold at `now`, starting from the
    /// stored status.
    ///
    /// An upcoming election whose entire window has already passed stays
    /// upcoming rather than jumping straight to closed: it never opened, so
    /// it has nothing to close. Sweeps apply the same rule.
    pub fn derive(self, start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        match self {
            Self::Upcoming if now >= start && now < end => Self::Active,
            Self::Active if now >= end => Self::Closed,
            other => other,
        }
    }
}

/// Allow statuses to be used directly in `doc!` filters.
impl From<ElectionStatus> for Bson {
    fn from(status: ElectionStatus) -> Self {
        to_bson(&status).expect("status serialisation is infallible")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        (start, start + Duration::days(2))
    }

    #[test]
    fn initial_status_follows_the_window() {
        let (start, end) = window();
        let before = start - Duration::hours(1);
        let during = start + Duration::hours(1);
        let after = end + Duration::hours(1);

        assert_eq!(
            ElectionStatus::initial(start, end, before),
            ElectionStatus::Upcoming
        );
        assert_eq!(
            ElectionStatus::initial(start, end, during),
            ElectionStatus::Active
        );
        assert_eq!(
            ElectionStatus::initial(start, end, after),
            ElectionStatus::Closed
        );
        // Boundary instants: start is inclusive, end is exclusive.
        assert_eq!(
            ElectionStatus::initial(start, end, start),
            ElectionStatus::Active
        );
        assert_eq!(
            ElectionStatus::initial(start, end, end),
            ElectionStatus::Closed
        );
    }

    #[test]
    fn only_forward_transitions_happen() {
        let (start, end) = window();
        let during = start + Duration::hours(1);
        let after = end + Duration::hours(1);

        assert_eq!(
            ElectionStatus::Upcoming.derive(start, end, during),
            ElectionStatus::Active
        );
        assert_eq!(
            ElectionStatus::Active.derive(start, end, after),
            ElectionStatus::Closed
        );
        // No change when the clock agrees with the stored status.
        assert_eq!(
            ElectionStatus::Active.derive(start, end, during),
            ElectionStatus::Active
        );
    }

    #[test]
    fn closed_is_terminal() {
        let (start, end) = window();
        let during = start + Duration::hours(1);
        assert_eq!(
            ElectionStatus::Closed.derive(start, end, during),
            ElectionStatus::Closed
        );
    }

    #[test]
    fn missed_window_stays_upcoming() {
        let (start, end) = window();
        let after = end + Duration::hours(1);
        assert_eq!(
            ElectionStatus::Upcoming.derive(start, end, after),
            ElectionStatus::Upcoming
        );
    }

    #[test]
    fn serialises_lowercase() {
        assert_eq!(Bson::from(ElectionStatus::Active), Bson::from("active"));
        assert_eq!(Bson::from(ElectionStatus::Upcoming), Bson::from("upcoming"));
        assert_eq!(Bson::from(ElectionStatus::Closed), Bson::from("closed"));
    }
}
