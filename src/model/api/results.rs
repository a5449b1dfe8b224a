use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{db::coalition::Coalition, mongodb::Id};

use super::election::ElectionDescription;

/// One row of an election's results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoalitionTally {
    pub id: Id,
    pub name: String,
    pub color: String,
    pub vote_count: u64,
}

/// Full results for one election.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionResults {
    pub success: bool,
    pub election: ElectionDescription,
    pub total_votes: u64,
    pub results: Vec<CoalitionTally>,
}

/// Aggregate counts for the admin dashboard. `total_users` counts voters
/// only; admin accounts are not part of the electorate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_users: u64,
    pub total_elections: u64,
    pub total_votes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: Stats,
}

/// Assemble a tally from a ballot and a sparse count map.
///
/// Every coalition on the ballot appears in the output, zero-filled if it
/// attracted no votes. Rows are ordered by count descending, then name
/// ascending so ties render stably.
pub fn tally_coalitions(
    coalitions: Vec<Coalition>,
    counts: &HashMap<Id, u64>,
) -> Vec<CoalitionTally> {
    let mut rows: Vec<CoalitionTally> = coalitions
        .into_iter()
        .map(|coalition| CoalitionTally {
            vote_count: counts.get(&coalition.id).copied().unwrap_or(0),
            id: coalition.id,
            name: coalition.coalition.name,
            color: coalition.coalition.color,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.vote_count
            .cmp(&a.vote_count)
            .then_with(|| a.name.cmp(&b.name))
    });
    rows
}

#[cfg(test)]
mod tests {
    use crate::model::db::coalition::CoalitionCore;

    use super::*;

    fn named(election_id: Id, name: &str) -> Coalition {
        let mut coalition = Coalition::example(election_id);
        coalition.coalition = CoalitionCore {
            name: name.to_string(),
            ..CoalitionCore::example(election_id)
        };
        coalition
    }

    #[test]
    fn coalitions_without_votes_appear_with_zero() {
        let election_id = Id::new();
        let winner = named(election_id, "Unity");
        let silent = named(election_id, "Progress");
        let winner_id = winner.id;

        let counts = HashMap::from([(winner_id, 5)]);
        let rows = tally_coalitions(vec![winner, silent], &counts);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Unity");
        assert_eq!(rows[0].vote_count, 5);
        assert_eq!(rows[1].name, "Progress");
        assert_eq!(rows[1].vote_count, 0);
    }

    #[test]
    fn rows_sort_by_count_then_name() {
        let election_id = Id::new();
        let a = named(election_id, "Alpha");
        let b = named(election_id, "Beta");
        let c = named(election_id, "Gamma");
        let counts = HashMap::from([(b.id, 2), (c.id, 2), (a.id, 1)]);

        let rows = tally_coalitions(vec![c, a, b], &counts);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Beta", "Gamma", "Alpha"]);
    }

    #[test]
    fn row_counts_sum_to_the_counted_votes() {
        let election_id = Id::new();
        let coalitions: Vec<Coalition> = ["One", "Two", "Three"]
            .iter()
            .map(|name| named(election_id, name))
            .collect();
        let counts: HashMap<Id, u64> = coalitions
            .iter()
            .zip([3u64, 0, 7])
            .map(|(coalition, count)| (coalition.id, count))
            .collect();

        let rows = tally_coalitions(coalitions, &counts);
        let total: u64 = rows.iter().map(|r| r.vote_count).sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn stray_counts_for_unknown_coalitions_are_ignored() {
        let election_id = Id::new();
        let only = named(election_id, "Only");
        let counts = HashMap::from([(only.id, 1), (Id::new(), 99)]);

        let rows = tally_coalitions(vec![only], &counts);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].vote_count, 1);
    }
}
