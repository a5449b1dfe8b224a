use std::collections::HashMap;

use mongodb::{
    bson::{doc, Document},
    options::FindOptions,
};
use rocket::{futures::TryStreamExt, http::Status, serde::json::Json, Route};

use crate::{
    error::{Error, Result},
    model::{
        api::{tally_coalitions, ElectionResults, ElectionSummary, ElectionsResponse},
        auth::{AuthToken, Voter},
        common::ElectionStatus,
        db::{coalition::Coalition, election::Election, vote::Vote},
        mongodb::{Coll, Id},
    },
};

pub fn routes() -> Vec<Route> {
    routes![election_results, all_results]
}

/// Per-coalition vote counts for one election. Derived from the votes
/// collection on every read; nothing is precomputed.
#[get("/results/<election_id>")]
async fn election_results(
    _token: AuthToken<Voter>,
    election_id: Id,
    elections: Coll<Election>,
    coalitions: Coll<Coalition>,
    votes: Coll<Vote>,
) -> Result<Json<ElectionResults>> {
    let election = elections
        .find_one(election_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("Election"))?;

    let standing: Vec<Coalition> = coalitions
        .find(doc! { "election_id": election_id }, None)
        .await?
        .try_collect()
        .await?;
    let counts = grouped_vote_counts(&votes, election_id).await?;
    let results = tally_coalitions(standing, &counts);
    let total_votes = votes
        .count_documents(doc! { "election_id": election_id }, None)
        .await?;

    Ok(Json(ElectionResults {
        success: true,
        election: election.into(),
        total_votes,
        results,
    }))
}

/// Every election that has run or is running, with its turnout.
#[get("/results")]
async fn all_results(
    _token: AuthToken<Voter>,
    elections: Coll<Election>,
    votes: Coll<Vote>,
) -> Result<Json<ElectionsResponse<ElectionSummary>>> {
    let started = doc! {
        "status": { "$in": [ElectionStatus::Active, ElectionStatus::Closed] },
    };
    let options = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();
    let found: Vec<Election> = elections
        .find(started, options)
        .await?
        .try_collect()
        .await?;

    let mut summaries = Vec::with_capacity(found.len());
    for election in found {
        let total_votes = votes
            .count_documents(doc! { "election_id": election.id }, None)
            .await?;
        summaries.push(ElectionSummary {
            election: election.into(),
            total_votes,
        });
    }

    Ok(Json(ElectionsResponse {
        success: true,
        elections: summaries,
    }))
}

/// Count votes per coalition with a single aggregation pass.
async fn grouped_vote_counts(
    votes: &Coll<Vote>,
    election_id: Id,
) -> Result<HashMap<Id, u64>> {
    let pipeline = [
        doc! { "$match": { "election_id": election_id } },
        doc! { "$group": { "_id": "$coalition_id", "count": { "$sum": 1 } } },
    ];

    let mut counts = HashMap::new();
    let mut cursor = votes.aggregate(pipeline, None).await?;
    while let Some(group) = cursor.try_next().await? {
        let coalition_id: Id = group
            .get_object_id("_id")
            .map_err(|_| {
                Error::Status(
                    Status::InternalServerError,
                    "Malformed vote group".to_string(),
                )
            })?
            .into();
        counts.insert(coalition_id, count_field(&group));
    }
    Ok(counts)
}

/// `$sum` yields an i32 or an i64 depending on magnitude.
fn count_field(group: &Document) -> u64 {
    group
        .get_i64("count")
        .ok()
        .or_else(|| group.get_i32("count").ok().map(i64::from))
        .and_then(|count| u64::try_from(count).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use mongodb::bson::doc;

    use super::*;

    #[test]
    fn count_field_accepts_both_integer_widths() {
        assert_eq!(count_field(&doc! { "count": 3_i32 }), 3);
        assert_eq!(count_field(&doc! { "count": 5_000_000_000_i64 }), 5_000_000_000);
        assert_eq!(count_field(&doc! { "count": -1_i32 }), 0);
        assert_eq!(count_field(&doc! {}), 0);
    }
}
