use chrono::{Duration, Utc};
use mongodb::{bson::doc, options::FindOptions};
use rocket::{futures::TryStreamExt, http::Status, serde::json::Json, Route};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            Ack, ElectionDescription, ElectionResponse, ElectionSpec, ElectionSummary,
            ElectionsResponse, StatusOverride,
        },
        auth::{Admin, AuthToken, Voter},
        common::ElectionStatus,
        db::{
            candidate::Candidate,
            coalition::Coalition,
            election::{Election, NewElection},
            vote::Vote,
        },
        mongodb::{Coll, Id},
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        elections,
        active_elections,
        election,
        create_election,
        override_status,
        delete_election,
    ]
}

/// All elections, newest first, each with its vote count.
#[get("/elections")]
async fn elections(
    _token: AuthToken<Voter>,
    elections: Coll<Election>,
    votes: Coll<Vote>,
) -> Result<Json<ElectionsResponse<ElectionSummary>>> {
    let options = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();
    let all: Vec<Election> = elections.find(None, options).await?.try_collect().await?;

    let now = Utc::now();
    let mut summaries = Vec::with_capacity(all.len());
    for mut election in all {
        let total_votes = votes
            .count_documents(doc! { "election_id": election.id }, None)
            .await?;
        election.election.status = election.current_status(now);
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

/// Elections currently open for voting.
#[get("/elections/active")]
async fn active_elections(
    _token: AuthToken<Voter>,
    elections: Coll<Election>,
) -> Result<Json<ElectionsResponse<ElectionDescription>>> {
    let now = Utc::now();
    let open = doc! {
        "status": ElectionStatus::Active,
        "end_time": { "$gt": now },
    };
    let active: Vec<Election> = elections.find(open, None).await?.try_collect().await?;

    Ok(Json(ElectionsResponse {
        success: true,
        elections: active.into_iter().map(Into::into).collect(),
    }))
}

/// A single election by ID, with its status derived from the clock.
#[get("/elections/<election_id>")]
async fn election(
    _token: AuthToken<Voter>,
    election_id: Id,
    elections: Coll<Election>,
) -> Result<Json<ElectionResponse>> {
    let mut election = elections
        .find_one(election_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("Election"))?;
    election.election.status = election.current_status(Utc::now());

    Ok(Json(ElectionResponse {
        success: true,
        message: None,
        election: election.into(),
    }))
}

/// Create a new election. Its initial status comes from the voting window.
#[post("/elections", data = "<spec>", format = "json")]
async fn create_election(
    token: AuthToken<Admin>,
    spec: Json<ElectionSpec>,
    elections: Coll<Election>,
    new_elections: Coll<NewElection>,
) -> Result<(Status, Json<ElectionResponse>)> {
    let spec = spec.into_inner();
    let now = Utc::now();

    if spec.title.trim().is_empty() {
        return Err(Error::bad_request("Title, start date, and end date are required"));
    }
    if spec.end_date <= spec.start_date {
        return Err(Error::bad_request("End date must be after start date"));
    }
    if spec.start_date < now - Duration::days(1) {
        return Err(Error::bad_request(
            "Start date cannot be more than 1 day in the past",
        ));
    }

    let status = ElectionStatus::initial(spec.start_date, spec.end_date, now);
    let election = NewElection {
        title: spec.title,
        description: spec.description,
        start_time: spec.start_date,
        end_time: spec.end_date,
        status,
        created_by: token.id(),
        created_at: now,
    };

    let id: Id = new_elections
        .insert_one(&election, None)
        .await?
        .inserted_id
        .as_object_id()
        .expect("inserted IDs are ObjectIds")
        .into();
    let election = elections
        .find_one(id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("Freshly created election"))?;

    let message = if status == ElectionStatus::Active {
        "Election created and is now active"
    } else {
        "Election created successfully"
    };

    Ok((
        Status::Created,
        Json(ElectionResponse {
            success: true,
            message: Some(message.to_string()),
            election: election.into(),
        }),
    ))
}

/// Manually set an election's status.
///
/// The periodic sweep does not know about overrides: an election forced
/// active inside its window will be closed again once its end time passes,
/// and one forced closed stays closed.
#[patch("/elections/<election_id>/status", data = "<change>", format = "json")]
async fn override_status(
    _token: AuthToken<Admin>,
    election_id: Id,
    change: Json<StatusOverride>,
    elections: Coll<Election>,
) -> Result<Json<ElectionResponse>> {
    let result = elections
        .update_one(
            election_id.as_doc(),
            doc! { "$set": { "status": change.status } },
            None,
        )
        .await?;
    if result.matched_count == 0 {
        return Err(Error::not_found("Election"));
    }

    let election = elections
        .find_one(election_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("Election"))?;

    Ok(Json(ElectionResponse {
        success: true,
        message: Some("Election status updated".to_string()),
        election: election.into(),
    }))
}

/// Delete an election along with its votes, candidates, and coalitions.
#[delete("/elections/<election_id>")]
async fn delete_election(
    _token: AuthToken<Admin>,
    election_id: Id,
    elections: Coll<Election>,
    coalitions: Coll<Coalition>,
    candidates: Coll<Candidate>,
    votes: Coll<Vote>,
) -> Result<Json<Ack>> {
    let election = elections
        .find_one(election_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("Election"))?;

    // Children first, so a partial failure cannot leave orphans pointing at
    // a missing election.
    let by_election = doc! { "election_id": election.id };
    votes.delete_many(by_election.clone(), None).await?;
    candidates.delete_many(by_election.clone(), None).await?;
    coalitions.delete_many(by_election, None).await?;
    elections.delete_one(election.id.as_doc(), None).await?;

    Ok(Json(Ack::ok("Election deleted successfully")))
}

#[cfg(test)]
mod tests {
    use crate::model::db::election::ElectionCore;

    use super::*;

    #[test]
    fn initial_status_matches_the_creation_rules() {
        let core = ElectionCore::example();
        let now = Utc::now();
        assert_eq!(
            ElectionStatus::initial(core.start_time, core.end_time, now),
            ElectionStatus::Active
        );
        assert_eq!(
            ElectionStatus::initial(now + Duration::days(1), now + Duration::days(2), now),
            ElectionStatus::Upcoming
        );
    }
}
