use mongodb::{bson::doc, options::FindOptions};
use rocket::{futures::TryStreamExt, http::Status, serde::json::Json, Route};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            Ack, CandidateDescription, CandidateDetailResponse, CandidateResponse, CandidateSpec,
            CoalitionSlate,
        },
        auth::{Admin, AuthToken, Voter},
        db::{
            candidate::{Candidate, NewCandidate},
            coalition::Coalition,
            election::Election,
        },
        mongodb::{Coll, Id},
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        ballot_for_election,
        candidate,
        create_candidate,
        delete_candidate,
    ]
}

/// The full ballot for an election: each coalition with its candidates, plus
/// any independents. Candidates are listed by seniority of post.
#[get("/candidates/election/<election_id>")]
async fn ballot_for_election(
    _token: AuthToken<Voter>,
    election_id: Id,
    coalitions: Coll<Coalition>,
    candidates: Coll<Candidate>,
) -> Result<Json<CandidateResponse>> {
    let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
    let standing: Vec<Coalition> = coalitions
        .find(doc! { "election_id": election_id }, options)
        .await?
        .try_collect()
        .await?;
    let mut running: Vec<Candidate> = candidates
        .find(doc! { "election_id": election_id }, None)
        .await?
        .try_collect()
        .await?;
    // Post seniority is an in-memory ordering; the stored strings sort
    // alphabetically.
    running.sort_by_key(|candidate| candidate.position);

    let mut slates = Vec::with_capacity(standing.len());
    let mut independents: Vec<CandidateDescription> = Vec::new();
    let mut grouped: Vec<(Id, Vec<CandidateDescription>)> = standing
        .iter()
        .map(|coalition| (coalition.id, Vec::new()))
        .collect();

    for candidate in running {
        let description = CandidateDescription::from(candidate);
        match description.coalition_id {
            Some(coalition_id) => {
                if let Some((_, members)) =
                    grouped.iter_mut().find(|(id, _)| *id == coalition_id)
                {
                    members.push(description);
                }
            }
            None => independents.push(description),
        }
    }

    for (coalition, (_, members)) in standing.into_iter().zip(grouped) {
        slates.push(CoalitionSlate {
            coalition: coalition.into(),
            candidates: members,
        });
    }

    Ok(Json(CandidateResponse {
        success: true,
        coalitions: slates,
        independents,
    }))
}

/// A single candidate by ID.
#[get("/candidates/<candidate_id>")]
async fn candidate(
    _token: AuthToken<Voter>,
    candidate_id: Id,
    candidates: Coll<Candidate>,
) -> Result<Json<CandidateDetailResponse>> {
    let candidate = candidates
        .find_one(candidate_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("Candidate"))?;

    Ok(Json(CandidateDetailResponse {
        success: true,
        message: None,
        candidate: candidate.into(),
    }))
}

/// Add a candidate to an election, optionally under a coalition.
#[post("/candidates", data = "<spec>", format = "json")]
async fn create_candidate(
    _token: AuthToken<Admin>,
    spec: Json<CandidateSpec>,
    elections: Coll<Election>,
    coalitions: Coll<Coalition>,
    candidates: Coll<Candidate>,
    new_candidates: Coll<NewCandidate>,
) -> Result<(Status, Json<CandidateDetailResponse>)> {
    let spec = spec.into_inner();
    if spec.name.trim().is_empty() {
        return Err(Error::bad_request(
            "Election ID, name, and position are required",
        ));
    }
    let election_id: Id = spec.election_id.parse().map_err(|_| {
        Error::bad_request("Election ID, name, and position are required")
    })?;

    elections
        .find_one(election_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("Election"))?;

    // A coalition, if named, must be standing in the same election.
    let coalition_id = match spec.coalition_id {
        Some(raw) => {
            let id: Id = raw
                .parse()
                .map_err(|_| Error::not_found("Coalition"))?;
            coalitions
                .find_one(
                    doc! { "_id": id, "election_id": election_id },
                    None,
                )
                .await?
                .ok_or_else(|| Error::not_found("Coalition"))?;
            Some(id)
        }
        None => None,
    };

    let candidate = NewCandidate {
        election_id,
        coalition_id,
        name: spec.name,
        position: spec.position,
        bio: spec.bio,
        image_url: spec.image_url,
    };

    let id: Id = new_candidates
        .insert_one(&candidate, None)
        .await?
        .inserted_id
        .as_object_id()
        .expect("inserted IDs are ObjectIds")
        .into();
    let candidate = candidates
        .find_one(id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("Freshly created candidate"))?;

    Ok((
        Status::Created,
        Json(CandidateDetailResponse {
            success: true,
            message: Some("Candidate added successfully".to_string()),
            candidate: candidate.into(),
        }),
    ))
}

/// Remove a candidate from the ballot.
#[delete("/candidates/<candidate_id>")]
async fn delete_candidate(
    _token: AuthToken<Admin>,
    candidate_id: Id,
    candidates: Coll<Candidate>,
) -> Result<Json<Ack>> {
    let deleted = candidates.delete_one(candidate_id.as_doc(), None).await?;
    if deleted.deleted_count == 0 {
        return Err(Error::not_found("Candidate"));
    }

    Ok(Json(Ack::ok("Candidate removed successfully")))
}
