use chrono::Utc;
use mongodb::bson::doc;
use rocket::{http::Status, serde::json::Json, Route};

use crate::{
    error::{Error, Result},
    model::{
        api::{Ack, VoteSpec, VoteStatus},
        auth::{AuthToken, Voter},
        db::{
            coalition::Coalition,
            election::Election,
            vote::{NewVote, Vote, VoteCore},
        },
        mongodb::{is_duplicate_key, Coll, Id},
    },
};

const ALREADY_VOTED: &str = "You have already voted in this election";

pub fn routes() -> Vec<Route> {
    routes![cast_vote, vote_status]
}

/// Cast a vote for a coalition.
///
/// The early already-voted check gives a friendly error in the common case;
/// the unique index on `(election_id, voter_id)` is what actually prevents a
/// double vote when two requests race.
#[post("/votes", data = "<spec>", format = "json")]
async fn cast_vote(
    token: AuthToken<Voter>,
    spec: Json<VoteSpec>,
    elections: Coll<Election>,
    coalitions: Coll<Coalition>,
    votes: Coll<Vote>,
    new_votes: Coll<NewVote>,
) -> Result<(Status, Json<Ack>)> {
    let election_id: Id = spec
        .election_id
        .parse()
        .map_err(|_| Error::bad_request("Election ID and coalition ID are required"))?;
    let coalition_id: Id = spec
        .coalition_id
        .parse()
        .map_err(|_| Error::bad_request("Election ID and coalition ID are required"))?;

    let election = elections
        .find_one(election_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("Election"))?;
    election.ensure_open_for_voting(Utc::now())?;

    // The chosen coalition must be on this election's ballot.
    coalitions
        .find_one(
            doc! { "_id": coalition_id, "election_id": election_id },
            None,
        )
        .await?
        .ok_or_else(|| Error::not_found("Coalition"))?;

    let existing = votes
        .find_one(
            doc! { "election_id": election_id, "voter_id": token.id() },
            None,
        )
        .await?;
    if existing.is_some() {
        return Err(Error::bad_request(ALREADY_VOTED));
    }

    let vote = VoteCore {
        election_id,
        coalition_id,
        voter_id: token.id(),
        voted_at: Utc::now(),
    };
    match new_votes.insert_one(&vote, None).await {
        Ok(_) => {}
        Err(err) if is_duplicate_key(&err) => {
            // Lost a race with another request from the same voter.
            return Err(Error::bad_request(ALREADY_VOTED));
        }
        Err(err) => return Err(err.into()),
    }

    Ok((
        Status::Created,
        Json(Ack::ok("Vote recorded successfully")),
    ))
}

/// Whether the authenticated voter has voted in the given election.
#[get("/votes/check/<election_id>")]
async fn vote_status(
    token: AuthToken<Voter>,
    election_id: Id,
    votes: Coll<Vote>,
) -> Result<Json<VoteStatus>> {
    let existing = votes
        .find_one(
            doc! { "election_id": election_id, "voter_id": token.id() },
            None,
        )
        .await?;

    Ok(Json(VoteStatus {
        success: true,
        has_voted: existing.is_some(),
    }))
}
