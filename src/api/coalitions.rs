use mongodb::{
    bson::{doc, Bson},
    options::FindOptions,
};
use rocket::{futures::TryStreamExt, http::Status, serde::json::Json, Route};

use crate::{
    error::{Error, Result},
    model::{
        api::{Ack, CoalitionResponse, CoalitionSpec, CoalitionsResponse},
        auth::{Admin, AuthToken, Voter},
        db::{
            candidate::Candidate,
            coalition::{Coalition, NewCoalition, DEFAULT_COLOR},
            election::Election,
        },
        mongodb::{is_duplicate_key, Coll, Id},
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        coalitions_for_election,
        coalition,
        create_coalition,
        delete_coalition,
    ]
}

/// All coalitions standing in an election, in creation order.
#[get("/coalitions/election/<election_id>")]
async fn coalitions_for_election(
    _token: AuthToken<Voter>,
    election_id: Id,
    coalitions: Coll<Coalition>,
) -> Result<Json<CoalitionsResponse>> {
    let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
    let found: Vec<Coalition> = coalitions
        .find(doc! { "election_id": election_id }, options)
        .await?
        .try_collect()
        .await?;

    Ok(Json(CoalitionsResponse {
        success: true,
        coalitions: found.into_iter().map(Into::into).collect(),
    }))
}

/// A single coalition by ID.
#[get("/coalitions/<coalition_id>")]
async fn coalition(
    _token: AuthToken<Voter>,
    coalition_id: Id,
    coalitions: Coll<Coalition>,
) -> Result<Json<CoalitionResponse>> {
    let coalition = coalitions
        .find_one(coalition_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("Coalition"))?;

    Ok(Json(CoalitionResponse {
        success: true,
        message: None,
        coalition: coalition.into(),
    }))
}

/// Register a coalition for an election.
#[post("/coalitions", data = "<spec>", format = "json")]
async fn create_coalition(
    _token: AuthToken<Admin>,
    spec: Json<CoalitionSpec>,
    elections: Coll<Election>,
    coalitions: Coll<Coalition>,
    new_coalitions: Coll<NewCoalition>,
) -> Result<(Status, Json<CoalitionResponse>)> {
    let spec = spec.into_inner();
    if spec.name.trim().is_empty() {
        return Err(Error::bad_request("Election ID and name are required"));
    }
    let election_id: Id = spec
        .election_id
        .parse()
        .map_err(|_| Error::bad_request("Election ID and name are required"))?;

    elections
        .find_one(election_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("Election"))?;

    let coalition = NewCoalition {
        election_id,
        name: spec.name,
        symbol: spec.symbol,
        color: spec.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
    };

    let id: Id = match new_coalitions.insert_one(&coalition, None).await {
        Ok(result) => result
            .inserted_id
            .as_object_id()
            .expect("inserted IDs are ObjectIds")
            .into(),
        Err(err) if is_duplicate_key(&err) => {
            return Err(Error::conflict(
                "A coalition with this name already exists in this election",
            ));
        }
        Err(err) => return Err(err.into()),
    };
    let coalition = coalitions
        .find_one(id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("Freshly created coalition"))?;

    Ok((
        Status::Created,
        Json(CoalitionResponse {
            success: true,
            message: Some("Coalition created successfully".to_string()),
            coalition: coalition.into(),
        }),
    ))
}

/// Remove a coalition. Its candidates stay on the ballot as independents.
#[delete("/coalitions/<coalition_id>")]
async fn delete_coalition(
    _token: AuthToken<Admin>,
    coalition_id: Id,
    coalitions: Coll<Coalition>,
    candidates: Coll<Candidate>,
) -> Result<Json<Ack>> {
    let coalition = coalitions
        .find_one(coalition_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("Coalition"))?;

    candidates
        .update_many(
            doc! { "coalition_id": coalition.id },
            doc! { "$set": { "coalition_id": Bson::Null } },
            None,
        )
        .await?;
    coalitions.delete_one(coalition.id.as_doc(), None).await?;

    Ok(Json(Ack::ok("Coalition deleted successfully")))
}
