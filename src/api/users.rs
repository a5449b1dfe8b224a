use mongodb::bson::doc;
use rocket::{serde::json::Json, Route};

use crate::{
    error::{Error, Result},
    model::{
        api::{Ack, ChangePasswordRequest, Stats, StatsResponse},
        auth::{Admin, AuthToken, Voter},
        db::{
            election::Election,
            user::{hash_password, Role, User},
            vote::Vote,
        },
        mongodb::Coll,
    },
};

pub fn routes() -> Vec<Route> {
    routes![change_password, stats]
}

/// Change the authenticated user's password.
#[post("/users/change-password", data = "<request>", format = "json")]
async fn change_password(
    token: AuthToken<Voter>,
    request: Json<ChangePasswordRequest>,
    users: Coll<User>,
) -> Result<Json<Ack>> {
    if request.current_password.is_empty() || request.new_password.is_empty() {
        return Err(Error::bad_request(
            "Current password and new password are required",
        ));
    }
    if request.new_password.len() < 6 {
        return Err(Error::bad_request(
            "New password must be at least 6 characters",
        ));
    }

    let user = users
        .find_one(token.id().as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("User"))?;

    if !user.verify_password(&request.current_password) {
        return Err(Error::unauthorized("Current password is incorrect"));
    }

    let new_hash = hash_password(&request.new_password)?;
    users
        .update_one(
            token.id().as_doc(),
            doc! { "$set": { "password_hash": new_hash } },
            None,
        )
        .await?;

    Ok(Json(Ack::ok("Password changed successfully")))
}

/// Aggregate counts for the admin dashboard.
#[get("/users/stats")]
async fn stats(
    _token: AuthToken<Admin>,
    users: Coll<User>,
    elections: Coll<Election>,
    votes: Coll<Vote>,
) -> Result<Json<StatsResponse>> {
    let stats = Stats {
        total_users: users
            .count_documents(doc! { "role": Role::Voter }, None)
            .await?,
        total_elections: elections.count_documents(None, None).await?,
        total_votes: votes.count_documents(None, None).await?,
    };

    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}
