use rocket::{serde::json::Json, Route};
use serde_json::{json, Value};

mod auth;
mod candidates;
mod coalitions;
mod elections;
mod results;
mod users;
mod votes;

pub fn routes() -> Vec<Route> {
    let mut routes = routes![health];
    routes.extend(auth::routes());
    routes.extend(users::routes());
    routes.extend(elections::routes());
    routes.extend(coalitions::routes());
    routes.extend(candidates::routes());
    routes.extend(votes::routes());
    routes.extend(results::routes());
    routes
}

#[get("/health")]
fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Server is running",
    }))
}
