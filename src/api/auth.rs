use chrono::Utc;
use mongodb::bson::doc;
use rocket::{
    http::{CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    error::{Error, Result},
    model::{
        api::{Ack, AuthenticatedResponse, LoginRequest, RegisterRequest, UserResponse},
        auth::{AuthToken, Voter, AUTH_TOKEN_COOKIE},
        db::user::{hash_password, NewUser, Role, User},
        mongodb::{is_duplicate_key, Coll},
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![register, login, me, logout]
}

/// Register a new voter account and log them in.
#[post("/auth/register", data = "<spec>", format = "json")]
async fn register(
    spec: Json<RegisterRequest>,
    cookies: &CookieJar<'_>,
    users: Coll<User>,
    new_users: Coll<NewUser>,
    config: &State<Config>,
) -> Result<(Status, Json<AuthenticatedResponse>)> {
    let spec = spec.into_inner();
    validate_registration(&spec)?;

    let user = NewUser {
        name: spec.name,
        email: spec.email.to_lowercase(),
        password_hash: hash_password(&spec.password)?,
        registration_number: spec.registration_number,
        year: spec.year,
        role: Role::Voter,
        created_at: Utc::now(),
    };

    let new_id = match new_users.insert_one(&user, None).await {
        Ok(result) => result,
        Err(err) if is_duplicate_key(&err) => {
            return Err(Error::conflict(
                "Email or Registration Number already exists",
            ));
        }
        Err(err) => return Err(err.into()),
    };
    // Re-read so the response carries the canonical stored document.
    let id = new_id
        .inserted_id
        .as_object_id()
        .expect("inserted IDs are ObjectIds");
    let user = users
        .find_one(doc! { "_id": id }, None)
        .await?
        .ok_or_else(|| Error::not_found("Freshly registered user"))?;

    let token = AuthToken::<Voter>::for_user(&user);
    cookies.add(token.into_cookie(config));

    Ok((
        Status::Created,
        Json(AuthenticatedResponse {
            success: true,
            message: "Registration successful".to_string(),
            user: user.into(),
        }),
    ))
}

/// Log in with email and password.
#[post("/auth/login", data = "<credentials>", format = "json")]
async fn login(
    credentials: Json<LoginRequest>,
    cookies: &CookieJar<'_>,
    users: Coll<User>,
    config: &State<Config>,
) -> Result<Json<AuthenticatedResponse>> {
    let with_email = doc! {
        "email": credentials.email.to_lowercase(),
    };

    // The same error for an unknown email and a wrong password, so the
    // response does not reveal which emails are registered.
    let user = users
        .find_one(with_email, None)
        .await?
        .filter(|user| user.verify_password(&credentials.password))
        .ok_or_else(|| Error::unauthorized("Invalid email or password"))?;

    let token = AuthToken::<Voter>::for_user(&user);
    cookies.add(token.into_cookie(config));

    Ok(Json(AuthenticatedResponse {
        success: true,
        message: "Login successful".to_string(),
        user: user.into(),
    }))
}

/// Describe the authenticated user.
#[get("/auth/me")]
async fn me(token: AuthToken<Voter>, users: Coll<User>) -> Result<Json<UserResponse>> {
    let user = users
        .find_one(token.id().as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found("User"))?;

    Ok(Json(UserResponse {
        success: true,
        user: user.into(),
    }))
}

/// Clear the auth cookie.
#[post("/auth/logout")]
fn logout(cookies: &CookieJar<'_>) -> Json<Ack> {
    cookies.remove(AUTH_TOKEN_COOKIE);
    Json(Ack::ok("Logged out successfully"))
}

fn validate_registration(spec: &RegisterRequest) -> Result<()> {
    if spec.name.trim().is_empty()
        || spec.email.trim().is_empty()
        || spec.password.is_empty()
        || spec.registration_number.trim().is_empty()
    {
        return Err(Error::bad_request("All fields are required"));
    }
    if !spec.email.contains('@') {
        return Err(Error::bad_request("Invalid email format"));
    }
    if !(1..=4).contains(&spec.year) {
        return Err(Error::bad_request("Year must be between 1 and 4"));
    }
    if spec.password.len() < 6 {
        return Err(Error::bad_request(
            "Password must be at least 6 characters long",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RegisterRequest {
        RegisterRequest {
            name: "Alice Mwangi".to_string(),
            email: "alice@university.edu".to_string(),
            password: "hunter22".to_string(),
            registration_number: "SC/2021/1234".to_string(),
            year: 3,
        }
    }

    #[test]
    fn valid_registrations_pass() {
        assert!(validate_registration(&valid()).is_ok());
    }

    #[test]
    fn missing_fields_are_rejected() {
        let mut spec = valid();
        spec.name = "  ".to_string();
        assert!(validate_registration(&spec).is_err());
    }

    #[test]
    fn year_must_be_in_range() {
        let mut spec = valid();
        spec.year = 0;
        assert!(validate_registration(&spec).is_err());
        spec.year = 5;
        assert!(validate_registration(&spec).is_err());
        spec.year = 4;
        assert!(validate_registration(&spec).is_ok());
    }

    #[test]
    fn short_passwords_are_rejected() {
        let mut spec = valid();
        spec.password = "12345".to_string();
        assert!(validate_registration(&spec).is_err());
    }

    #[test]
    fn email_needs_an_at_sign() {
        let mut spec = valid();
        spec.email = "alice.university.edu".to_string();
        assert!(validate_registration(&spec).is_err());
    }
}
