use std::marker::PhantomData;

use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{
    errors::Error as JwtError, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use rocket::{
    http::{Cookie, SameSite, Status},
    request::{self, FromRequest},
    Request,
};
use serde::{Deserialize, Serialize};

use crate::model::db::user::{Role, User};
use crate::model::mongodb::Id;
use crate::Config;

use super::user::AuthUser;

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// An authentication token representing a specific user with a specific role.
///
/// The type parameter is the minimum role the holder must have; a guard for
/// `AuthToken<Voter>` accepts admins too, a guard for `AuthToken<Admin>`
/// rejects plain voters with a 403.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthToken<U> {
    id: Id,
    role: Role,
    #[serde(skip)]
    phantom: PhantomData<U>,
}

impl<U> AuthToken<U> {
    /// Get the user ID.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the user's role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Does this token carry at least the given role?
    pub fn permits(&self, target: Role) -> bool {
        self.role >= target
    }
}

impl<U> AuthToken<U>
where
    U: AuthUser,
{
    /// Create a new [`AuthToken`] for the given user, carrying their stored
    /// role.
    pub fn for_user(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            phantom: PhantomData,
        }
    }

    /// Serialize this token into a cookie.
    pub fn into_cookie(self, config: &Config) -> Cookie<'static> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )
        .unwrap(); // Infallible.

        Cookie::build((AUTH_TOKEN_COOKIE, token))
            .max_age(time::Duration::seconds(config.auth_ttl().num_seconds()))
            .same_site(SameSite::Strict)
            .http_only(true)
            .build()
    }

    /// Deserialize a token from a cookie.
    pub fn from_cookie(cookie: &Cookie<'_>, config: &Config) -> Result<Self, JwtError> {
        jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims<U>>| claims.claims.token)
    }
}

/// Cookie claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims<U> {
    #[serde(flatten, bound = "")]
    token: AuthToken<U>,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[rocket::async_trait]
impl<'r, U> FromRequest<'r> for AuthToken<U>
where
    U: AuthUser,
{
    type Error = ();

    /// Get an AuthToken from the cookie and verify that it carries at least
    /// the role this user type demands.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let config = req
            .rocket()
            .state::<Config>()
            .expect("Config is always managed");

        let cookie = match req.cookies().get(AUTH_TOKEN_COOKIE) {
            Some(cookie) => cookie,
            None => return request::Outcome::Error((Status::Unauthorized, ())),
        };
        let token = match Self::from_cookie(cookie, config) {
            Ok(token) => token,
            Err(_) => return request::Outcome::Error((Status::Unauthorized, ())),
        };

        if token.permits(U::ROLE) {
            request::Outcome::Success(token)
        } else {
            request::Outcome::Error((Status::Forbidden, ()))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::auth::{Admin, Voter};
    use crate::model::db::user::User;

    use super::*;

    #[test]
    fn tokens_round_trip_through_cookies() {
        let config = Config::example();
        let user = User::example();

        let token = AuthToken::<Voter>::for_user(&user);
        let cookie = token.into_cookie(&config);
        assert_eq!(cookie.name(), AUTH_TOKEN_COOKIE);
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.http_only(), Some(true));

        let decoded = AuthToken::<Voter>::from_cookie(&cookie, &config).unwrap();
        assert_eq!(decoded.id(), user.id);
        assert_eq!(decoded.role(), Role::Voter);
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let config = Config::example();
        let user = User::example();

        let cookie = AuthToken::<Voter>::for_user(&user).into_cookie(&config);
        let forged = Cookie::build((AUTH_TOKEN_COOKIE, format!("{}x", cookie.value()))).build();
        assert!(AuthToken::<Voter>::from_cookie(&forged, &config).is_err());
    }

    #[test]
    fn admins_outrank_voters_but_not_vice_versa() {
        let user = User::example();
        let voter_token = AuthToken::<Voter>::for_user(&user);
        assert!(voter_token.permits(Role::Voter));
        assert!(!voter_token.permits(Role::Admin));

        let mut admin = User::example();
        admin.user.role = Role::Admin;
        let admin_token = AuthToken::<Admin>::for_user(&admin);
        assert!(admin_token.permits(Role::Voter));
        assert!(admin_token.permits(Role::Admin));
    }
}
