use std::io::Cursor;

use argon2::Error as Argon2Error;
use jsonwebtoken::errors::Error as JwtError;
use mongodb::error::Error as DbError;
use rocket::{
    http::{ContentType, Status},
    response::Responder,
    Catcher, Request, Response,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Everything a route can fail with.
///
/// Domain rule violations are built via the helper constructors and carry
/// their own status and caller-facing message. Storage, token, and hashing
/// failures are wrapped transparently and rendered as a generic 500: the
/// details go to the log, never to the caller.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Argon2(#[from] Argon2Error),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Status(Status::BadRequest, message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Status(Status::Unauthorized, message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Status(Status::Forbidden, message.into())
    }

    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::Status(Status::NotFound, format!("{} not found", entity.into()))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Status(Status::Conflict, message.into())
    }

    /// The status and caller-facing message for this error.
    fn render(&self) -> (Status, &str) {
        match self {
            Self::Status(status, message) => (*status, message),
            Self::Db(_) | Self::Jwt(_) | Self::Argon2(_) => {
                (Status::InternalServerError, INTERNAL_MESSAGE)
            }
        }
    }
}

/// Serialise a `{"success": false, "message": ...}` body.
fn envelope<'o>(status: Status, message: &str) -> Response<'o> {
    let body = json!({ "success": false, "message": message }).to_string();
    Response::build()
        .status(status)
        .header(ContentType::JSON)
        .sized_body(body.len(), Cursor::new(body))
        .finalize()
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let (status, message) = self.render();
        if status == Status::InternalServerError {
            error!("{self:?}");
        }
        Ok(envelope(status, message))
    }
}

/// Catchers rendering the same envelope for failures that never reach a
/// route body: guard rejections, unmatched routes, malformed JSON.
pub fn catchers() -> Vec<Catcher> {
    catchers![
        catch_bad_request,
        catch_unauthorized,
        catch_forbidden,
        catch_not_found,
        catch_unprocessable,
        catch_internal,
    ]
}

#[catch(400)]
fn catch_bad_request() -> Error {
    Error::bad_request("Bad request")
}

#[catch(401)]
fn catch_unauthorized() -> Error {
    Error::unauthorized("No valid authentication token provided")
}

#[catch(403)]
fn catch_forbidden() -> Error {
    Error::forbidden("Admin access required")
}

#[catch(404)]
fn catch_not_found() -> Error {
    Error::Status(Status::NotFound, "Route not found".to_string())
}

#[catch(422)]
fn catch_unprocessable() -> Error {
    Error::Status(Status::UnprocessableEntity, "Malformed request body".to_string())
}

#[catch(500)]
fn catch_internal() -> Error {
    Error::Status(Status::InternalServerError, INTERNAL_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_keep_their_message() {
        let err = Error::bad_request("This election has ended");
        let (status, message) = err.render();
        assert_eq!(status, Status::BadRequest);
        assert_eq!(message, "This election has ended");

        let err = Error::conflict("Email or Registration Number already exists");
        let (status, _) = err.render();
        assert_eq!(status, Status::Conflict);

        let err = Error::not_found("Election with ID '123'");
        let (status, message) = err.render();
        assert_eq!(status, Status::NotFound);
        assert_eq!(message, "Election with ID '123' not found");
    }

    #[test]
    fn infrastructure_errors_never_leak_details() {
        let err = Error::from(argon2::Error::DecodingFail);
        let (status, message) = err.render();
        assert_eq!(status, Status::InternalServerError);
        assert_eq!(message, INTERNAL_MESSAGE);

        let err = Error::from(jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::InvalidToken,
        ));
        let (status, message) = err.render();
        assert_eq!(status, Status::InternalServerError);
        assert_eq!(message, INTERNAL_MESSAGE);
    }
}
