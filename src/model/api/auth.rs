use serde::{Deserialize, Serialize};

use crate::model::db::user::{Role, User};

/// Registration details for a new voter.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub registration_number: String,
    pub year: u8,
}

/// Login credentials.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A password change for the authenticated user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// An API-friendly user description; no password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDescription {
    pub id: String,
    pub name: String,
    pub email: String,
    pub registration_number: String,
    pub year: u8,
    pub role: Role,
}

impl From<User> for UserDescription {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.user.name,
            email: user.user.email,
            registration_number: user.user.registration_number,
            year: user.user.year,
            role: user.user.role,
        }
    }
}

/// Response to a successful registration or login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedResponse {
    pub success: bool,
    pub message: String,
    pub user: UserDescription,
}

/// Response describing the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: UserDescription,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_description_hides_the_password_hash() {
        let user = User::example();
        let description = UserDescription::from(user);
        let json = serde_json::to_value(&description).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["registrationNumber"], "SC/2021/1234");
        assert_eq!(json["role"], "voter");
    }
}
