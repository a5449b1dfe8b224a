use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::{doc, serde_helpers::chrono_datetime_as_bson_datetime, to_bson, Bson};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;
use crate::model::mongodb::{Coll, Id};

/// What a user is allowed to do. Admins can do everything voters can.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Voter,
    Admin,
}

impl From<Role> for Bson {
    fn from(role: Role) -> Self {
        to_bson(&role).expect("role serialisation is infallible")
    }
}

/// Core user data.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCore {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub registration_number: String,
    pub year: u8,
    pub role: Role,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl UserCore {
    /// Check whether the given password is correct.
    /// A malformed stored hash counts as a failed check.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> bool {
        argon2::verify_encoded(&self.password_hash, password.as_ref()).unwrap_or(false)
    }
}

/// A user without an ID.
pub type NewUser = UserCore;

/// A user from the database, with its unique ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub user: UserCore,
}

impl Deref for User {
    type Target = UserCore;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl DerefMut for User {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.user
    }
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt: [u8; 16] = rand::thread_rng().gen();
    let hash = argon2::hash_encoded(password.as_bytes(), &salt, &argon2::Config::default())?;
    Ok(hash)
}

/// Insert the bootstrap admin account if no admin exists yet.
pub async fn ensure_admin_exists(
    users: &Coll<User>,
    new_users: &Coll<NewUser>,
    config: &Config,
) -> Result<()> {
    let existing = users.find_one(doc! { "role": Role::Admin }, None).await?;
    if existing.is_some() {
        return Ok(());
    }

    let admin = NewUser {
        name: "System Administrator".to_string(),
        email: config.admin_email().to_string(),
        password_hash: hash_password(config.admin_password())?,
        registration_number: config.admin_registration_number().to_string(),
        year: 1,
        role: Role::Admin,
        created_at: Utc::now(),
    };
    new_users.insert_one(admin, None).await?;
    info!("Created bootstrap admin account");
    Ok(())
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl UserCore {
        pub fn example() -> Self {
            Self {
                name: "Alice Mwangi".to_string(),
                email: "alice@university.edu".to_string(),
                // Hash of "correct horse battery staple".
                password_hash: hash_password("correct horse battery staple").unwrap(),
                registration_number: "SC/2021/1234".to_string(),
                year: 3,
                role: Role::Voter,
                created_at: Utc::now(),
            }
        }
    }

    impl User {
        pub fn example() -> Self {
            Self {
                id: Id::new(),
                user: UserCore::example(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_verification_round_trips() {
        let user = UserCore::example();
        assert!(user.verify_password("correct horse battery staple"));
        assert!(!user.verify_password("incorrect horse battery staple"));
    }

    #[test]
    fn malformed_hash_fails_closed() {
        let mut user = UserCore::example();
        user.password_hash = "not a hash".to_string();
        assert!(!user.verify_password("anything"));
    }

    #[test]
    fn admins_outrank_voters() {
        assert!(Role::Admin > Role::Voter);
    }
}
