use crate::model::db::user::Role;

/// A marker type for a class of authenticated user.
/// Used as the type parameter of [`AuthToken`](super::AuthToken) so routes
/// can demand a minimum role in their signature.
pub trait AuthUser {
    const ROLE: Role;
}

/// Any authenticated user.
pub struct Voter;

impl AuthUser for Voter {
    const ROLE: Role = Role::Voter;
}

/// An administrator.
pub struct Admin;

impl AuthUser for Admin {
    const ROLE: Role = Role::Admin;
}
