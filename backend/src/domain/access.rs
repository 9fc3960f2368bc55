//! Role-hierarchy authorization applied to privileged operations.

use super::{Error, Role};

/// Whether `actor` may perform an operation requiring `required`.
///
/// # Examples
/// ```
/// use orderdesk::domain::{Role, authorize};
///
/// assert!(authorize(Role::SuperAdmin, Role::Admin));
/// assert!(!authorize(Role::Customer, Role::Admin));
/// ```
pub fn authorize(actor: Role, required: Role) -> bool {
    actor.level() >= required.level()
}

/// Gate an operation on the caller's role.
///
/// A missing role means no credential was presented and yields
/// [`ErrorCode::Unauthorized`](super::ErrorCode::Unauthorized); an
/// insufficient role yields [`ErrorCode::Forbidden`](super::ErrorCode::Forbidden).
pub fn require_role(actor: Option<Role>, required: Role) -> Result<(), Error> {
    match actor {
        None => Err(Error::unauthorized("authentication required")),
        Some(role) if authorize(role, required) => Ok(()),
        Some(_) => Err(Error::forbidden(format!("requires {required} role"))),
    }
}
