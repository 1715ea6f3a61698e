//! Role names and the purchase-triggered promotion rule.
//!
//! Roles are stored as plain strings on the `users` row. New signups are
//! guests; the first confirmed purchase promotes a guest to a full user.
//! That transition is one-way and is never reversed by this system.

/// Role of a signed-up user who has not purchased anything yet.
pub const ROLE_GUEST: &str = "guest";

/// Role of a user with at least one purchase.
pub const ROLE_USER: &str = "user";

/// Administrative role (content management, not granted by this system).
pub const ROLE_ADMIN: &str = "admin";

/// The role a user should hold after a confirmed purchase, or `None` when
/// the purchase does not change their role.
///
/// Only guests are promoted; users and admins keep their role.
pub fn promoted_role(current_role: &str) -> Option<&'static str> {
    if current_role == ROLE_GUEST {
        Some(ROLE_USER)
    } else {
        None
    }
}
