//! Role-based authorization policy.
//!
//! One canonical [`Role`] enumeration is shared by the account entity, the
//! session claims and the permission checks. Handlers reject anonymous
//! requests with 401 before any role group is consulted; an authenticated
//! caller outside the required group gets 403.

pub use crate::entities::accounts::Role;

/// Roles allowed to act on their own profile and on directory writes.
/// Viewer is deliberately excluded.
pub const ELEVATED: &[Role] = &[Role::Citizen, Role::CountyOfficial, Role::Admin];

/// Roles allowed to perform administrative operations.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Pure membership test: `role` is inside `required`.
#[must_use]
pub fn allows(role: Role, required: &[Role]) -> bool {
    required.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elevated_excludes_viewer() {
        assert!(allows(Role::Citizen, ELEVATED));
        assert!(allows(Role::CountyOfficial, ELEVATED));
        assert!(allows(Role::Admin, ELEVATED));
        assert!(!allows(Role::Viewer, ELEVATED));
    }

    #[test]
    fn admin_only_admits_only_admin() {
        assert!(allows(Role::Admin, ADMIN_ONLY));
        assert!(!allows(Role::CountyOfficial, ADMIN_ONLY));
        assert!(!allows(Role::Citizen, ADMIN_ONLY));
        assert!(!allows(Role::Viewer, ADMIN_ONLY));
    }

    #[test]
    fn roles_serialize_as_wire_strings() {
        assert_eq!(
            serde_json::to_string(&Role::CountyOfficial).unwrap(),
            "\"COUNTY_OFFICIAL\""
        );
        assert_eq!(serde_json::to_string(&Role::Viewer).unwrap(), "\"VIEWER\"");
    }
}
