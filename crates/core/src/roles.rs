//! Well-known role name constants carried in access-token claims.
//!
//! Derived from the `is_superuser` / `is_staff` flags of `auth_user`.

pub const ROLE_SUPERUSER: &str = "superuser";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_USER: &str = "user";

/// Resolve the role name for a user row's flags.
pub fn role_for(is_staff: bool, is_superuser: bool) -> &'static str {
    if is_superuser {
        ROLE_SUPERUSER
    } else if is_staff {
        ROLE_STAFF
    } else {
        ROLE_USER
    }
}

/// Whether a role may use the admin endpoints.
pub fn is_staff_role(role: &str) -> bool {
    role == ROLE_SUPERUSER || role == ROLE_STAFF
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superuser_wins_over_staff() {
        assert_eq!(role_for(true, true), ROLE_SUPERUSER);
        assert_eq!(role_for(false, true), ROLE_SUPERUSER);
        assert_eq!(role_for(true, false), ROLE_STAFF);
        assert_eq!(role_for(false, false), ROLE_USER);
    }

    #[test]
    fn only_staff_roles_reach_admin() {
        assert!(is_staff_role(ROLE_SUPERUSER));
        assert!(is_staff_role(ROLE_STAFF));
        assert!(!is_staff_role(ROLE_USER));
        assert!(!is_staff_role("reviewer"));
    }
}
