//! Access errors raised at the identity boundary.
//!
//! Domain failures live with their domain (`FinanceError`); this type only
//! covers who may call what.

use thiserror::Error;

use crate::auth::Role;

/// Caller is not allowed to perform a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// No authenticated caller on the request.
    #[error("Authentication required")]
    Unauthenticated,

    /// Caller holds none of the listed roles.
    #[error("Requires role {}", join_roles(.0))]
    MissingRole(Vec<Role>),
}

impl AccessError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::MissingRole(_) => 403,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHORIZED",
            Self::MissingRole(_) => "FORBIDDEN",
        }
    }
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" or ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AccessError::Unauthenticated, 401, "UNAUTHORIZED")]
    #[case(AccessError::MissingRole(vec![Role::Admin]), 403, "FORBIDDEN")]
    fn test_status_and_code(#[case] err: AccessError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_missing_role_lists_alternatives() {
        assert_eq!(
            AccessError::MissingRole(vec![Role::Admin, Role::Editor]).to_string(),
            "Requires role admin or editor"
        );
        assert_eq!(
            AccessError::Unauthenticated.to_string(),
            "Authentication required"
        );
    }
}
