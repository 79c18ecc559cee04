//! Account status codes and transitions.

use crate::error::CoreError;

/// Waiting for administrator review.
pub const STATUS_PENDING: i32 = 0;

/// Reviewed and listed for sale.
pub const STATUS_APPROVED: i32 = 480;

pub fn is_known_status(code: i32) -> bool {
    matches!(code, STATUS_PENDING | STATUS_APPROVED)
}

/// Status code after approval. Only pending accounts can be approved.
pub fn approve(current: i32) -> Result<i32, CoreError> {
    if current == STATUS_PENDING {
        Ok(STATUS_APPROVED)
    } else {
        Err(CoreError::Conflict(format!(
            "Account with status {current} cannot be approved"
        )))
    }
}

/// Reject status codes that no account may be created with.
pub fn validate_initial_status(code: i32) -> Result<(), CoreError> {
    if is_known_status(code) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Unknown account status code {code}")))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn approve_pending() {
        assert_eq!(approve(STATUS_PENDING).unwrap(), STATUS_APPROVED);
    }

    #[test]
    fn approve_twice_conflicts() {
        assert_matches!(approve(STATUS_APPROVED), Err(CoreError::Conflict(_)));
        assert_matches!(approve(17), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn initial_status_codes() {
        assert!(validate_initial_status(STATUS_PENDING).is_ok());
        assert!(validate_initial_status(STATUS_APPROVED).is_ok());
        assert!(validate_initial_status(-1).is_err());
    }
}
