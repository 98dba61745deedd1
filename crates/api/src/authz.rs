//! Role guard for handlers.
//!
//! Ownership checks (which product a seller may edit, which cart line a buyer
//! may touch) live in the services; this only checks the caller's role.

use thiserror::Error;

use crate::context::{PrincipalContext, Role};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("this action requires the {required} role (caller is {actual})")]
pub struct AuthzError {
    pub required: Role,
    pub actual: Role,
}

pub fn require_role(principal: &PrincipalContext, required: Role) -> Result<(), AuthzError> {
    if principal.role() == required {
        Ok(())
    } else {
        Err(AuthzError {
            required,
            actual: principal.role(),
        })
    }
}
