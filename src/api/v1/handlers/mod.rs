pub mod admin;
pub mod health;
pub mod me;

use crate::error::AppError;
use crate::services::auth::Principal;
use crate::services::authz::{self, Owned, Permission};

/// `Forbidden` unless `permission` is granted.
pub(crate) fn ensure(
    principal: &Principal,
    permission: Permission,
    subject: Option<&dyn Owned>,
) -> Result<(), AppError> {
    if authz::is_granted(Some(principal), permission, subject)? {
        Ok(())
    } else {
        tracing::debug!(
            username = %principal.username(),
            permission = permission.as_str(),
            "access denied"
        );
        Err(AppError::Forbidden)
    }
}
