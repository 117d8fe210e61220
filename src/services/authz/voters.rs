use std::str::FromStr;

use crate::services::auth::Principal;

/// A domain object that knows who owns it.
pub trait Owned {
    fn is_owned_by(&self, principal: &Principal) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Any authenticated principal with a subject.
    User,
    /// Principal holding the admin role (`ROLE_ADMIN` with the default prefix).
    Admin,
    /// Principal owning the subject.
    Owner,
    OwnerOrAdmin,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::Owner => "OWNER",
            Self::OwnerOrAdmin => "OWNER_OR_ADMIN",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("unknown permission: {0}")]
    UnknownPermission(String),
    #[error("{0} check needs an owned subject")]
    UnexpectedSubject(&'static str),
}

impl FromStr for Permission {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            "OWNER" => Ok(Self::Owner),
            "OWNER_OR_ADMIN" => Ok(Self::OwnerOrAdmin),
            other => Err(AccessError::UnknownPermission(other.to_string())),
        }
    }
}

const ADMIN_ROLE: &str = "admin";

/// Anonymous callers (`principal == None`) are never granted anything.
///
/// `OWNER` without a subject is a caller bug and fails for everyone, anonymous
/// included. `OWNER_OR_ADMIN` lets admins through in that case.
pub fn is_granted(
    principal: Option<&Principal>,
    permission: Permission,
    subject: Option<&dyn Owned>,
) -> Result<bool, AccessError> {
    match permission {
        Permission::User => Ok(principal.is_some_and(user)),
        Permission::Admin => Ok(principal.is_some_and(admin)),
        Permission::Owner => owner(principal, subject),
        Permission::OwnerOrAdmin => match owner(principal, subject) {
            Ok(true) => Ok(true),
            Ok(false) => Ok(principal.is_some_and(admin)),
            Err(_) if principal.is_some_and(admin) => Ok(true),
            Err(err) => Err(err),
        },
    }
}

fn user(principal: &Principal) -> bool {
    !principal.username().is_empty()
}

fn admin(principal: &Principal) -> bool {
    principal.has_named_role(ADMIN_ROLE)
}

fn owner(principal: Option<&Principal>, subject: Option<&dyn Owned>) -> Result<bool, AccessError> {
    let subject = subject.ok_or(AccessError::UnexpectedSubject(Permission::Owner.as_str()))?;
    Ok(principal.is_some_and(|p| subject.is_owned_by(p)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::auth::{ClaimRoleMapper, ClaimSet};
    use serde_json::{Value, json};

    struct Document {
        owner: &'static str,
    }

    impl Owned for Document {
        fn is_owned_by(&self, principal: &Principal) -> bool {
            principal.username() == self.owner
        }
    }

    fn principal(claims: Value) -> Principal {
        principal_with_prefix(claims, "ROLE_")
    }

    fn principal_with_prefix(claims: Value, prefix: &str) -> Principal {
        Principal::new(
            ClaimSet::from_value(claims).unwrap(),
            "scopes",
            Arc::new(ClaimRoleMapper::new(prefix)),
        )
    }

    #[test]
    fn permissions_parse_from_attribute_names() {
        assert_eq!("USER".parse::<Permission>().unwrap(), Permission::User);
        assert_eq!(
            "OWNER_OR_ADMIN".parse::<Permission>().unwrap(),
            Permission::OwnerOrAdmin
        );
        assert!(matches!(
            "ROOT".parse::<Permission>(),
            Err(AccessError::UnknownPermission(_))
        ));
    }

    #[test]
    fn anonymous_is_never_granted() {
        let doc = Document { owner: "user" };

        for permission in [
            Permission::User,
            Permission::Admin,
            Permission::Owner,
            Permission::OwnerOrAdmin,
        ] {
            assert!(!is_granted(None, permission, Some(&doc)).unwrap());
        }
    }

    #[test]
    fn user_needs_a_subject_claim() {
        let user = principal(json!({"sub": "user"}));
        let nobody = principal(json!({"aud": "client"}));

        assert!(is_granted(Some(&user), Permission::User, None).unwrap());
        assert!(!is_granted(Some(&nobody), Permission::User, None).unwrap());
    }

    #[test]
    fn admin_needs_admin_role() {
        let admin = principal(json!({"sub": "root", "scopes": ["admin"]}));
        let user = principal(json!({"sub": "user", "scopes": ["user"]}));

        assert!(is_granted(Some(&admin), Permission::Admin, None).unwrap());
        assert!(!is_granted(Some(&user), Permission::Admin, None).unwrap());
    }

    #[test]
    fn admin_role_follows_the_configured_prefix() {
        let admin = principal_with_prefix(json!({"sub": "root", "scopes": ["admin"]}), "SCOPE_");
        let user =
            principal_with_prefix(json!({"sub": "user", "scopes": ["ROLE_ADMIN"]}), "SCOPE_");
        let theirs = Document { owner: "other" };

        assert_eq!(admin.roles(), ["SCOPE_ADMIN"]);
        assert!(is_granted(Some(&admin), Permission::Admin, None).unwrap());
        assert!(is_granted(Some(&admin), Permission::OwnerOrAdmin, Some(&theirs)).unwrap());
        assert!(!is_granted(Some(&user), Permission::Admin, None).unwrap());
    }

    #[test]
    fn owner_checks_the_subject() {
        let user = principal(json!({"sub": "user"}));
        let mine = Document { owner: "user" };
        let theirs = Document { owner: "other" };

        assert!(is_granted(Some(&user), Permission::Owner, Some(&mine)).unwrap());
        assert!(!is_granted(Some(&user), Permission::Owner, Some(&theirs)).unwrap());
    }

    #[test]
    fn owner_without_subject_is_an_error() {
        let user = principal(json!({"sub": "user"}));

        assert!(matches!(
            is_granted(Some(&user), Permission::Owner, None),
            Err(AccessError::UnexpectedSubject("OWNER"))
        ));
    }

    #[test]
    fn anonymous_owner_without_subject_is_an_error() {
        assert!(matches!(
            is_granted(None, Permission::Owner, None),
            Err(AccessError::UnexpectedSubject("OWNER"))
        ));
        assert!(is_granted(None, Permission::OwnerOrAdmin, None).is_err());
        assert!(!is_granted(None, Permission::User, None).unwrap());
    }

    #[test]
    fn owner_or_admin_accepts_either() {
        let admin = principal(json!({"sub": "root", "scopes": ["admin"]}));
        let user = principal(json!({"sub": "user"}));
        let mine = Document { owner: "user" };
        let theirs = Document { owner: "other" };

        assert!(is_granted(Some(&user), Permission::OwnerOrAdmin, Some(&mine)).unwrap());
        assert!(!is_granted(Some(&user), Permission::OwnerOrAdmin, Some(&theirs)).unwrap());
        assert!(is_granted(Some(&admin), Permission::OwnerOrAdmin, Some(&theirs)).unwrap());
        assert!(is_granted(Some(&admin), Permission::OwnerOrAdmin, None).unwrap());
        assert!(is_granted(Some(&user), Permission::OwnerOrAdmin, None).is_err());
    }
}
