//! Ownership gate shared by note and tag operations.
//!
//! # Responsibility
//! - Decide `Authorized | Forbidden | NotFound` from a resource owner and the
//!   requesting user.
//! - Carry ownership misses as an explicit tagged result ([`Outcome`]) so
//!   callers pick between silent absence and strict errors.
//!
//! # Invariants
//! - Read paths collapse `Forbidden` and `NotFound` into absence; callers
//!   never learn whether another user's resource exists.

use crate::error::{CoreError, CoreResult, Entity};
use crate::model::user::UserId;

/// Authorization decision for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Authorized,
    Forbidden,
    NotFound,
}

/// Decides access given the resource owner (`None` when the resource is
/// missing) and the requester.
pub fn authorize(resource_owner: Option<UserId>, requester: UserId) -> Access {
    match resource_owner {
        None => Access::NotFound,
        Some(owner) if owner == requester => Access::Authorized,
        Some(_) => Access::Forbidden,
    }
}

impl Access {
    /// Combines decisions for an operation touching two resources.
    ///
    /// A missing resource dominates a foreign one.
    pub fn and(self, other: Access) -> Access {
        match (self, other) {
            (Self::NotFound, _) | (_, Self::NotFound) => Self::NotFound,
            (Self::Forbidden, _) | (_, Self::Forbidden) => Self::Forbidden,
            _ => Self::Authorized,
        }
    }

    /// Strict form used by write paths.
    pub fn require(self, entity: Entity, id: i64) -> CoreResult<()> {
        match self {
            Self::Authorized => Ok(()),
            Self::Forbidden => Err(CoreError::Forbidden { entity, id }),
            Self::NotFound => Err(CoreError::NotFound { entity, id }),
        }
    }

    /// Runs `op` only when authorized, tagging the miss otherwise.
    pub fn run<T>(self, op: impl FnOnce() -> CoreResult<T>) -> CoreResult<Outcome<T>> {
        match self {
            Self::Authorized => op().map(Outcome::Done),
            Self::Forbidden => Ok(Outcome::Forbidden),
            Self::NotFound => Ok(Outcome::NotFound),
        }
    }
}

/// Result of an ownership-gated operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Done(T),
    NotFound,
    Forbidden,
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// Lenient form: both misses become `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Done(value) => Some(value),
            Self::NotFound | Self::Forbidden => None,
        }
    }

    /// Strict form: misses become `NotFound` / `Forbidden` errors.
    pub fn into_result(self, entity: Entity, id: i64) -> CoreResult<T> {
        match self {
            Self::Done(value) => Ok(value),
            Self::NotFound => Err(CoreError::NotFound { entity, id }),
            Self::Forbidden => Err(CoreError::Forbidden { entity, id }),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Done(value) => Outcome::Done(f(value)),
            Self::NotFound => Outcome::NotFound,
            Self::Forbidden => Outcome::Forbidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{authorize, Access, Outcome};
    use crate::error::{CoreError, Entity};

    #[test]
    fn authorize_distinguishes_missing_foreign_and_owned() {
        assert_eq!(authorize(None, 1), Access::NotFound);
        assert_eq!(authorize(Some(2), 1), Access::Forbidden);
        assert_eq!(authorize(Some(1), 1), Access::Authorized);
    }

    #[test]
    fn missing_dominates_foreign_when_combined() {
        assert_eq!(Access::Forbidden.and(Access::NotFound), Access::NotFound);
        assert_eq!(Access::Authorized.and(Access::Forbidden), Access::Forbidden);
        assert_eq!(Access::Authorized.and(Access::Authorized), Access::Authorized);
    }

    #[test]
    fn require_maps_to_errors() {
        assert!(Access::Authorized.require(Entity::Note, 1).is_ok());
        assert!(matches!(
            Access::Forbidden.require(Entity::Note, 1),
            Err(CoreError::Forbidden { .. })
        ));
        assert!(matches!(
            Access::NotFound.require(Entity::Tag, 3),
            Err(CoreError::NotFound { entity: Entity::Tag, id: 3 })
        ));
    }

    #[test]
    fn run_skips_operation_on_miss() {
        let mut called = false;
        let outcome = Access::Forbidden
            .run(|| {
                called = true;
                Ok(())
            })
            .unwrap();
        assert_eq!(outcome, Outcome::Forbidden);
        assert!(!called);
    }

    #[test]
    fn outcome_conversions() {
        assert_eq!(Outcome::Done(5).into_option(), Some(5));
        assert_eq!(Outcome::<i32>::Forbidden.into_option(), None);
        assert!(matches!(
            Outcome::<i32>::NotFound.into_result(Entity::Tag, 9),
            Err(CoreError::NotFound { id: 9, .. })
        ));
    }
}
