//! The authenticated caller of a domain operation.

use crate::error::Error;
use crate::users;
use entity::{locale::Locale, roles::Role, Id};

/// Who is acting. Always built from the session's user, never from request input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Actor {
    pub id: Id,
    pub role: Role,
    pub locale: Locale,
}

impl Actor {
    pub fn new(id: Id, role: Role) -> Self {
        Self {
            id,
            role,
            locale: Locale::default(),
        }
    }

    pub(crate) fn require(&self, role: Role) -> Result<(), Error> {
        if self.role == role {
            Ok(())
        } else {
            Err(Error::unauthorized())
        }
    }

    pub(crate) fn require_staff_or_admin(&self) -> Result<(), Error> {
        if self.role.is_staff_or_admin() {
            Ok(())
        } else {
            Err(Error::unauthorized())
        }
    }
}

impl From<&users::Model> for Actor {
    fn from(user: &users::Model) -> Self {
        Self {
            id: user.id,
            role: user.role,
            locale: user.locale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BookingErrorKind, DomainErrorKind};

    #[test]
    fn require_rejects_other_roles() {
        let staff = Actor::new(5, Role::Staff);

        assert!(staff.require(Role::Staff).is_ok());
        assert_eq!(
            staff.require(Role::Client).unwrap_err().error_kind,
            DomainErrorKind::Booking(BookingErrorKind::Unauthorized)
        );
    }

    #[test]
    fn clients_are_not_staff() {
        assert!(Actor::new(7, Role::Client)
            .require_staff_or_admin()
            .is_err());
        assert!(Actor::new(1, Role::Admin).require_staff_or_admin().is_ok());
    }
}
