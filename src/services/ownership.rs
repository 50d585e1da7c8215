use crate::database::models::Bookmark;

/// A record that belongs to exactly one user
pub trait Owned {
    fn owner_id(&self) -> i64;
}

impl Owned for Bookmark {
    fn owner_id(&self) -> i64 {
        self.owner_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied,
}

impl Access {
    pub fn is_allowed(self) -> bool {
        self == Access::Allowed
    }
}

/// Allowed iff the caller is the recorded owner
pub fn authorize<E: Owned + ?Sized>(entity: &E, caller_id: i64) -> Access {
    if entity.owner_id() == caller_id {
        Access::Allowed
    } else {
        Access::Denied
    }
}
