use crate::models::{Book, Film, Review};
use crate::principal::Principal;

/// The actions the ownership predicate can be asked about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Add,
    Change,
    Delete,
}

/// Entities the ownership predicate can decide over
pub trait Ownable {
    /// The ID of the owning user, if any
    fn owner(&self) -> Option<String>;

    /// Whether the entity is part of the validated set
    fn validated(&self) -> bool;
}

impl Ownable for Review {
    fn owner(&self) -> Option<String> {
        self.get_owner_id()
    }

    fn validated(&self) -> bool {
        self.get_validated()
    }
}

impl Ownable for Book {
    fn owner(&self) -> Option<String> {
        self.get_owner_id()
    }

    fn validated(&self) -> bool {
        self.get_validated()
    }
}

impl Ownable for Film {
    fn owner(&self) -> Option<String> {
        self.get_owner_id()
    }

    fn validated(&self) -> bool {
        self.get_validated()
    }
}

fn is_owner<T: Ownable>(principal: &Principal, entity: &T) -> bool {
    match (&principal.user_id, entity.owner()) {
        (Some(user_id), Some(owner_id)) => *user_id == owner_id,
        _ => false,
    }
}

/// Decides whether a principal may perform an action on an entity
///
/// Admins may do anything. Validated entities are viewable by everyone,
/// including anonymous callers. Owners may view, change, and delete their
/// own entities. Adding requires authentication; the entity argument does
/// not participate in that decision.
pub fn may<T: Ownable>(principal: &Principal, entity: &T, action: Action) -> bool {
    if principal.is_admin() {
        return true;
    }

    match action {
        Action::View => entity.validated() || is_owner(principal, entity),
        Action::Add => !principal.is_anonymous(),
        Action::Change | Action::Delete => is_owner(principal, entity),
    }
}

/// Decides whether a principal may create entities at all
pub fn may_add(principal: &Principal) -> bool {
    principal.is_admin() || !principal.is_anonymous()
}
