//! Object-level authorization.
//!
//! Every decision is made against a single target record and the requester
//! resolved by the authentication middleware. Decisions are pure and
//! fail-closed: a target without a resolvable owner is never writable.

use crate::types::Action;

/// An authenticated caller, as resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub email: String,
    /// The caller's own profile, if one exists
    pub profile_id: Option<i64>,
    pub is_staff: bool,
}

/// Who is making the request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Requester {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl Requester {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Requester::Authenticated(identity) => Some(identity),
            Requester::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }

    fn and(self, other: Decision) -> Decision {
        if self.is_allowed() && other.is_allowed() {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// Records that belong to an identity.
pub trait Owned {
    /// Id of the owning identity, `None` when it cannot be resolved.
    fn owner_identity(&self) -> Option<i64>;
}

/// A permission check evaluated per request against one target.
pub trait Policy<T: ?Sized> {
    fn authorize(&self, requester: &Requester, target: &T, action: Action) -> Decision;
}

/// Reads are open to everyone; writes only to the owning identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerOrReadOnly;

impl<T: Owned + ?Sized> Policy<T> for OwnerOrReadOnly {
    fn authorize(&self, requester: &Requester, target: &T, action: Action) -> Decision {
        if action.is_read() {
            return Decision::Allow;
        }

        match (requester.identity(), target.owner_identity()) {
            (Some(identity), Some(owner)) => Decision::from(identity.user_id == owner),
            _ => Decision::Deny,
        }
    }
}

/// Rejects anonymous requesters for every action.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsAuthenticated;

impl<T: ?Sized> Policy<T> for IsAuthenticated {
    fn authorize(&self, requester: &Requester, _target: &T, _action: Action) -> Decision {
        Decision::from(requester.is_authenticated())
    }
}

/// Logical AND of two policies.
#[derive(Debug, Clone, Copy, Default)]
pub struct Both<A, B>(pub A, pub B);

impl<T: ?Sized, A: Policy<T>, B: Policy<T>> Policy<T> for Both<A, B> {
    fn authorize(&self, requester: &Requester, target: &T, action: Action) -> Decision {
        self.0
            .authorize(requester, target, action)
            .and(self.1.authorize(requester, target, action))
    }
}

pub type ProfilePolicy = OwnerOrReadOnly;

pub type FeedItemPolicy = Both<OwnerOrReadOnly, IsAuthenticated>;

pub fn authorize_profile<T: Owned + ?Sized>(requester: &Requester, profile: &T, action: Action) -> Decision {
    ProfilePolicy::default().authorize(requester, profile, action)
}

pub fn authorize_feed_item<T: Owned + ?Sized>(requester: &Requester, item: &T, action: Action) -> Decision {
    FeedItemPolicy::default().authorize(requester, item, action)
}
