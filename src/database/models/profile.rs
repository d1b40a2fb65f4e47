use serde::Serialize;
use sqlx::FromRow;

use crate::policy::Owned;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Profile {
    pub id: i64,
    /// Owning identity; not exposed over the API
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub bio: String,
}

impl Owned for Profile {
    fn owner_identity(&self) -> Option<i64> {
        Some(self.user_id)
    }
}

/// Registration payload: creates the identity and its profile together
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub email: String,
    pub name: String,
    pub bio: String,
    pub password_hash: String,
    pub is_staff: bool,
}

/// Fields to change on an existing profile; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub password_hash: Option<String>,
}

impl ProfileChanges {
    pub fn apply(&self, profile: &mut Profile) {
        if let Some(email) = &self.email {
            profile.email = email.clone();
        }
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(bio) = &self.bio {
            profile.bio = bio.clone();
        }
    }
}
