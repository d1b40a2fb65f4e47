use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::policy::Owned;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct FeedItem {
    pub id: i64,
    /// Owning profile, assigned once at creation
    pub user_profile: i64,
    pub status_text: String,
    pub created_on: DateTime<Utc>,
    /// Identity behind `user_profile`, resolved by the store
    #[serde(skip_serializing)]
    pub owner_id: Option<i64>,
}

impl Owned for FeedItem {
    fn owner_identity(&self) -> Option<i64> {
        self.owner_id
    }
}
