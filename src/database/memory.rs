//! In-memory store.
//!
//! All tables live behind one `tokio::sync::RwLock`, so multi-table writes
//! (registration, profile deletion) are atomic. State is lost on restart; the
//! server uses this backend when no `DATABASE_URL` is configured.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{
    CredentialStore, FeedItem, FeedStore, NewProfile, Profile, ProfileChanges, ProfileStore,
    SearchQuery, Store, StoreError, StoreResult, User,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    profiles: BTreeMap<i64, Profile>,
    feed_items: BTreeMap<i64, FeedItem>,
    last_user_id: i64,
    last_profile_id: i64,
    last_feed_item_id: i64,
}

impl Tables {
    fn email_taken(&self, email: &str, except_user: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email) && Some(u.id) != except_user)
    }

    /// Fill in the owning identity from the profile table
    fn resolve_owner(&self, mut item: FeedItem) -> FeedItem {
        item.owner_id = self.profiles.get(&item.user_profile).map(|p| p.user_id);
        item
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn list_profiles(&self, search: &SearchQuery) -> StoreResult<Vec<Profile>> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .values()
            .filter(|p| search.matches(&[p.name.as_str(), p.email.as_str()]))
            .cloned()
            .collect())
    }

    async fn find_profile_by_id(&self, id: i64) -> StoreResult<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(&id).cloned())
    }

    async fn find_profile_by_user(&self, user_id: i64) -> StoreResult<Option<Profile>> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.values().find(|p| p.user_id == user_id).cloned())
    }

    async fn create_profile(&self, new: NewProfile) -> StoreResult<Profile> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&new.email, None) {
            return Err(StoreError::duplicate_email());
        }

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            email: new.email.clone(),
            name: new.name.clone(),
            password_hash: new.password_hash,
            is_staff: new.is_staff,
            is_active: true,
        };

        tables.last_profile_id += 1;
        let profile = Profile {
            id: tables.last_profile_id,
            user_id: user.id,
            email: new.email,
            name: new.name,
            bio: new.bio,
        };

        tables.users.insert(user.id, user);
        tables.profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn save_profile(&self, id: i64, changes: ProfileChanges) -> StoreResult<Profile> {
        let mut tables = self.tables.write().await;
        let mut profile = tables
            .profiles
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", id)))?;

        if let Some(email) = &changes.email {
            if tables.email_taken(email, Some(profile.user_id)) {
                return Err(StoreError::duplicate_email());
            }
        }

        changes.apply(&mut profile);
        if let Some(user) = tables.users.get_mut(&profile.user_id) {
            user.email = profile.email.clone();
            user.name = profile.name.clone();
            if let Some(hash) = changes.password_hash {
                user.password_hash = hash;
            }
        }
        tables.profiles.insert(id, profile.clone());
        Ok(profile)
    }

    async fn delete_profile_by_id(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let profile = tables
            .profiles
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", id)))?;

        tables.feed_items.retain(|_, item| item.user_profile != id);
        if let Some(user) = tables.users.get_mut(&profile.user_id) {
            user.is_active = false;
        }
        Ok(())
    }
}

#[async_trait]
impl FeedStore for InMemoryStore {
    async fn list_feed_items(&self) -> StoreResult<Vec<FeedItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .feed_items
            .values()
            .cloned()
            .map(|item| tables.resolve_owner(item))
            .collect())
    }

    async fn find_feed_item_by_id(&self, id: i64) -> StoreResult<Option<FeedItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .feed_items
            .get(&id)
            .cloned()
            .map(|item| tables.resolve_owner(item)))
    }

    async fn create_feed_item(&self, user_profile: i64, status_text: String) -> StoreResult<FeedItem> {
        let mut tables = self.tables.write().await;
        if !tables.profiles.contains_key(&user_profile) {
            return Err(StoreError::NotFound(format!("profile {}", user_profile)));
        }

        tables.last_feed_item_id += 1;
        let item = FeedItem {
            id: tables.last_feed_item_id,
            user_profile,
            status_text,
            created_on: Utc::now(),
            owner_id: None,
        };
        tables.feed_items.insert(item.id, item.clone());
        Ok(tables.resolve_owner(item))
    }

    async fn save_feed_item(&self, id: i64, status_text: String) -> StoreResult<FeedItem> {
        let mut tables = self.tables.write().await;
        let item = tables
            .feed_items
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("feed item {}", id)))?;
        item.status_text = status_text;
        let item = item.clone();
        Ok(tables.resolve_owner(item))
    }

    async fn delete_feed_item_by_id(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .feed_items
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("feed item {}", id)))
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
