use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::models::{Preferences, UserProfile};
use crate::store::{require_user, Identity, PreferencesRow, ProfileRow, ProfileStore, StoreError};

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ProfileError {
    pub fn notice(&self) -> &'static str {
        match self {
            ProfileError::Store(StoreError::Unauthenticated) => "Please sign in to edit your profile",
            ProfileError::Store(_) => "Failed to update profile",
        }
    }
}

/// Editable profile fields. `None` leaves the stored value as it was.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
}

pub struct ProfileService {
    identity: Arc<dyn Identity>,
    store: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(identity: Arc<dyn Identity>, store: Arc<dyn ProfileStore>) -> Self {
        Self { identity, store }
    }

    /// The signed-in user's profile, `None` if they have not saved one yet.
    pub async fn load_profile(&self) -> Result<Option<UserProfile>, ProfileError> {
        let user = require_user(self.identity.as_ref()).await?;
        let (profile, preferences) = tokio::try_join!(
            self.store.select_profile(&user.id),
            self.store.select_preferences(&user.id),
        )?;

        Ok(profile.map(|row| UserProfile {
            id: row.id,
            name: row.name.unwrap_or_default(),
            avatar_url: row.avatar_url,
            banner_url: row.banner_url,
            updated_at: row.updated_at,
            preferences: preferences.map(|p| p.preferences),
        }))
    }

    pub async fn update_profile(&self, changes: ProfileChanges) -> Result<(), ProfileError> {
        let user = require_user(self.identity.as_ref()).await?;
        let current = self.store.select_profile(&user.id).await?;

        let row = merge_changes(&user.id, current, changes);
        self.store.upsert_profile(&row).await?;
        info!(user_id = %user.id, "profile updated");
        Ok(())
    }

    /// Saves the profile and the preference bundle together; this is the
    /// "complete profile" action.
    pub async fn complete_profile(
        &self,
        changes: ProfileChanges,
        preferences: Preferences,
    ) -> Result<(), ProfileError> {
        self.update_profile(changes).await?;
        self.save_preferences(preferences).await
    }

    /// Stores the preference bundle on its own, as sign-up does.
    pub async fn save_preferences(&self, preferences: Preferences) -> Result<(), ProfileError> {
        let user = require_user(self.identity.as_ref()).await?;
        self.store
            .upsert_preferences(&PreferencesRow {
                user_id: user.id.clone(),
                preferences,
            })
            .await?;
        info!(user_id = %user.id, "preferences saved");
        Ok(())
    }
}

fn merge_changes(user_id: &str, current: Option<ProfileRow>, changes: ProfileChanges) -> ProfileRow {
    let current = current.unwrap_or_else(|| ProfileRow {
        id: user_id.to_string(),
        name: None,
        avatar_url: None,
        banner_url: None,
        updated_at: None,
    });

    ProfileRow {
        id: user_id.to_string(),
        name: changes.name.or(current.name),
        avatar_url: changes.avatar_url.or(current.avatar_url),
        banner_url: changes.banner_url.or(current.banner_url),
        updated_at: Some(Utc::now()),
    }
}
