use std::sync::Arc;

use recipe_planner::models::Preferences;
use recipe_planner::profile::{ProfileChanges, ProfileError, ProfileService};
use recipe_planner::store::{MemoryStore, ProfileStore, StoreError};

fn service_for(store: Arc<MemoryStore>) -> ProfileService {
    ProfileService::new(store.clone(), store)
}

#[tokio::test]
async fn test_profile_is_none_before_first_save() {
    let service = service_for(Arc::new(MemoryStore::signed_in("u1")));

    assert_eq!(service.load_profile().await.unwrap(), None);
}

#[tokio::test]
async fn test_update_then_load_round_trips_fields() {
    let service = service_for(Arc::new(MemoryStore::signed_in("u1")));

    service
        .update_profile(ProfileChanges {
            name: Some("Asha".to_string()),
            avatar_url: Some("https://img.test/asha.png".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    service
        .update_profile(ProfileChanges {
            banner_url: Some("https://img.test/banner.png".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let profile = service.load_profile().await.unwrap().expect("saved profile");
    assert_eq!(profile.id, "u1");
    assert_eq!(profile.name, "Asha");
    assert_eq!(profile.avatar_url.as_deref(), Some("https://img.test/asha.png"));
    assert_eq!(profile.banner_url.as_deref(), Some("https://img.test/banner.png"));
    assert!(profile.updated_at.is_some());
    assert_eq!(profile.preferences, None);
}

#[tokio::test]
async fn test_complete_profile_saves_preferences() {
    let service = service_for(Arc::new(MemoryStore::signed_in("u1")));
    let preferences = Preferences {
        dietary_restrictions: vec!["vegetarian".to_string()],
        allergies: vec!["peanuts".to_string()],
        cuisine_preferences: vec!["Indian".to_string(), "Thai".to_string()],
    };

    service
        .complete_profile(
            ProfileChanges {
                name: Some("Ravi".to_string()),
                ..Default::default()
            },
            preferences.clone(),
        )
        .await
        .unwrap();

    let profile = service.load_profile().await.unwrap().unwrap();
    assert_eq!(profile.name, "Ravi");
    assert_eq!(profile.preferences, Some(preferences));
}

#[tokio::test]
async fn test_signed_out_user_cannot_edit_profile() {
    let store = Arc::new(MemoryStore::new());
    let service = service_for(store);

    let result = service
        .update_profile(ProfileChanges {
            name: Some("Nobody".to_string()),
            ..Default::default()
        })
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, ProfileError::Store(StoreError::Unauthenticated)));
    assert_eq!(err.notice(), "Please sign in to edit your profile");
}

#[tokio::test]
async fn test_rejected_save_reports_failure() {
    let store = Arc::new(MemoryStore::signed_in("u1"));
    store.set_reject_writes(true);
    let service = service_for(store);

    let err = service.update_profile(ProfileChanges::default()).await.unwrap_err();

    assert_eq!(err.notice(), "Failed to update profile");
    assert_eq!(service.load_profile().await.unwrap(), None);
}

#[tokio::test]
async fn test_sign_up_preferences_save_without_profile_fields() {
    let store = Arc::new(MemoryStore::signed_in("u1"));
    let service = service_for(store.clone());
    let preferences = Preferences {
        dietary_restrictions: vec!["Vegan".to_string()],
        allergies: Vec::new(),
        cuisine_preferences: vec!["Indian".to_string()],
    };

    service.save_preferences(preferences.clone()).await.unwrap();

    let saved = store.select_preferences("u1").await.unwrap().expect("preferences row");
    assert_eq!(saved.preferences, preferences);
    assert_eq!(service.load_profile().await.unwrap(), None);
}
