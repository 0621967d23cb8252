//! Admin-only sign-in against the in-memory provider

use std::sync::Arc;
use std::time::Duration;
use storefront_core::test_utils::{seeded_store, MemoryAuth, DEMO_ADMIN, DEMO_CUSTOMER};
use storefront_core::{AuthProvider, AuthService, AuthState, MemoryStore, StorefrontError};

type Service = AuthService<MemoryAuth<Arc<MemoryStore>>, Arc<MemoryStore>>;

fn service() -> Service {
    let store = Arc::new(seeded_store().unwrap());
    AuthService::new(MemoryAuth::demo(Arc::clone(&store)), store)
        .with_profile_polling(3, Duration::from_millis(1))
}

#[tokio::test]
async fn test_admin_signs_in() {
    let auth = service();
    let admin = auth.sign_in(DEMO_ADMIN.0, DEMO_ADMIN.1).await.unwrap();
    assert_eq!(admin.id, "ADM-001");
    assert_eq!(admin.name.as_deref(), Some("Admin Tung Tung Sport"));

    let state = auth.state();
    assert!(state.is_authenticated);
    assert_eq!(state.user, Some(admin));

    auth.sign_out().await.unwrap();
    assert_eq!(auth.state(), AuthState::default());
    assert_eq!(auth.provider().sign_out_count(), 1);
}

#[tokio::test]
async fn test_customer_is_turned_away() {
    let auth = service();
    let result = auth.sign_in(DEMO_CUSTOMER.0, DEMO_CUSTOMER.1).await;
    assert!(matches!(result, Err(StorefrontError::Unauthorized { .. })));
    assert!(!auth.state().is_authenticated);
    assert_eq!(auth.provider().sign_out_count(), 1);
    assert!(auth.provider().session().is_none());
}

#[tokio::test]
async fn test_bad_credentials() {
    let auth = service();
    assert!(matches!(
        auth.sign_in(DEMO_ADMIN.0, "wrong-password").await,
        Err(StorefrontError::Unauthorized { .. })
    ));
    assert!(matches!(
        auth.sign_in("  ", DEMO_ADMIN.1).await,
        Err(StorefrontError::Validation { .. })
    ));
    assert_eq!(auth.provider().sign_out_count(), 0);
}

#[tokio::test]
async fn test_restore_existing_sessions() {
    let auth = service();
    assert_eq!(auth.restore().await.unwrap(), AuthState::default());

    auth.provider()
        .sign_in(DEMO_ADMIN.0, DEMO_ADMIN.1)
        .await
        .unwrap();
    assert!(auth.restore().await.unwrap().is_authenticated);

    auth.provider()
        .sign_in(DEMO_CUSTOMER.0, DEMO_CUSTOMER.1)
        .await
        .unwrap();
    let state = auth.restore().await.unwrap();
    assert!(!state.is_authenticated);
    assert!(auth.provider().session().is_none());
}

#[tokio::test]
async fn test_sign_up_waits_for_the_profile() {
    let auth = service();
    let admin = auth
        .sign_up("rina@tungtungsport.com", "rahasia", "Rina Melati")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(admin.email, "rina@tungtungsport.com");
    assert_eq!(admin.role, "admin");
    assert!(auth.state().is_authenticated);
}

#[tokio::test]
async fn test_sign_up_gives_up_without_a_profile() {
    // The provider writes profiles to a store the service never reads
    let provider = MemoryAuth::new(Arc::new(MemoryStore::new()));
    let auth = AuthService::new(provider, Arc::new(seeded_store().unwrap()))
        .with_profile_polling(2, Duration::from_millis(1));
    let result = auth
        .sign_up("late@tungtungsport.com", "rahasia", "Late Admin")
        .await
        .unwrap();
    assert!(result.is_none());
    assert!(!auth.state().is_authenticated);
}

#[tokio::test]
async fn test_sign_up_validation() {
    let auth = service();
    assert!(matches!(
        auth.sign_up("new@tungtungsport.com", "12345", "New Admin").await,
        Err(StorefrontError::Validation { .. })
    ));
    assert!(matches!(
        auth.sign_up("new@tungtungsport.com", "123456", " ").await,
        Err(StorefrontError::Validation { .. })
    ));
    assert!(matches!(
        auth.sign_up(DEMO_ADMIN.0, "123456", "Again").await,
        Err(StorefrontError::Validation { .. })
    ));
}
