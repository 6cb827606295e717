use car_customizer::{
    CustomizationRequest, CustomizationSession, Error, Finish, Rgb,
    store::{ConfigurationStore, Identity, MemoryConfigurationStore, User},
};

use crate::common::test_utils::{car_assets, material_of};

mod common;

fn bob() -> User {
    User::Authenticated(Identity {
        id: "user_42".to_string(),
        email: Some("bob@example.com".to_string()),
        display_name: None,
    })
}

#[tokio::test]
async fn saves_the_applied_request() {
    let (_dir, loader) = car_assets();
    let store = MemoryConfigurationStore::new();
    let mut session = CustomizationSession::default();
    session.load(&loader, "models/sedan.glb").await.unwrap();
    let request = CustomizationRequest::default()
        .with_body_color(Rgb::new(200, 0, 0))
        .with_finish(Finish::Matte);
    session.customize(request).unwrap();

    let id = session.save(&bob(), &store).await.unwrap();
    let saved = store.get(&id).unwrap();
    assert_eq!(saved.model_id, "sedan.glb");
    assert_eq!(saved.user_id, "user_42");
    assert_eq!(saved.user_email.as_deref(), Some("bob@example.com"));
    assert_eq!(saved.request(), request);
}

#[tokio::test]
async fn anonymous_users_cannot_save() {
    let (_dir, loader) = car_assets();
    let store = MemoryConfigurationStore::new();
    let mut session = CustomizationSession::default();
    session.load(&loader, "car.gltf").await.unwrap();

    assert!(matches!(
        session.save(&User::Anonymous, &store).await,
        Err(Error::AnonymousUser)
    ));
    assert!(store.is_empty());
}

#[tokio::test]
async fn nothing_to_save_before_a_model_is_ready() {
    let store = MemoryConfigurationStore::new();
    let session = CustomizationSession::default();
    assert!(matches!(session.save(&bob(), &store).await, Err(Error::NotReady)));
}

#[tokio::test]
async fn restores_the_latest_saved_configuration() {
    let (_dir, loader) = car_assets();
    let store = MemoryConfigurationStore::new();

    let mut first = CustomizationSession::default();
    first.load(&loader, "car.gltf").await.unwrap();
    first
        .customize(CustomizationRequest::default().with_wheel_scale(0.9))
        .unwrap();
    first.save(&bob(), &store).await.unwrap();
    // equal timestamps fall back to insertion order
    first
        .customize(
            CustomizationRequest::default()
                .with_wheel_scale(1.1)
                .with_wheel_color(Rgb::new(120, 120, 120)),
        )
        .unwrap();
    first.save(&bob(), &store).await.unwrap();
    assert_eq!(store.list("car.gltf", true, 10).await.unwrap().len(), 2);

    let mut second = CustomizationSession::default();
    second.load(&loader, "car.gltf").await.unwrap();
    let summary = second.restore_latest(&store).await.unwrap().unwrap();
    assert_eq!(summary.wheels, 4);
    assert_eq!(second.request().wheel_scale, 1.1);
    let graph = second.graph().unwrap();
    assert_eq!(material_of(graph, "Wheel_FR").base_color, Rgb::new(120, 120, 120));
}

#[tokio::test]
async fn restore_without_history_changes_nothing() {
    let (_dir, loader) = car_assets();
    let store = MemoryConfigurationStore::new();
    let mut session = CustomizationSession::default();
    session.load(&loader, "car.gltf").await.unwrap();
    let before = session.graph().cloned();

    assert_eq!(session.restore_latest(&store).await.unwrap(), None);
    assert_eq!(session.graph().cloned(), before);
}
