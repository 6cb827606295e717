use car_customizer::{
    CustomizationRequest, CustomizationSession, Error, Finish, Rgb, SessionState,
    customize::wheel_offset_y,
};

use crate::common::test_utils::{car_assets, material_of};

mod common;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[tokio::test]
async fn loads_and_applies_defaults() {
    let (_dir, loader) = car_assets();
    let mut session = CustomizationSession::default();

    let summary = session.load(&loader, "car.gltf").await.unwrap();
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!((summary.wheels, summary.bodies, summary.unclassified), (4, 1, 1));

    let graph = session.graph().unwrap();
    assert_eq!(graph.node(graph.root()).unwrap().name, "Sedan");
    assert_eq!(material_of(graph, "Wheel_RR").base_color, Rgb::BLACK);
    assert_eq!(material_of(graph, "CarBody").base_color, Rgb::WHITE);
}

#[tokio::test]
async fn binary_and_json_assets_load_identically() {
    let (_dir, loader) = car_assets();
    let json = loader.load("car.gltf").await.unwrap();
    let binary = loader.load("models/sedan.glb").await.unwrap();
    assert_eq!(json.len(), binary.len());
    let names = |graph: &car_customizer::data_structures::scene_graph::SceneGraph| {
        graph
            .traverse()
            .into_iter()
            .map(|id| graph.node(id).unwrap().name.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(names(&json), names(&binary));
}

#[tokio::test]
async fn wheels_are_recolored_scaled_and_dropped() {
    let (_dir, loader) = car_assets();
    let mut session = CustomizationSession::default();
    session.load(&loader, "car.gltf").await.unwrap();

    session
        .customize(
            CustomizationRequest::default()
                .with_wheel_color(Rgb::from_hex("#000000").unwrap())
                .with_wheel_scale(1.2),
        )
        .unwrap();

    let graph = session.graph().unwrap();
    let wheel = graph.node(graph.find("Wheel_FL").unwrap()).unwrap();
    assert_eq!(wheel.material().unwrap().base_color, Rgb::BLACK);
    assert_eq!(wheel.transform.scale, cgmath::Vector3::new(1.2, 1.2, 1.2));
    assert!(close(wheel.transform.position.y, -0.02));
    assert!(close(wheel.transform.position.y, wheel_offset_y(1.2)));
    // only y is driven by the pass
    assert_eq!(wheel.transform.position.x, 0.8);
    assert!(!wheel.material().unwrap().needs_update());
}

#[tokio::test]
async fn body_gets_color_and_finish() {
    let (_dir, loader) = car_assets();
    let mut session = CustomizationSession::default();
    session.load(&loader, "car.gltf").await.unwrap();
    session.graph_mut().unwrap().mark_uploaded();

    session
        .customize(
            CustomizationRequest::default()
                .with_body_color("#ff0000".parse().unwrap())
                .with_finish(Finish::Matte),
        )
        .unwrap();

    let graph = session.graph().unwrap();
    let body = material_of(graph, "CarBody");
    assert_eq!(body.base_color, Rgb::new(255, 0, 0));
    assert!(close(body.metalness(), 0.1));
    assert!(close(body.roughness(), 0.7));
    assert!(body.needs_update());
    assert_eq!(graph.dirty_materials(), vec![graph.find("CarBody").unwrap()]);
}

#[tokio::test]
async fn unmatched_parts_are_untouched() {
    let (_dir, loader) = car_assets();
    let mut session = CustomizationSession::default();
    session.load(&loader, "car.gltf").await.unwrap();
    let before = session.graph().unwrap().clone();
    let windshield = before.find("Windshield").unwrap();

    session
        .customize(CustomizationRequest {
            body_color: Rgb::new(1, 2, 3),
            wheel_color: Rgb::new(4, 5, 6),
            wheel_scale: 0.5,
            finish: Finish::Matte,
        })
        .unwrap();

    let after = session.graph().unwrap();
    assert_eq!(after.node(windshield), before.node(windshield));
    let camera = after.find("MainCamera").unwrap();
    assert_eq!(after.node(camera), before.node(camera));
}

#[tokio::test]
async fn missing_asset_fails_the_load() {
    let (_dir, loader) = car_assets();
    let mut session = CustomizationSession::default();

    let err = session.load(&loader, "models/nope.glb").await.unwrap_err();
    assert!(matches!(err, Error::AssetNotFound(ref reference) if reference == "models/nope.glb"));
    assert_eq!(session.state(), SessionState::LoadFailed);
    assert!(session.graph().is_none());
    assert!(session.failure().unwrap().contains("nope.glb"));
}

#[tokio::test]
async fn corrupt_asset_fails_the_load() {
    let (dir, loader) = car_assets();
    common::test_utils::write_fixture(dir.path(), "broken.glb", b"glTF not really");
    let mut session = CustomizationSession::default();

    let err = session.load(&loader, "broken.glb").await.unwrap_err();
    assert!(matches!(err, Error::AssetParseError { .. }));
    assert_eq!(session.state(), SessionState::LoadFailed);

    session.load(&loader, "car.gltf").await.unwrap();
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn rapid_requests_keep_only_the_last() {
    let (_dir, loader) = car_assets();
    let mut session = CustomizationSession::default();
    session.load(&loader, "car.gltf").await.unwrap();

    session
        .submit(CustomizationRequest::default().with_wheel_scale(1.0))
        .unwrap();
    session
        .submit(CustomizationRequest::default().with_wheel_scale(1.2))
        .unwrap();
    session.flush().unwrap();

    let graph = session.graph().unwrap();
    for name in ["Wheel_FL", "Wheel_FR", "Wheel_RL", "Wheel_RR"] {
        let wheel = graph.node(graph.find(name).unwrap()).unwrap();
        assert_eq!(wheel.transform.scale.y, 1.2, "{name}");
        assert!(close(wheel.transform.position.y, -0.02), "{name}");
    }
}

#[tokio::test]
async fn switching_models_discards_the_older_load() {
    let (_dir, loader) = car_assets();
    let mut session = CustomizationSession::default();

    let first = session.select_asset("car.gltf");
    let second = session.select_asset("models/sedan.glb");
    let first_result = loader.load(first.reference()).await;
    let second_result = loader.load(second.reference()).await;

    assert!(matches!(
        session.complete_load(first, first_result),
        Err(Error::LoadSuperseded(_))
    ));
    session.complete_load(second, second_result).unwrap();
    assert_eq!(session.graph().unwrap().source(), "models/sedan.glb");
    assert_eq!(session.model_id(), Some("sedan.glb"));
}

#[tokio::test]
async fn repeated_requests_are_idempotent() {
    let (_dir, loader) = car_assets();
    let mut session = CustomizationSession::default();
    session.load(&loader, "car.gltf").await.unwrap();
    let request = CustomizationRequest::default()
        .with_wheel_scale(0.8)
        .with_body_color(Rgb::new(30, 41, 59));

    session.customize(request).unwrap();
    let once = session.graph().unwrap().clone();
    session.customize(request).unwrap();
    assert_eq!(session.graph().unwrap(), &once);
}

#[tokio::test]
async fn gallery_prefetch_keeps_order_and_isolates_failures() {
    let (_dir, loader) = car_assets();
    let results = loader
        .load_many(["models/sedan.glb", "missing.glb", "car.gltf"])
        .await;
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().source(), "models/sedan.glb");
    assert!(matches!(results[1], Err(Error::AssetNotFound(_))));
    assert_eq!(results[2].as_ref().unwrap().source(), "car.gltf");
}
