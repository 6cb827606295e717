use std::path::Path;

use car_customizer::{
    data_structures::{material::Material, scene_graph::SceneGraph},
    resources::{FsAssetStore, SceneLoader},
};
use serde_json::{Value, json};
use tempfile::TempDir;

/// A sedan with four wheels, a body, an unclassified windshield and a camera, as glTF JSON.
pub fn car_gltf() -> Value {
    let primitive = |material: usize| json!({ "attributes": { "POSITION": 0 }, "material": material });
    json!({
        "asset": { "version": "2.0", "generator": "fixture" },
        "scene": 0,
        "scenes": [{ "name": "Showroom", "nodes": [0] }],
        "nodes": [
            { "name": "Sedan", "children": [1, 2, 3, 4, 5, 6, 7] },
            { "name": "Wheel_FL", "mesh": 0, "translation": [0.8, 0.0, 1.3] },
            { "name": "Wheel_FR", "mesh": 0, "translation": [-0.8, 0.0, 1.3] },
            { "name": "Wheel_RL", "mesh": 0, "translation": [0.8, 0.0, -1.3] },
            { "name": "Wheel_RR", "mesh": 0, "translation": [-0.8, 0.0, -1.3] },
            { "name": "CarBody", "mesh": 1, "translation": [0.0, 0.5, 0.0] },
            { "name": "Windshield", "mesh": 2 },
            { "name": "MainCamera", "camera": 0 }
        ],
        "meshes": [
            { "name": "tire", "primitives": [primitive(0)] },
            { "name": "shell", "primitives": [primitive(1)] },
            { "name": "glass", "primitives": [primitive(2)] }
        ],
        "materials": [
            { "name": "rubber", "pbrMetallicRoughness": { "baseColorFactor": [0.02, 0.02, 0.02, 1.0], "metallicFactor": 0.0, "roughnessFactor": 0.9 } },
            { "name": "paint", "pbrMetallicRoughness": { "baseColorFactor": [1.0, 1.0, 1.0, 1.0], "metallicFactor": 0.5, "roughnessFactor": 0.5 } },
            { "name": "glass", "pbrMetallicRoughness": { "baseColorFactor": [0.5, 0.6, 0.7, 1.0], "metallicFactor": 0.0, "roughnessFactor": 0.05 } }
        ],
        "cameras": [{ "type": "perspective", "perspective": { "yfov": 0.8, "znear": 0.1 } }],
        "accessors": [
            { "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 1.0] }
        ]
    })
}

/// Wraps a glTF JSON document into a binary `.glb` container without a BIN chunk.
pub fn to_glb(document: &Value) -> Vec<u8> {
    let mut json = serde_json::to_vec(document).unwrap();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let total = 12 + 8 + json.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json);
    glb
}

pub fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, bytes).unwrap();
}

/// An asset directory holding `car.gltf` and `models/sedan.glb`, plus a loader reading from it.
pub fn car_assets() -> (TempDir, SceneLoader<FsAssetStore>) {
    let dir = tempfile::tempdir().unwrap();
    let document = car_gltf();
    write_fixture(dir.path(), "car.gltf", &serde_json::to_vec(&document).unwrap());
    write_fixture(dir.path(), "models/sedan.glb", &to_glb(&document));
    let loader = SceneLoader::new(FsAssetStore::new(dir.path()));
    (dir, loader)
}

pub fn material_of<'a>(graph: &'a SceneGraph, name: &str) -> &'a Material {
    let id = graph.find(name).unwrap();
    graph.node(id).unwrap().material().unwrap()
}
