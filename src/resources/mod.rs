use std::collections::HashSet;

use log::{info, warn};

use crate::{
    color::Rgb,
    data_structures::{
        material::Material,
        scene_graph::{NodeId, NodeKind, SceneGraph, SceneNode},
        transform::Transform,
    },
    error::{Error, Result},
};

/**
 * This module contains all logic for loading scene graphs from external files.
 */
pub mod asset;

pub use asset::{AssetStore, HttpAssetStore, file_id_from_path};
#[cfg(not(target_arch = "wasm32"))]
pub use asset::FsAssetStore;

/// Fetches assets from an [`AssetStore`] and parses them into scene graphs.
///
/// Loading the same reference twice yields two equal, independent graphs.
#[derive(Clone, Debug)]
pub struct SceneLoader<S> {
    store: S,
}

impl<S: AssetStore> SceneLoader<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn load(&self, reference: &str) -> Result<SceneGraph> {
        info!("Loading scene {reference}");
        let bytes = self.store.fetch(reference).await?;
        parse_scene(reference, &bytes)
    }

    /// Loads several assets concurrently, e.g. to prefetch a model gallery. Results keep the input order.
    pub async fn load_many<'a, I>(&self, references: I) -> Vec<Result<SceneGraph>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        futures::future::join_all(references.into_iter().map(|reference| self.load(reference))).await
    }
}

/**
 * Parses a glTF 2.0 asset (binary `.glb` or JSON `.gltf`) into a scene graph.
 *
 * Only the node hierarchy, names, transforms and base materials are read;
 * geometry buffers are left to the renderer. A scene with a single top-level
 * node is rooted at that node, otherwise a group root named after the scene
 * holds all top-level nodes.
 */
pub fn parse_scene(reference: &str, bytes: &[u8]) -> Result<SceneGraph> {
    if bytes.is_empty() {
        return Err(Error::AssetEmpty(reference.to_string()));
    }
    let gltf = gltf::Gltf::from_slice(bytes).map_err(|e| Error::AssetParseError {
        reference: reference.to_string(),
        reason: e.to_string(),
    })?;

    let Some(scene) = gltf.default_scene().or_else(|| gltf.scenes().next()) else {
        return Err(Error::AssetEmpty(reference.to_string()));
    };
    let top_level: Vec<gltf::Node> = scene.nodes().collect();
    let mut walk = HierarchyWalk::new(reference);

    let graph = match top_level.as_slice() {
        [] => return Err(Error::AssetEmpty(reference.to_string())),
        [single] => {
            walk.visit(single)?;
            let mut graph = SceneGraph::new(reference, to_scene_node(single));
            let root = graph.root();
            walk.attach_contents(&mut graph, root, single)?;
            graph
        }
        nodes => {
            let name = scene.name().unwrap_or("Scene");
            let mut graph = SceneGraph::new(reference, SceneNode::group(name));
            let root = graph.root();
            for node in nodes {
                walk.attach(&mut graph, root, node)?;
            }
            graph
        }
    };
    let scene_count = gltf.scenes().count();
    if scene_count > 1 {
        warn!(
            "{reference} holds {scene_count} scenes, only '{}' was loaded.",
            scene.name().unwrap_or("default")
        );
    }
    info!("Loaded {reference}: {} nodes", graph.len());
    Ok(graph)
}

/// Depth-first copy of the glTF node tree. Every glTF node may be reached once;
/// reaching one again means a cycle or a node with two parents.
struct HierarchyWalk<'a> {
    reference: &'a str,
    visited: HashSet<usize>,
}

impl<'a> HierarchyWalk<'a> {
    fn new(reference: &'a str) -> Self {
        Self {
            reference,
            visited: HashSet::new(),
        }
    }

    fn visit(&mut self, node: &gltf::Node) -> Result<()> {
        if self.visited.insert(node.index()) {
            return Ok(());
        }
        Err(Error::AssetParseError {
            reference: self.reference.to_string(),
            reason: format!(
                "node hierarchy contains a cycle or shared node ({} reached twice)",
                node.index()
            ),
        })
    }

    fn attach(&mut self, graph: &mut SceneGraph, parent: NodeId, node: &gltf::Node) -> Result<()> {
        self.visit(node)?;
        match graph.add_child(parent, to_scene_node(node)) {
            Some(id) => self.attach_contents(graph, id, node),
            None => Ok(()),
        }
    }

    /// Adds one mesh child per primitive for multi-primitive meshes, then recurses into the glTF children.
    fn attach_contents(
        &mut self,
        graph: &mut SceneGraph,
        id: NodeId,
        node: &gltf::Node,
    ) -> Result<()> {
        if let Some(mesh) = node.mesh() {
            if mesh.primitives().count() > 1 {
                let name = node_name(node);
                for (idx, primitive) in mesh.primitives().enumerate() {
                    graph.add_child(
                        id,
                        SceneNode::mesh(format!("{name}_{idx}"), to_material(&primitive.material())),
                    );
                }
            }
        }
        for child in node.children() {
            self.attach(graph, id, &child)?;
        }
        Ok(())
    }
}

fn to_scene_node(node: &gltf::Node) -> SceneNode {
    let kind = match node.mesh() {
        Some(mesh) if mesh.primitives().count() == 1 => {
            let material = mesh
                .primitives()
                .next()
                .map(|primitive| to_material(&primitive.material()));
            NodeKind::Mesh(material)
        }
        Some(_) => NodeKind::Group,
        None if node.camera().is_some() => NodeKind::Other,
        None => NodeKind::Group,
    };
    SceneNode::new(node_name(node), kind)
        .with_transform(Transform::from_decomposed(node.transform().decomposed()))
}

/// The node's own name, falling back to its mesh name, then to its index.
fn node_name(node: &gltf::Node) -> String {
    node.name()
        .or_else(|| node.mesh().and_then(|mesh| mesh.name()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()))
}

fn to_material(material: &gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, _] = pbr.base_color_factor();
    let name = match (material.name(), material.index()) {
        (Some(name), _) => name.to_string(),
        (None, Some(idx)) => format!("material_{idx}"),
        (None, None) => "default".to_string(),
    };
    Material::new(
        name,
        Rgb::from_linear([r, g, b]),
        pbr.metallic_factor(),
        pbr.roughness_factor(),
    )
}
