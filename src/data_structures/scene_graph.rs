//! Scene graph and hierarchical scene organization.
//!
//! The graph is an arena: every node lives in one `Vec` owned by the
//! [`SceneGraph`] and refers to its parent and children by [`NodeId`]. Nodes
//! are only ever appended, so an id handed out by a graph stays valid for that
//! graph's lifetime.

use std::collections::HashMap;

use log::warn;

use crate::data_structures::{material::Material, transform::Transform};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node carries besides its transform.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Drawable geometry. The material is only `None` for hand-built graphs;
    /// the loader always attaches one.
    Mesh(Option<Material>),
    /// Pure grouping node (glTF node without a mesh).
    Group,
    /// Anything else the renderer carries along but never draws (cameras, lights).
    Other,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transform: Transform::default(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, material: Material) -> Self {
        Self::new(name, NodeKind::Mesh(Some(material)))
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn is_renderable(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh(_))
    }

    pub fn material(&self) -> Option<&Material> {
        match &self.kind {
            NodeKind::Mesh(material) => material.as_ref(),
            _ => None,
        }
    }

    pub fn material_mut(&mut self) -> Option<&mut Material> {
        match &mut self.kind {
            NodeKind::Mesh(material) => material.as_mut(),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A loaded scene: a tree of nodes rooted at a single node.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneGraph {
    source: String,
    nodes: Vec<SceneNode>,
    root: NodeId,
}

impl SceneGraph {
    /// Creates a graph holding only `root`. `source` is the asset reference it was loaded from.
    pub fn new(source: impl Into<String>, mut root: SceneNode) -> Self {
        root.parent = None;
        root.children.clear();
        Self {
            source: source.into(),
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /**
     * Appends `node` as the last child of `parent`.
     *
     * Returns `None` (and leaves the graph untouched) if `parent` does not belong to this graph.
     */
    pub fn add_child(&mut self, parent: NodeId, mut node: SceneNode) -> Option<NodeId> {
        if parent.0 >= self.nodes.len() {
            warn!(
                "You tried to attach '{}' to node {}, but the graph only has {} nodes.",
                node.name,
                parent.0,
                self.nodes.len()
            );
            return None;
        }
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        Some(id)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a graph has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    /// Depth-first, pre-order walk from the root in document order. Every node appears exactly once.
    pub fn traverse(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        order
    }

    /// First node (in traversal order) whose name matches case-insensitively.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.traverse()
            .into_iter()
            .find(|id| self.nodes[id.0].name.eq_ignore_ascii_case(name))
    }

    /// World transform of every node, composed parent-first from the root.
    pub fn world_transforms(&self) -> HashMap<NodeId, Transform> {
        let mut world = HashMap::with_capacity(self.nodes.len());
        for id in self.traverse() {
            let node = &self.nodes[id.0];
            let transform = match node.parent.and_then(|p| world.get(&p)) {
                Some(parent) => parent * &node.transform,
                None => node.transform,
            };
            world.insert(id, transform);
        }
        world
    }

    /// Nodes whose material still has to be uploaded.
    pub fn dirty_materials(&self) -> Vec<NodeId> {
        self.traverse()
            .into_iter()
            .filter(|id| {
                self.nodes[id.0]
                    .material()
                    .is_some_and(Material::needs_update)
            })
            .collect()
    }

    /// Acknowledges all pending material uploads.
    pub fn mark_uploaded(&mut self) {
        self.nodes
            .iter_mut()
            .filter_map(SceneNode::material_mut)
            .for_each(Material::mark_uploaded);
    }
}
