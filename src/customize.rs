//! Part classification and the customization pass.
//!
//! A pass is split in two: [`plan`] walks the graph and computes the edits a
//! [`CustomizationRequest`] implies without touching anything, and [`apply`]
//! writes those edits into the live graph. A pass that fails during planning
//! therefore leaves every node exactly as it was.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    color::Rgb,
    data_structures::scene_graph::{NodeId, SceneGraph},
    error::{Error, Result},
};

/// Vertical drop applied per unit of wheel scale above 1.0, keeping bigger wheels on the ground.
pub const WHEEL_DROP_PER_SCALE: f32 = -0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartKind {
    Wheel,
    Body,
    Unclassified,
}

/**
 * Classifies a node by its name.
 *
 * Matching is case-insensitive. `wheel`/`tire` win over the body keywords, so
 * `car_wheel` is a wheel and never double-matched as body through `car`.
 */
pub fn classify(name: &str) -> PartKind {
    let name = name.to_lowercase();
    if name.contains("wheel") || name.contains("tire") {
        PartKind::Wheel
    } else if name.contains("body")
        || name.contains("chassis")
        || (name.contains("car") && !name.contains("wheel"))
    {
        PartKind::Body
    } else {
        PartKind::Unclassified
    }
}

/// Vertical position of a wheel scaled by `scale`: `(scale - 1) * -0.1`.
pub fn wheel_offset_y(scale: f32) -> f32 {
    (scale - 1.0) * WHEEL_DROP_PER_SCALE
}

/// Body paint finish.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finish {
    #[default]
    Glossy,
    Matte,
}

impl Finish {
    pub fn metalness(self) -> f32 {
        match self {
            Finish::Glossy => 0.8,
            Finish::Matte => 0.1,
        }
    }

    pub fn roughness(self) -> f32 {
        match self {
            Finish::Glossy => 0.2,
            Finish::Matte => 0.7,
        }
    }
}

impl fmt::Display for Finish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Finish::Glossy => "glossy",
            Finish::Matte => "matte",
        })
    }
}

impl FromStr for Finish {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "glossy" => Ok(Finish::Glossy),
            "matte" => Ok(Finish::Matte),
            other => Err(Error::InvalidRequest(format!(
                "unknown finish '{other}', expected glossy or matte"
            ))),
        }
    }
}

/// The immutable input of one customization pass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomizationRequest {
    pub body_color: Rgb,
    pub wheel_color: Rgb,
    pub wheel_scale: f32,
    pub finish: Finish,
}

impl CustomizationRequest {
    /// Rejects non-finite or non-positive wheel scales.
    pub fn validate(&self) -> Result<()> {
        if !self.wheel_scale.is_finite() || self.wheel_scale <= 0.0 {
            return Err(Error::InvalidRequest(format!(
                "wheel scale must be a positive number, got {}",
                self.wheel_scale
            )));
        }
        Ok(())
    }

    pub fn with_body_color(self, body_color: Rgb) -> Self {
        Self { body_color, ..self }
    }

    pub fn with_wheel_color(self, wheel_color: Rgb) -> Self {
        Self { wheel_color, ..self }
    }

    pub fn with_wheel_scale(self, wheel_scale: f32) -> Self {
        Self { wheel_scale, ..self }
    }

    pub fn with_finish(self, finish: Finish) -> Self {
        Self { finish, ..self }
    }
}

impl Default for CustomizationRequest {
    fn default() -> Self {
        Self {
            body_color: Rgb::WHITE,
            wheel_color: Rgb::BLACK,
            wheel_scale: 1.0,
            finish: Finish::Glossy,
        }
    }
}

/// A single intended mutation, computed by [`plan`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edit {
    Wheel {
        color: Rgb,
        scale: f32,
        offset_y: f32,
    },
    Body {
        color: Rgb,
        metalness: f32,
        roughness: f32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeEdit {
    pub node: NodeId,
    pub edit: Edit,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub wheels: usize,
    pub bodies: usize,
    pub unclassified: usize,
}

/**
 * Computes the edits `request` implies for `graph` without mutating it.
 *
 * Every node is visited once. Only renderable nodes are classified; a
 * renderable node without a material fails the whole plan with
 * [`Error::MaterialMissing`].
 */
pub fn plan(graph: &SceneGraph, request: &CustomizationRequest) -> Result<Vec<NodeEdit>> {
    request.validate()?;
    let mut edits = Vec::new();
    for id in graph.traverse() {
        let Some(node) = graph.node(id) else {
            continue;
        };
        if !node.is_renderable() {
            continue;
        }
        if node.material().is_none() {
            return Err(Error::MaterialMissing(node.name.clone()));
        }
        let edit = match classify(&node.name) {
            PartKind::Wheel => Edit::Wheel {
                color: request.wheel_color,
                scale: request.wheel_scale,
                offset_y: wheel_offset_y(request.wheel_scale),
            },
            PartKind::Body => Edit::Body {
                color: request.body_color,
                metalness: request.finish.metalness(),
                roughness: request.finish.roughness(),
            },
            PartKind::Unclassified => continue,
        };
        edits.push(NodeEdit { node: id, edit });
    }
    Ok(edits)
}

/// Writes planned edits into the graph. Edits naming nodes outside the graph are skipped.
pub fn apply(graph: &mut SceneGraph, edits: &[NodeEdit]) -> PassSummary {
    let mut summary = PassSummary::default();
    for NodeEdit { node: id, edit } in edits {
        let Some(node) = graph.node_mut(*id) else {
            log::warn!("Skipping edit for node {} which is not part of the graph.", id.index());
            continue;
        };
        match *edit {
            Edit::Wheel {
                color,
                scale,
                offset_y,
            } => {
                if let Some(material) = node.material_mut() {
                    material.base_color = color;
                }
                node.transform.set_uniform_scale(scale);
                node.transform.position.y = offset_y;
                summary.wheels += 1;
            }
            Edit::Body {
                color,
                metalness,
                roughness,
            } => {
                if let Some(material) = node.material_mut() {
                    material.base_color = color;
                    material.set_metalness(metalness);
                    material.set_roughness(roughness);
                    material.request_update();
                }
                summary.bodies += 1;
            }
        }
    }
    summary
}

/// Runs a full pass: [`plan`] then [`apply`]. On error the graph is unchanged.
pub fn customize(graph: &mut SceneGraph, request: &CustomizationRequest) -> Result<PassSummary> {
    let edits = plan(graph, request)?;
    let mut summary = apply(graph, &edits);
    summary.unclassified = graph
        .traverse()
        .into_iter()
        .filter_map(|id| graph.node(id))
        .filter(|node| node.is_renderable() && classify(&node.name) == PartKind::Unclassified)
        .count();
    log::debug!(
        "Customized {}: {} wheel(s), {} body part(s), {} untouched",
        graph.source(),
        summary.wheels,
        summary.bodies,
        summary.unclassified
    );
    Ok(summary)
}
