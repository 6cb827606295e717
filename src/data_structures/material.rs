use crate::color::Rgb;

/// Surface appearance attached to a renderable node.
///
/// Metalness and roughness are kept in `[0, 1]` by the setters. `needs_update`
/// marks the material for re-upload on the next rendered frame; the renderer
/// acknowledges it with [`Material::mark_uploaded`].
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color: Rgb,
    metalness: f32,
    roughness: f32,
    needs_update: bool,
}

impl Material {
    pub fn new(name: impl Into<String>, base_color: Rgb, metalness: f32, roughness: f32) -> Self {
        Self {
            name: name.into(),
            base_color,
            metalness: unit(metalness),
            roughness: unit(roughness),
            needs_update: false,
        }
    }

    pub fn metalness(&self) -> f32 {
        self.metalness
    }

    pub fn roughness(&self) -> f32 {
        self.roughness
    }

    pub fn set_metalness(&mut self, metalness: f32) {
        self.metalness = unit(metalness);
    }

    pub fn set_roughness(&mut self, roughness: f32) {
        self.roughness = unit(roughness);
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    pub fn request_update(&mut self) {
        self.needs_update = true;
    }

    pub fn mark_uploaded(&mut self) {
        self.needs_update = false;
    }
}

impl Default for Material {
    /// glTF's default material: white, fully metallic, fully rough.
    fn default() -> Self {
        Self::new("default", Rgb::WHITE, 1.0, 1.0)
    }
}

fn unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}
