//! Light type of the universal scene graph

use glam::Vec3;

/// Kind of light source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LightKind {
    #[default]
    Point,
    Directional,
    Spot,
    Ambient,
}

/// A light source, positioned by the node carrying the same name.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Name of the node this light is attached to; set during node
    /// assembly (back-reference, not ownership).
    pub name: String,
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
    /// Outer cone angle in radians (spot lights).
    pub outer_cone: f32,
    /// Inner cone angle in radians (spot lights).
    pub inner_cone: f32,
    pub attenuation_constant: f32,
    pub attenuation_linear: f32,
    pub attenuation_quadratic: f32,
}

impl Default for Light {
    fn default() -> Self {
        Light {
            name: String::new(),
            kind: LightKind::default(),
            color: Vec3::ONE,
            intensity: 1.0,
            outer_cone: std::f32::consts::PI,
            inner_cone: std::f32::consts::PI,
            attenuation_constant: 1.0,
            attenuation_linear: 0.0,
            attenuation_quadratic: 0.0,
        }
    }
}
