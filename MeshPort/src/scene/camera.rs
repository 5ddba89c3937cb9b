//! Camera type of the universal scene graph

/// A camera, positioned by the node carrying the same name.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Name of the node this camera is attached to; set during node
    /// assembly (back-reference, not ownership).
    pub name: String,
    /// Horizontal field of view in radians. Zero for orthographic cameras.
    pub horizontal_fov: f32,
    /// Width / height.
    pub aspect: f32,
    pub near_plane: f32,
    pub far_plane: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            name: String::new(),
            horizontal_fov: std::f32::consts::FRAC_PI_4,
            aspect: 0.0,
            near_plane: 0.1,
            far_plane: 1000.0,
        }
    }
}
