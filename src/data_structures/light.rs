use crate::config::LightConfig;

/// Converts a `0xRRGGBB` colour into linear-ish float channels in `[0, 1]`.
pub fn color_from_hex(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Light coming from above: surfaces facing up get `sky_color`, surfaces facing down get
/// `ground_color`, everything in between is blended.
#[derive(Clone, Debug, PartialEq)]
pub struct HemisphereLight {
    pub sky_color: [f32; 3],
    pub ground_color: [f32; 3],
    pub intensity: f32,
    pub position: cgmath::Vector3<f32>,
}

impl HemisphereLight {
    pub fn from_config(config: &LightConfig) -> Self {
        Self {
            sky_color: color_from_hex(config.sky_color),
            ground_color: color_from_hex(config.ground_color),
            intensity: config.intensity,
            position: config.position.into(),
        }
    }

    /// Unit vector towards the sky. Straight up when the light sits at the origin.
    pub fn direction(&self) -> cgmath::Vector3<f32> {
        use cgmath::InnerSpace;
        if self.position.magnitude2() > 0.0 {
            self.position.normalize()
        } else {
            cgmath::Vector3::unit_y()
        }
    }
}
