use super::color::LinearColor;
use super::math::{Ray, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Directional light infinitely far away, no falloff.
    Sun { direction: Vec3, color: LinearColor },
    /// Point light with inverse square falloff.
    Bulb { position: Vec3, color: LinearColor },
}

impl Light {
    pub fn color(&self) -> LinearColor {
        match self {
            Light::Sun { color, .. } | Light::Bulb { color, .. } => *color,
        }
    }

    /// Ray from `point` toward the light. `None` when the direction is
    /// undefined: a sun with a zero direction or a bulb sitting on the point.
    pub fn shadow_ray(&self, point: Vec3) -> Option<Ray> {
        match self {
            Light::Sun { direction, .. } => Ray::new(point, *direction),
            Light::Bulb { position, .. } => Ray::new(point, *position - point),
        }
    }

    pub fn distance_from(&self, point: Vec3) -> f64 {
        match self {
            Light::Sun { .. } => f64::INFINITY,
            Light::Bulb { position, .. } => position.distance(point),
        }
    }

    /// Diffuse light reaching a surface with the given `normal` and color.
    /// `shadow_ray` must start at the shaded point and aim at the light.
    pub fn lambert(&self, shadow_ray: &Ray, normal: Vec3, surface_color: LinearColor) -> LinearColor {
        let cosine = shadow_ray.direction().dot(normal).max(0.0);
        let falloff = match self {
            Light::Sun { .. } => 1.0,
            Light::Bulb { position, .. } => {
                let distance_squared = (*position - shadow_ray.origin()).squared_len();
                if distance_squared > 0.0 {
                    1.0 / distance_squared
                } else {
                    0.0
                }
            }
        };
        surface_color * self.color() * (cosine * falloff)
    }
}
