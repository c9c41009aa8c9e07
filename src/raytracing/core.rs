use rand::Rng;

use super::color::LinearColor;
use super::math::{Ray, Vec3};

/// Hits closer than this to the ray origin are ignored, otherwise secondary
/// rays would collide with the surface they start from.
pub const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: LinearColor,
    /// mix factor between the direct light and the mirror reflection
    pub shininess: f64,
    // stored for scene files that set it, no shading uses it yet
    pub transparency: f64,
    /// standard deviation of the noise added to the surface normal
    pub roughness: f64,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            color: LinearColor::WHITE,
            shininess: 0.0,
            transparency: 0.0,
            roughness: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Solid {
    Sphere { center: Vec3, radius: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject {
    pub solid: Solid,
    pub material: Material,
}

pub struct RaycastResult<'a> {
    pub hitted_object: &'a SceneObject,
    pub t: f64,
    pub hit_point: Vec3,
}

impl SceneObject {
    pub fn sphere(center: Vec3, radius: f64, material: Material) -> SceneObject {
        SceneObject {
            solid: Solid::Sphere { center, radius },
            material,
        }
    }

    /// Distance along the ray to the surface, `None` when the ray misses.
    ///
    /// A ray starting inside the sphere reports the far intersection. An
    /// origin lying exactly on the surface counts as outside, and a tangent
    /// ray counts as a hit.
    pub fn intersection(&self, ray: &Ray) -> Option<f64> {
        match self.solid {
            Solid::Sphere { center, radius } => {
                let r2 = radius * radius;
                let oc = center - ray.origin();
                let is_inside = oc.squared_len() < r2;
                // the direction is unit length so this is already a distance
                let t_c = oc.dot(ray.direction());
                if !is_inside && t_c < 0.0 {
                    return None;
                }
                let d2 = (ray.at(t_c) - center).squared_len();
                if !is_inside && d2 > r2 {
                    return None;
                }
                let t_offset = (r2 - d2).max(0.0).sqrt();
                if is_inside {
                    Some(t_c + t_offset)
                } else {
                    Some(t_c - t_offset)
                }
            }
        }
    }

    /// Outward unit normal at `point`, perturbed by the material roughness.
    pub fn normal_at<R: Rng + ?Sized>(&self, point: Vec3, rng: &mut R) -> Vec3 {
        let normal = match self.solid {
            Solid::Sphere { center, radius } => (point - center) / radius,
        };
        let normal = normal.try_normalize().unwrap_or(normal);
        let roughness = self.material.roughness;
        if roughness <= 0.0 {
            return normal;
        }
        (normal + Vec3::gaussian(rng, roughness))
            .try_normalize()
            .unwrap_or(normal)
    }
}

/// Nearest object hit by the ray. Objects are scanned in order and the first
/// one wins when two are at the same distance.
pub fn hit<'a>(objects: &'a [SceneObject], ray: &Ray) -> Option<RaycastResult<'a>> {
    let mut closest_t = f64::INFINITY;
    let mut closest_object = None;
    for object in objects {
        if let Some(t) = object.intersection(ray) {
            // avoid t too small (shadow acne)
            if t <= EPSILON {
                continue;
            }
            if t < closest_t {
                closest_t = t;
                closest_object = Some(object);
            }
        }
    }

    closest_object.map(|object| RaycastResult {
        hitted_object: object,
        t: closest_t,
        hit_point: ray.at(closest_t),
    })
}

/// True when some object lies on the ray before `max_distance`.
pub fn is_occluded(objects: &[SceneObject], ray: &Ray, max_distance: f64) -> bool {
    objects.iter().any(|object| {
        object
            .intersection(ray)
            .is_some_and(|t| t > EPSILON && t < max_distance)
    })
}
