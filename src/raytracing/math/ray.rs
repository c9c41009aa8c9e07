use super::Vec3;

/// Half line starting at `origin`. The direction is always unit length: the
/// only way to build a ray is [`Ray::new`], which normalizes it.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
}

impl Ray {
    /// Returns `None` when `direction` has zero length or is not finite.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Ray> {
        let direction = direction.try_normalize()?;
        Some(Ray { origin, direction })
    }

    #[inline(always)]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline(always)]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }
}
