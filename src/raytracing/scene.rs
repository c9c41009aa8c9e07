//! Scene description shared by every render worker.
//!
//! A [`SceneBuilder`] collects objects while a scene file is read and keeps
//! the "current material" that newly added spheres pick up. Calling
//! [`SceneBuilder::build`] validates everything and freezes it into a
//! [`Scene`], which is never modified afterward.

use thiserror::Error;

use super::camera::{Camera, Lens};
use super::color::{Exposure, LinearColor};
use super::core::{hit, is_occluded, Material, RaycastResult, SceneObject, Solid};
use super::light::Light;
use super::math::{Ray, Vec3};

pub const DEFAULT_BOUNCES: u32 = 4;
/// Deepest mirror recursion a scene may ask for, each bounce is a stack frame
/// on the render worker.
pub const MAX_BOUNCES: u32 = 64;

/// Configuration errors: a scene that fails these checks is never rendered.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("the {0} lens is not supported")]
    UnsupportedLens(Lens),

    #[error("sphere #{index} has non positive radius {radius}")]
    NonPositiveRadius { index: usize, radius: f64 },

    #[error("invalid image size {width}x{height}")]
    InvalidImageSize { width: u32, height: u32 },

    #[error("{bounces} reflection bounces requested, at most {max} are allowed")]
    TooManyBounces { bounces: u32, max: u32 },
}

#[derive(Debug, Clone)]
pub struct Scene {
    width: u32,
    height: u32,
    camera: Camera,
    exposure: Exposure,
    bounces: u32,
    objects: Vec<SceneObject>,
    lights: Vec<Light>,
}

impl Scene {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn exposure(&self) -> Exposure {
        self.exposure
    }

    /// Maximum number of mirror bounces followed from an eye ray.
    pub fn bounces(&self) -> u32 {
        self.bounces
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn nearest_hit(&self, ray: &Ray) -> Option<RaycastResult<'_>> {
        hit(&self.objects, ray)
    }

    pub fn is_occluded(&self, ray: &Ray, max_distance: f64) -> bool {
        is_occluded(&self.objects, ray, max_distance)
    }
}

#[derive(Debug, Clone)]
pub struct SceneBuilder {
    width: u32,
    height: u32,
    pub camera: Camera,
    pub exposure: Exposure,
    pub bounces: u32,
    /// applied to every sphere added from now on
    pub material: Material,
    objects: Vec<SceneObject>,
    lights: Vec<Light>,
}

impl SceneBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            camera: Camera::default(),
            exposure: Exposure::default(),
            bounces: DEFAULT_BOUNCES,
            material: Material::default(),
            objects: Vec::new(),
            lights: Vec::new(),
        }
    }

    /// Back to a white, matte, smooth material.
    pub fn reset_material(&mut self) {
        self.material = Material::default();
    }

    pub fn set_color(&mut self, color: LinearColor) {
        self.material.color = color;
    }

    pub fn add_sphere(&mut self, center: Vec3, radius: f64) {
        self.objects
            .push(SceneObject::sphere(center, radius, self.material));
    }

    /// Sun shining from `direction`, with the current color.
    pub fn add_sun(&mut self, direction: Vec3) {
        self.lights.push(Light::Sun {
            direction,
            color: self.material.color,
        });
    }

    /// Bulb placed at `position`, with the current color.
    pub fn add_bulb(&mut self, position: Vec3) {
        self.lights.push(Light::Bulb {
            position,
            color: self.material.color,
        });
    }

    pub fn build(self) -> Result<Scene, SceneError> {
        if self.width == 0 || self.height == 0 {
            return Err(SceneError::InvalidImageSize {
                width: self.width,
                height: self.height,
            });
        }
        if self.bounces > MAX_BOUNCES {
            return Err(SceneError::TooManyBounces {
                bounces: self.bounces,
                max: MAX_BOUNCES,
            });
        }
        if self.camera.lens == Lens::Panorama {
            return Err(SceneError::UnsupportedLens(self.camera.lens));
        }
        for (index, object) in self.objects.iter().enumerate() {
            let Solid::Sphere { radius, .. } = object.solid;
            // written so that NaN is rejected too
            if !(radius > 0.0) {
                return Err(SceneError::NonPositiveRadius { index, radius });
            }
        }

        Ok(Scene {
            width: self.width,
            height: self.height,
            camera: self.camera,
            exposure: self.exposure,
            bounces: self.bounces,
            objects: self.objects,
            lights: self.lights,
        })
    }
}
