use std::fmt;

use super::math::{Ray, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lens {
    #[default]
    Normal,
    Fisheye,
    /// recognised in scene files but not supported by the renderer
    Panorama,
}

impl fmt::Display for Lens {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Lens::Normal => "normal",
            Lens::Fisheye => "fisheye",
            Lens::Panorama => "panorama",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    /// Not normalized: a longer forward vector narrows the field of view.
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub lens: Lens,
}

impl Default for Camera {
    /// Camera at the origin looking toward -z.
    fn default() -> Self {
        Self {
            eye: Vec3::zero(),
            forward: Vec3::new(0.0, 0.0, -1.0),
            right: Vec3::new(1.0, 0.0, 0.0),
            up: Vec3::new(0.0, 1.0, 0.0),
            lens: Lens::Normal,
        }
    }
}

impl Camera {
    /// Replace the forward vector and rebuild right and up around it.
    pub fn set_forward(&mut self, forward: Vec3) {
        self.forward = forward;
        self.orthonormalize();
    }

    /// Replace the up vector, then make it perpendicular to forward.
    pub fn set_up(&mut self, up: Vec3) {
        self.up = up;
        self.orthonormalize();
    }

    fn orthonormalize(&mut self) {
        // keep the previous basis when forward and up are parallel
        if let Some(right) = self.forward.cross(self.up).try_normalize() {
            self.right = right;
        }
        if let Some(up) = self.right.cross(self.forward).try_normalize() {
            self.up = up;
        }
    }

    /// Ray through pixel (x, y) of a `width` x `height` image, with (0, 0) at
    /// the top-left corner. `None` means no ray is cast for this pixel: the
    /// fisheye lens rejects points outside its disk.
    ///
    /// Panics on [`Lens::Panorama`]; scenes using it are refused when built.
    pub fn make_eye_ray(&self, x: f64, y: f64, width: u32, height: u32) -> Option<Ray> {
        let size = width.max(height) as f64;
        let s_x = (2.0 * x - width as f64) / size;
        let s_y = (height as f64 - 2.0 * y) / size;

        let direction = match self.lens {
            Lens::Normal => self.forward + self.right * s_x + self.up * s_y,
            Lens::Fisheye => {
                let forward_len = self.forward.len();
                let s_x = s_x / forward_len;
                let s_y = s_y / forward_len;
                let r2 = s_x * s_x + s_y * s_y;
                if r2 > 1.0 {
                    return None;
                }
                let forward = self.forward.try_normalize()?;
                forward * (1.0 - r2).sqrt() + self.right * s_x + self.up * s_y
            }
            Lens::Panorama => unimplemented!("panorama lens"),
        };
        Ray::new(self.eye, direction)
    }
}
