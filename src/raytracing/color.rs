//! Linear light colors and their conversion to display values.
//!
//! All lighting math happens on [`LinearColor`], which is never clamped.
//! [`LinearColor::to_display_color`] is the one place where a color is gamma
//! encoded and clamped to the 0-255 range.

use std::ops;

/// Color proportional to physical light intensity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

/// Gamma encoded color with every channel in [0, 255].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayColor {
    r: f64,
    g: f64,
    b: f64,
    a: f64,
}

/// Tone mapping applied to the red, green and blue channels before display.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Exposure {
    #[default]
    Identity,
    /// `1 - e^(-x * v)` with the given `v`
    Exponential(f64),
}

impl Exposure {
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Exposure::Identity => x,
            Exposure::Exponential(v) => 1.0 - (-x * v).exp(),
        }
    }
}

impl ops::Add<LinearColor> for LinearColor {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: LinearColor) -> Self::Output {
        LinearColor {
            r: self.r + rhs.r,
            g: self.g + rhs.g,
            b: self.b + rhs.b,
            a: self.a + rhs.a,
        }
    }
}

impl ops::AddAssign<LinearColor> for LinearColor {
    #[inline(always)]
    fn add_assign(&mut self, rhs: LinearColor) {
        *self = *self + rhs;
    }
}

impl ops::Mul<LinearColor> for LinearColor {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: LinearColor) -> Self::Output {
        LinearColor {
            r: self.r * rhs.r,
            g: self.g * rhs.g,
            b: self.b * rhs.b,
            a: self.a * rhs.a,
        }
    }
}

impl ops::Mul<f64> for LinearColor {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: f64) -> Self::Output {
        LinearColor {
            r: self.r * rhs,
            g: self.g * rhs,
            b: self.b * rhs,
            a: self.a * rhs,
        }
    }
}

impl LinearColor {
    pub const BLACK: LinearColor = LinearColor::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: LinearColor = LinearColor::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: LinearColor = LinearColor::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> LinearColor {
        LinearColor { r, g, b, a }
    }

    pub const fn rgb(r: f64, g: f64, b: f64) -> LinearColor {
        LinearColor::new(r, g, b, 1.0)
    }

    /// Linear interpolation, `self` at `t = 0` and `other` at `t = 1`.
    pub fn lerp(self, other: LinearColor, t: f64) -> LinearColor {
        self * (1.0 - t) + other * t
    }

    /// Maps red, green and blue through `f`, alpha is left untouched.
    pub fn apply_exposure(self, f: impl Fn(f64) -> f64) -> LinearColor {
        LinearColor {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
            a: self.a,
        }
    }

    pub fn to_display_color(self, rounded: bool) -> DisplayColor {
        let finish = |v: f64| {
            let v = to_byte_range(v);
            if rounded {
                v.round()
            } else {
                v
            }
        };
        DisplayColor {
            r: finish(gamma_encode(self.r) * 255.0),
            g: finish(gamma_encode(self.g) * 255.0),
            b: finish(gamma_encode(self.b) * 255.0),
            a: finish(self.a * 255.0),
        }
    }
}

impl DisplayColor {
    pub fn r(&self) -> f64 {
        self.r
    }

    pub fn g(&self) -> f64 {
        self.g
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn a(&self) -> f64 {
        self.a
    }
}

impl From<DisplayColor> for image::Rgba<u8> {
    fn from(value: DisplayColor) -> Self {
        // channels are already inside [0, 255], rounding keeps the cast exact
        image::Rgba([
            value.r.round() as u8,
            value.g.round() as u8,
            value.b.round() as u8,
            value.a.round() as u8,
        ])
    }
}

/// sRGB transfer function.
fn gamma_encode(v: f64) -> f64 {
    if v <= 0.0031308 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

fn to_byte_range(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 255.0)
}
