//! Whitted style ray tracer for scenes made of spheres, suns and bulbs.
//!
//! [`raytracing::parser`] reads a scene file into an immutable
//! [`raytracing::scene::Scene`], [`raytracing::render::raytrace_scene`] turns
//! it into a [`raytracing::render::Frame`] of display colors and
//! [`output::save_png`] writes that frame to disk.

pub mod output;
pub mod raytracing;
