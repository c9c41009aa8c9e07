pub mod camera;
pub mod color;
pub mod core;
pub mod light;
pub mod math;
pub mod parser;
pub mod render;
pub mod scene;

pub use math::*;
