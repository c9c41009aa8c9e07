use image::{ImageBuffer, ImageResult, Rgba};
use log::info;

use crate::raytracing::render::Frame;

/// Copy the frame in an RGBA buffer. Pixels the lens skipped stay fully
/// transparent.
pub fn to_rgba_image(frame: &Frame) -> ImageBuffer<Rgba<u8>, Vec<u8>> {
    let mut buffer = ImageBuffer::from_pixel(frame.width(), frame.height(), Rgba([0, 0, 0, 0]));
    for (x, y, pixel) in frame.enumerate() {
        if let Some(color) = pixel {
            buffer.put_pixel(x, y, color.into());
        }
    }
    buffer
}

pub fn save_png(frame: &Frame, path: &str) -> ImageResult<()> {
    to_rgba_image(frame).save(path)?;
    info!("Saved {}", path);
    Ok(())
}
