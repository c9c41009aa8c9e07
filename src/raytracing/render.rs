//! Recursive ray tracing of a [`Scene`] into a grid of display colors.
//!
//! Rows are split in stripes rendered in parallel with rayon. Every stripe
//! owns its slice of the output and a random generator seeded from the render
//! seed and the stripe index, so a fixed seed gives the same image whatever
//! the number of threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use thiserror::Error;

use super::color::{DisplayColor, LinearColor};
use super::math::Ray;
use super::scene::Scene;

const ROWS_PER_STRIPE: usize = 8;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("render cancelled")]
    Cancelled,

    #[error("cannot create the render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// seed for the normal perturbation of rough materials, random when unset
    pub seed: Option<u64>,
    /// size of a dedicated thread pool, the global rayon pool when unset
    pub threads: Option<usize>,
}

/// Rendered image, row major with (0, 0) at the top-left corner. A `None`
/// pixel was skipped because the lens cast no ray through it.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<Option<DisplayColor>>,
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Option<DisplayColor> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn enumerate(&self) -> impl Iterator<Item = (u32, u32, Option<DisplayColor>)> + '_ {
        let width = self.width;
        self.pixels
            .iter()
            .enumerate()
            .map(move |(i, pixel)| (i as u32 % width, i as u32 / width, *pixel))
    }
}

/// Linear color seen along `ray`, before exposure. Mirror reflections are
/// followed while `depth` is below the scene bounce limit.
pub fn trace_ray<R: Rng + ?Sized>(scene: &Scene, ray: &Ray, depth: u32, rng: &mut R) -> LinearColor {
    let Some(result) = scene.nearest_hit(ray) else {
        return LinearColor::TRANSPARENT;
    };
    let material = result.hitted_object.material;
    let normal = result.hitted_object.normal_at(result.hit_point, rng);

    let mut direct = LinearColor::BLACK;
    for light in scene.lights() {
        let Some(shadow_ray) = light.shadow_ray(result.hit_point) else {
            continue;
        };
        // check if some object occlude the light
        if scene.is_occluded(&shadow_ray, light.distance_from(result.hit_point)) {
            continue;
        }
        direct += light.lambert(&shadow_ray, normal, material.color);
    }
    // a surface hit is opaque no matter how much light reaches it
    direct.a = 1.0;

    if material.shininess == 0.0 || depth >= scene.bounces() {
        return direct;
    }
    let reflected = Ray::new(result.hit_point, ray.direction().reflect(normal))
        .map(|bounce| trace_ray(scene, &bounce, depth + 1, rng))
        .unwrap_or(LinearColor::TRANSPARENT);
    // a reflection into empty space darkens the surface but keeps it opaque
    let mut color = direct.lerp(reflected, material.shininess);
    color.a = direct.a;
    color
}

/// Final display color of pixel (x, y), `None` when the lens skips it.
pub fn render_pixel<R: Rng + ?Sized>(scene: &Scene, x: u32, y: u32, rng: &mut R) -> Option<DisplayColor> {
    let ray = scene
        .camera()
        .make_eye_ray(x as f64, y as f64, scene.width(), scene.height())?;
    let exposure = scene.exposure();
    let color = trace_ray(scene, &ray, 0, rng).apply_exposure(|v| exposure.apply(v));
    Some(color.to_display_color(true))
}

/// Render every pixel of the scene. `cancel` is polled before each stripe;
/// once it is set the render stops with [`RenderError::Cancelled`].
pub fn raytrace_scene(
    scene: &Scene,
    options: &RenderOptions,
    cancel: &AtomicBool,
) -> Result<Frame, RenderError> {
    match options.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?;
            pool.install(|| render_stripes(scene, options, cancel))
        }
        None => render_stripes(scene, options, cancel),
    }
}

fn render_stripes(
    scene: &Scene,
    options: &RenderOptions,
    cancel: &AtomicBool,
) -> Result<Frame, RenderError> {
    let width = scene.width();
    let height = scene.height();
    let seed = options.seed.unwrap_or_else(rand::random);
    debug!("render seed {}", seed);
    info!(
        "Rendering {}x{} with {} objects and {} lights on {} threads",
        width,
        height,
        scene.objects().len(),
        scene.lights().len(),
        rayon::current_num_threads()
    );

    let start = Instant::now();
    let mut pixels = vec![None; width as usize * height as usize];
    let stripe_size = ROWS_PER_STRIPE * width as usize;
    pixels
        .par_chunks_mut(stripe_size)
        .enumerate()
        .try_for_each(|(stripe_index, stripe)| {
            if cancel.load(Ordering::Relaxed) {
                return Err(RenderError::Cancelled);
            }
            let mut rng = StdRng::seed_from_u64(seed ^ stripe_index as u64);
            let first_row = stripe_index * ROWS_PER_STRIPE;
            for (i, pixel) in stripe.iter_mut().enumerate() {
                let x = (i % width as usize) as u32;
                let y = (first_row + i / width as usize) as u32;
                *pixel = render_pixel(scene, x, y, &mut rng);
            }
            Ok(())
        })?;
    info!("Rendered in {:?}", start.elapsed());

    Ok(Frame {
        width,
        height,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raytracing::camera::Lens;
    use crate::raytracing::color::Exposure;
    use crate::raytracing::math::Vec3;
    use crate::raytracing::scene::{SceneBuilder, MAX_BOUNCES};

    fn forward_ray() -> Ray {
        Ray::new(Vec3::zero(), Vec3::new(0.0, 0.0, -1.0)).unwrap()
    }

    fn lit_sphere(shininess: f64, bounces: u32) -> SceneBuilder {
        let mut builder = SceneBuilder::new(16, 16);
        builder.bounces = bounces;
        builder.add_sun(Vec3::new(0.0, 0.0, 1.0));
        builder.set_color(LinearColor::rgb(0.8, 0.4, 0.2));
        builder.material.shininess = shininess;
        builder.add_sphere(Vec3::new(0.0, 0.0, -3.0), 1.0);
        builder
    }

    #[test]
    fn test_miss_is_transparent() {
        let scene = SceneBuilder::new(4, 4).build().unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            trace_ray(&scene, &forward_ray(), 0, &mut rng),
            LinearColor::TRANSPARENT
        );
    }

    #[test]
    fn test_direct_lighting() {
        let scene = lit_sphere(0.0, 4).build().unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let color = trace_ray(&scene, &forward_ray(), 0, &mut rng);
        // the sun shines straight on the visible pole
        assert!((color.r - 0.8).abs() < 1e-9);
        assert!((color.g - 0.4).abs() < 1e-9);
        assert!((color.b - 0.2).abs() < 1e-9);
        assert_eq!(color.a, 1.0);
    }

    #[test]
    fn test_occluder_casts_a_shadow() {
        let mut builder = SceneBuilder::new(4, 4);
        builder.add_bulb(Vec3::new(0.0, 0.0, 0.0));
        builder.add_sphere(Vec3::new(0.0, 0.0, -4.0), 1.0);
        // sits between the bulb and the visible point but away from the eye ray
        builder.add_sphere(Vec3::new(0.0, 0.0, -1.5), 0.2);
        let scene = builder.build().unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let ray = Ray::new(Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.0, -0.5, -3.0)).unwrap();
        let color = trace_ray(&scene, &ray, 0, &mut rng);
        assert_eq!((color.r, color.g, color.b), (0.0, 0.0, 0.0));
        assert_eq!(color.a, 1.0);
    }

    #[test]
    fn test_occluder_behind_the_bulb_does_not_shadow() {
        let mut builder = SceneBuilder::new(4, 4);
        builder.add_bulb(Vec3::new(0.0, 0.0, -1.0));
        builder.add_sphere(Vec3::new(0.0, 0.0, -4.0), 1.0);
        // on the same line as the bulb, but farther from the surface than it
        builder.add_sphere(Vec3::new(0.0, 0.0, 3.0), 0.5);
        let scene = builder.build().unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let color = trace_ray(&scene, &forward_ray(), 0, &mut rng);
        // surface at z = -3, bulb 2 units away
        assert!((color.r - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_mirror_picks_up_reflected_color() {
        let mut builder = SceneBuilder::new(4, 4);
        builder.add_bulb(Vec3::zero());
        builder.set_color(LinearColor::rgb(0.0, 1.0, 0.0));
        // behind the eye, only visible through the mirror
        builder.add_sphere(Vec3::new(0.0, 0.0, 3.0), 1.0);
        builder.set_color(LinearColor::WHITE);
        builder.material.shininess = 1.0;
        builder.add_sphere(Vec3::new(0.0, 0.0, -3.0), 1.0);
        let scene = builder.build().unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let color = trace_ray(&scene, &forward_ray(), 0, &mut rng);
        // green surface 2 units away from the bulb
        assert!(color.r.abs() < 1e-9);
        assert!((color.g - 0.25).abs() < 1e-9);
        assert!((color.a - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_reflection_into_nothing_darkens_but_stays_opaque() {
        let scene = lit_sphere(0.25, 4).build().unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let color = trace_ray(&scene, &forward_ray(), 0, &mut rng);
        assert!((color.r - 0.8 * 0.75).abs() < 1e-9);
        assert_eq!(color.a, 1.0);
    }

    #[test]
    fn test_shiny_sphere_pixels_are_opaque() {
        let scene = lit_sphere(1.0, 4).build().unwrap();
        let options = RenderOptions {
            seed: Some(7),
            threads: None,
        };
        let frame = raytrace_scene(&scene, &options, &AtomicBool::new(false)).unwrap();
        let center = frame.get(8, 8).unwrap();
        assert_eq!(center.a(), 255.0);
        assert_eq!(frame.get(0, 0).unwrap().a(), 0.0);
    }

    #[test]
    fn test_zero_bounces_ignores_shininess() {
        let options = RenderOptions {
            seed: Some(3),
            threads: None,
        };
        let cancel = AtomicBool::new(false);
        let matte = raytrace_scene(&lit_sphere(0.0, 0).build().unwrap(), &options, &cancel).unwrap();
        let shiny = raytrace_scene(&lit_sphere(0.9, 0).build().unwrap(), &options, &cancel).unwrap();
        assert_eq!(matte, shiny);
    }

    #[test]
    fn test_recursion_stops_between_facing_mirrors() {
        let mut builder = SceneBuilder::new(4, 4);
        builder.bounces = MAX_BOUNCES;
        builder.add_bulb(Vec3::zero());
        builder.material.shininess = 1.0;
        builder.add_sphere(Vec3::new(0.0, 0.0, -3.0), 1.0);
        builder.add_sphere(Vec3::new(0.0, 0.0, 3.0), 1.0);
        let scene = builder.build().unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let color = trace_ray(&scene, &forward_ray(), 0, &mut rng);
        assert!(color.r.is_finite());
        assert_eq!(color.a, 1.0);
    }

    #[test]
    fn test_frame_layout_and_exposure() {
        let mut builder = lit_sphere(0.0, 0);
        builder.exposure = Exposure::Exponential(1.0);
        let scene = builder.build().unwrap();
        let options = RenderOptions {
            seed: Some(1),
            threads: Some(2),
        };
        let frame = raytrace_scene(&scene, &options, &AtomicBool::new(false)).unwrap();
        assert_eq!((frame.width(), frame.height()), (16, 16));
        assert_eq!(frame.enumerate().count(), 256);

        let corner = frame.get(0, 0).unwrap();
        assert_eq!(corner.a(), 0.0);
        let center = frame.get(8, 8).unwrap();
        assert_eq!(center.a(), 255.0);
        let expected = LinearColor::rgb(0.8, 0.4, 0.2)
            .apply_exposure(|v| 1.0 - (-v).exp())
            .to_display_color(true);
        // the center ray is slightly off axis, the pole is within one step
        assert!((center.r() - expected.r()).abs() <= 1.0);
        assert!(frame.get(16, 0).is_none());
    }

    #[test]
    fn test_fisheye_leaves_corners_empty() {
        let mut builder = lit_sphere(0.0, 0);
        builder.camera.lens = Lens::Fisheye;
        let scene = builder.build().unwrap();
        let frame = raytrace_scene(&scene, &RenderOptions::default(), &AtomicBool::new(false)).unwrap();
        assert!(frame.get(0, 0).is_none());
        assert!(frame.get(15, 15).is_none());
        assert!(frame.get(8, 8).is_some());
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let mut builder = lit_sphere(0.5, 2);
        builder.material.roughness = 0.2;
        builder.add_sphere(Vec3::new(1.5, 0.0, -4.0), 1.0);
        let scene = builder.build().unwrap();
        let cancel = AtomicBool::new(false);
        let single = RenderOptions {
            seed: Some(42),
            threads: Some(1),
        };
        let many = RenderOptions {
            seed: Some(42),
            threads: Some(4),
        };
        let a = raytrace_scene(&scene, &single, &cancel).unwrap();
        let b = raytrace_scene(&scene, &many, &cancel).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_cancelled_render() {
        let scene = lit_sphere(0.0, 0).build().unwrap();
        let cancel = AtomicBool::new(true);
        let result = raytrace_scene(&scene, &RenderOptions::default(), &cancel);
        assert!(matches!(result, Err(RenderError::Cancelled)));
    }
}
