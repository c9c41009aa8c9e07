use std::error::Error;
use std::fs;
use std::sync::atomic::AtomicBool;

use clap::{Parser, ValueEnum};
use log::{error, info, LevelFilter};

use sphere_raytracer::output;
use sphere_raytracer::raytracing::parser::{ImageData, SceneParser};
use sphere_raytracer::raytracing::render::{raytrace_scene, RenderOptions};

mod logger;

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// the input path to the scene file
    scene: String,
    /// where to save the png, overrides the name given in the scene file
    #[arg(short, long)]
    output: Option<String>,
    /// seed used by rough materials, random when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// number of render threads, all the cores when omitted
    #[arg(short = 'j', long)]
    threads: Option<usize>,
    /// logging verbosity
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    logger::init_logger(args.log_level.into());

    let content = fs::read_to_string(&args.scene)?;
    let ImageData {
        output: scene_output,
        scene,
    } = SceneParser::new(&content)
        .parse_scene()
        .inspect_err(|err| error!("{}: {}", args.scene, err))?;
    info!(
        "Loaded {}: {}x{}, {} objects, {} lights",
        args.scene,
        scene.width(),
        scene.height(),
        scene.objects().len(),
        scene.lights().len()
    );

    let options = RenderOptions {
        seed: args.seed,
        threads: args.threads,
    };
    // nothing cancels a command line render, the token is for embedders
    let cancel = AtomicBool::new(false);
    let frame = raytrace_scene(&scene, &options, &cancel)?;

    let path = args.output.unwrap_or(scene_output);
    output::save_png(&frame, &path)?;
    Ok(())
}
