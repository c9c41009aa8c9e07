use log::LevelFilter;

/// Starts the stderr logger at the level picked with `--log-level`.
/// `RUST_LOG` directives such as `sphere_raytracer::raytracing::parser=debug`
/// still apply on top of it.
pub fn init_logger(level: LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp_millis()
        .init();
}
