use geng::prelude::*;
use log::{debug, error, info, trace, warn};
use particle_field::{
    ConfigError, FieldConfig, FrameHost, ParticleField, Point, Preset, Rgba, SchedulerState,
    Scheduler, StatsSurface, Surface, SurfaceSize,
};

mod client;
#[cfg(not(target_arch = "wasm32"))]
mod headless;

use client::*;
#[cfg(not(target_arch = "wasm32"))]
use headless::*;

/// Query parameters the loading page uses for other things.
#[cfg(target_arch = "wasm32")]
const PAGE_KEYS: &[&str] = &["video"];

#[derive(structopt::StructOpt, Debug, Clone)]
pub struct FieldOpts {
    /// JSON file with field options, using the camelCase names.
    #[structopt(long = "config")]
    config: Option<std::path::PathBuf>,
    #[structopt(long = "preset", default_value = "calm")]
    preset: Preset,
    #[structopt(long = "particle-count")]
    particle_count: Option<usize>,
    #[structopt(long = "particle-color")]
    particle_color: Option<Rgba>,
    #[structopt(long = "line-color")]
    line_color: Option<Rgba>,
    #[structopt(long = "line-opacity")]
    line_opacity: Option<f32>,
    #[structopt(long = "line-distance")]
    line_distance: Option<f32>,
    #[structopt(long = "line-width")]
    line_width: Option<f32>,
    #[structopt(long = "particle-speed")]
    particle_speed: Option<f32>,
    #[structopt(long = "particle-size")]
    particle_size: Option<f32>,
    #[structopt(long = "glow-radius")]
    glow_radius: Option<f32>,
    #[structopt(long = "mouse-interaction")]
    mouse_interaction: Option<bool>,
    #[structopt(long = "mouse-radius")]
    mouse_radius: Option<f32>,
    #[structopt(long = "repulsion-strength")]
    repulsion_strength: Option<f32>,
    #[structopt(long = "damping")]
    damping: Option<f32>,
    #[structopt(long = "seed")]
    seed: Option<u64>,
}

impl FieldOpts {
    /// Preset or config file first, then individual flags on top.
    fn field_config(&self) -> Result<FieldConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => FieldConfig::load(path)?,
            None => FieldConfig::preset(self.preset),
        };
        macro_rules! apply {
            ($opts:expr => $config:expr; $($field:ident),*) => {
                $(
                    if let Some(value) = $opts.$field {
                        $config.$field = value;
                    }
                )*
            };
        }
        apply!(
            self => config;
            particle_count,
            particle_color,
            line_color,
            line_opacity,
            line_distance,
            line_width,
            particle_speed,
            particle_size,
            glow_radius,
            mouse_interaction,
            mouse_radius,
            repulsion_strength,
            damping
        );
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(structopt::StructOpt, Debug, Clone)]
enum Command {
    /// Animate in a window (the default).
    #[structopt(name = "window")]
    Window,
    /// Run the simulation without a window and log statistics.
    #[structopt(name = "headless")]
    Headless(HeadlessOpts),
}

#[derive(structopt::StructOpt, Debug, Clone)]
pub struct HeadlessOpts {
    /// Stop after this many frames, 0 runs until interrupted.
    #[structopt(long = "frames", default_value = "600")]
    frames: u64,
    #[structopt(long = "fps", default_value = "60")]
    fps: f64,
    #[structopt(long = "width", default_value = "1280")]
    width: f32,
    #[structopt(long = "height", default_value = "720")]
    height: f32,
    /// Move a virtual pointer in a circle over the surface.
    #[structopt(long = "pointer-sweep")]
    pointer_sweep: bool,
}

#[derive(structopt::StructOpt, Debug)]
struct Opts {
    #[structopt(long = "log-level")]
    log_level: Option<log::LevelFilter>,
    #[structopt(long = "background", default_value = "#05070d")]
    background: Rgba,
    #[structopt(flatten)]
    field_opts: FieldOpts,
    #[structopt(subcommand)]
    command: Option<Command>,
}

#[cfg(target_arch = "wasm32")]
fn parse_opts() -> Opts {
    let mut args = Vec::<String>::new();
    args.push("neocity-loading".to_owned()); // `Program` itself is the first arg
    match stdweb::web::window()
        .location()
        .and_then(|location| location.href().ok())
        .and_then(|href| url::Url::parse(&href).ok())
    {
        Some(url) => {
            for (key, value) in url.query_pairs() {
                if PAGE_KEYS.contains(&&*key) {
                    continue;
                }
                args.push("--".to_owned() + &*key);
                args.push(value.into_owned());
            }
        }
        None => warn!("Failed to read window.location.href, using defaults"),
    }
    trace!("href => args: {:?}", args);
    match <Opts as structopt::StructOpt>::from_iter_safe(&args) {
        Ok(opts) => opts,
        Err(e) => {
            warn!("Ignoring page query: {}", e.message);
            structopt::StructOpt::from_iter(&["neocity-loading"])
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_opts() -> Opts {
    structopt::StructOpt::from_args()
}

fn main() {
    logger::init();
    trace!("Initializing");

    let opts = parse_opts();
    if let Some(level) = opts.log_level {
        log::set_max_level(level);
    }
    trace!("Options used:\n{:#?}", opts);

    let config = match opts.field_opts.field_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid particle field options: {}, using defaults", e);
            FieldConfig::default()
        }
    };
    debug!("Field config: {:?}", config);
    let field = match ParticleField::new(config) {
        Ok(field) => field,
        Err(e) => {
            error!("Particle field disabled: {}", e);
            return;
        }
    };

    match opts.command {
        #[cfg(not(target_arch = "wasm32"))]
        Some(Command::Headless(headless_opts)) => {
            let report = run_headless(&headless_opts, field);
            info!("Headless run finished after {} frames", report.frames);
        }
        #[cfg(target_arch = "wasm32")]
        Some(Command::Headless(_)) => warn!("Headless mode is not available in the browser"),
        Some(Command::Window) | None => {
            let geng = Rc::new(Geng::new(geng::ContextOptions {
                title: "NeoCity".to_owned(),
                ..default()
            }));
            let app = FieldApp::new(&geng, field, opts.background);
            geng::run(geng, app);
        }
    }
}
