use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use glam::Vec3;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use std::path::PathBuf;

use fizziks::{
    config::scene::SceneConfig,
    physics::{BodyHandle, PhysicsWorld},
};

/// Frame time the render loop hands to the simulation.
const FRAME_DT: f32 = 0.016;
const WALKER_LIMIT: f32 = 15.0;
const WALKER_TURNAROUND: f32 = 14.0;
/// Impacts slower than this are too soft to report as bounces.
const BOUNCE_THRESHOLD: f32 = 0.4;

/// Headless rigid body demo: drops a ball on the ground while a box patrols.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Scene file to load. Defaults to scene.toml in the config directory,
    /// then the built-in demo scene.
    scene: Option<PathBuf>,

    /// Simulated time to run, in seconds.
    #[arg(short, long, default_value_t = 10.0)]
    seconds: f32,
}

struct App {
    world: PhysicsWorld,
    scene: SceneConfig,
    walker: Option<BodyHandle>,
    walker_velocity: Vec3,
    frame: u64,
}

impl App {
    fn new(scene_path: Option<PathBuf>) -> Result<Self> {
        let scene = load_scene(scene_path)?;
        Self::from_scene(scene)
    }

    fn from_scene(scene: SceneConfig) -> Result<Self> {
        let (world, handles) = scene
            .build_world()
            .context("Failed to build physics world from scene")?;
        let walker = scene.find("Walker").map(|index| handles[index]);

        Ok(Self {
            world,
            scene,
            walker,
            walker_velocity: Vec3::new(2.0, 0.0, 0.0),
            frame: 0,
        })
    }

    fn run(&mut self, seconds: f32) {
        let frames = (seconds / FRAME_DT).ceil() as u64;
        info!("Simulating {} frames ({:.1}s)", frames, seconds);

        for _ in 0..frames {
            self.update();
        }

        info!(
            "Finished after {} physics steps, kinetic energy {:.3}",
            self.world.step_count(),
            self.world.total_kinetic_energy()
        );
        self.report_positions();
    }

    fn update(&mut self) {
        self.world.update(FRAME_DT);
        self.update_walker(FRAME_DT);
        self.frame += 1;

        for event in self.world.events() {
            if event.contact.closing_speed > BOUNCE_THRESHOLD {
                info!(
                    "Bounce: {} hit {} at {:.2} m/s",
                    self.label(event.first),
                    self.label(event.second),
                    event.contact.closing_speed
                );
            }
        }

        if self.frame % 60 == 0 {
            self.report_positions();
        }
    }

    /// The walker is driven by the host, patrolling along x.
    fn update_walker(&mut self, dt: f32) {
        let Some(handle) = self.walker else {
            return;
        };
        let Some(body) = self.world.body_mut(handle) else {
            return;
        };

        body.position += self.walker_velocity * dt;
        if body.position.x > WALKER_LIMIT {
            body.position.x = WALKER_TURNAROUND;
            self.walker_velocity.x *= -1.0;
        }
        if body.position.x < -WALKER_LIMIT {
            body.position.x = -WALKER_TURNAROUND;
            self.walker_velocity.x *= -1.0;
        }
    }

    fn report_positions(&self) {
        for (handle, body, _) in self.world.bodies() {
            if body.is_static() {
                continue;
            }
            let [r, g, b] = body.colour();
            log::debug!("{} colour ({:.1}, {:.1}, {:.1})", self.label(handle), r, g, b);
            info!(
                "frame {:>5} | {:<8} pos ({:>7.3}, {:>7.3}, {:>7.3}) vel ({:>7.3}, {:>7.3}, {:>7.3})",
                self.frame,
                self.label(handle),
                body.position.x,
                body.position.y,
                body.position.z,
                body.velocity.x,
                body.velocity.y,
                body.velocity.z
            );
        }
    }

    fn label(&self, handle: BodyHandle) -> String {
        // Handles are issued in scene order
        self.scene
            .bodies
            .get(handle.index())
            .and_then(|body| body.name.clone())
            .unwrap_or_else(|| format!("#{}", handle.index()))
    }
}

fn load_scene(explicit: Option<PathBuf>) -> Result<SceneConfig> {
    if let Some(path) = explicit {
        info!("Loading scene from {}", path.display());
        return SceneConfig::load(&path)
            .with_context(|| format!("Failed to load scene {}", path.display()));
    }

    match default_scene_path() {
        Some(path) if path.exists() => {
            info!("Loading scene from {}", path.display());
            SceneConfig::load(&path)
                .with_context(|| format!("Failed to load scene {}", path.display()))
        }
        _ => {
            info!("No scene file found, using the built-in demo scene");
            Ok(SceneConfig::demo())
        }
    }
}

fn default_scene_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "fizziks", "fizziks").map(|dirs| dirs.config_dir().join("scene.toml"))
}

fn main() -> Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
        .context("Failed to initialise logger")?;

    let args = Args::parse();

    let mut app = match App::new(args.scene) {
        Ok(app) => app,
        Err(e) => {
            log::error!("Startup failed: {:#}", e);
            return Err(e);
        }
    };
    app.run(args.seconds);
    Ok(())
}
