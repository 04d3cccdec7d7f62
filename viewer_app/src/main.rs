//! Headless viewer demo
//!
//! Runs the synchronization core against a synthetic simulation: a producer
//! thread circles a few entities around the origin, draws some annotation
//! shapes and finally announces its shutdown. The render loop ticks the
//! updater against a headless renderer and logs what it sees.
//!
//! Usage: `headless_viewer [config.toml|config.ron]`

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Receiver;
use nalgebra::{UnitQuaternion, Vector3};
use sim_viewer::config::ConfigError;
use sim_viewer::foundation::logging;
use sim_viewer::prelude::*;
use thiserror::Error;

const FRAME_COUNT: usize = 60;
const FRAME_PERIOD: Duration = Duration::from_millis(100);
const DEMO_UPDATE_RATE: f64 = 10.0;

#[derive(Debug, Error)]
enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Simulation thread panicked")]
    Producer,
}

fn load_config() -> Result<ViewerConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => ViewerConfig::load_from_file(&path),
        None => Ok(ViewerConfig::default().with_max_update_rate(DEMO_UPDATE_RATE)),
    }
}

/// Synthetic producer: three entities on a circle, one of which leaves early
fn simulate(streams: &IncomingStreams) {
    streams.push_terrain(UtmTerrain {
        terrain_name: "demo".to_string(),
        enable_terrain: true,
        background: Color::new(32, 32, 48),
        ..Default::default()
    });
    streams.push_visual(ContactVisual::new(1, "zephyr", Color::new(255, 128, 0)));
    streams.push_visual(ContactVisual::new(2, "fixed-wing", Color::new(0, 160, 255)));

    for step in 0..FRAME_COUNT {
        let time = step as f64 * FRAME_PERIOD.as_secs_f64();
        let contacts = (1..=3)
            .map(|id| {
                let angle = TAU * (time / 6.0 + f64::from(id) / 3.0);
                let position = Vector3::new(100.0 * angle.cos(), 100.0 * angle.sin(), 50.0 * f64::from(id));
                let heading = UnitQuaternion::from_euler_angles(0.0, 0.0, angle + TAU / 4.0);
                let contact_type = match id {
                    1 => ContactType::Mesh,
                    2 => ContactType::Aircraft,
                    _ => ContactType::Sphere,
                };
                let contact = Contact::new(id, position).with_orientation(heading).with_type(contact_type);
                if id == 3 && step >= FRAME_COUNT / 2 {
                    contact.inactive()
                } else {
                    contact
                }
            })
            .collect();
        streams.push_frame(Frame::new(time, contacts));

        if step % 10 == 0 {
            streams.push_shapes(Shapes::from(vec![
                Shape::new(ShapeKind::Sphere { center: Vector3::zeros(), radius: 5.0 })
                    .with_color(Color::new(255, 0, 0))
                    .with_ttl(5),
                Shape::new(ShapeKind::Text { text: format!("t = {:.1}", time), center: Vector3::new(0.0, 0.0, 20.0) }),
            ]));
        }
        streams.push_sim_info(SimInfo { time, desired_warp: 1.0, actual_warp: 1.0, shutting_down: false });

        thread::sleep(FRAME_PERIOD);
    }

    streams.push_sim_info(SimInfo { shutting_down: true, ..SimInfo::default() });
}

fn drain_commands(commands: &Receiver<GuiCommand>) {
    for command in commands.try_iter() {
        log::info!("Outgoing command: {:?}", command);
    }
}

fn run() -> Result<(), AppError> {
    let config = load_config()?;
    logging::init(&config.log_level);
    log::info!("Starting headless viewer");

    let renderer = Rc::new(RefCell::new(HeadlessRenderer::new()));
    let streams = Arc::new(IncomingStreams::new());
    let (command_tx, command_rx) = crossbeam_channel::unbounded();
    let locator = Rc::new(FileSearch::new(config.asset_search_paths.clone()));

    let mut updater = Updater::new(&config, Scene::new(renderer.clone()), Arc::clone(&streams), locator, command_tx)?;

    let producer = {
        let streams = Arc::clone(&streams);
        thread::spawn(move || simulate(&streams))
    };

    let mut effectful = 0usize;
    loop {
        match updater.tick() {
            TickStatus::Skipped => {}
            TickStatus::Updated => {
                effectful += 1;
                match effectful {
                    5 => updater.increment_warp(),
                    10 => updater.toggle_trails(),
                    20 => updater.increment_follow_target(),
                    30 => updater.next_camera_mode(),
                    _ => {}
                }
            }
            TickStatus::ShutdownRequested => break,
        }
        drain_commands(&command_rx);
        thread::sleep(Duration::from_millis(16));
    }

    updater.notify_shutting_down();
    drain_commands(&command_rx);
    producer.join().map_err(|_| AppError::Producer)?;

    let renderer = renderer.borrow();
    log::info!(
        "Stopped after {} updates: {} entities, {} live shapes, {} primitives ({} added, {} removed)",
        effectful,
        updater.registry().len(),
        updater.shapes().len(),
        renderer.primitive_count(),
        renderer.added_count(),
        renderer.removed_count()
    );
    if let Some(time) = renderer.text(TextSlot::Time) {
        log::info!("Last frame time: {}", time);
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("headless_viewer: {}", e);
        std::process::exit(1);
    }
}
