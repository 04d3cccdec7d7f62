//! # Update Scheduler
//!
//! Rate-limited tick that drains the incoming streams and drives every
//! consumer-side component. Each tick that passes the rate limiter runs, in
//! order:
//!
//! 1. terrain: last message only
//! 2. visual styles: every message, in arrival order
//! 3. frames: inactive markers from every frame, then the last frame, then
//!    one shape aging pass
//! 4. sim info: last message only; shutdown if any message asks for it
//! 5. shapes: every message, with an extra aging pass after each one that
//!    is not the last of the batch
//! 6. pending rescale
//! 7. camera pose and overlay text
//!
//! The scheduler is single-threaded and never blocks: calling [`Updater::tick`]
//! too soon simply returns [`TickStatus::Skipped`].

use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use crate::assets::AssetLocator;
use crate::camera::CameraController;
use crate::command::{CommandChannel, CommandSink};
use crate::config::{ConfigError, ViewerConfig};
use crate::foundation::time::{FrameTimer, RateLimiter};
use crate::overlay::{OverlayText, Telemetry};
use crate::protocol::SimInfo;
use crate::registry::EntityRegistry;
use crate::render::Scene;
use crate::shapes::ShapeGc;
use crate::streams::IncomingStreams;
use crate::terrain::TerrainCache;


/// Outcome of one [`Updater::tick`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// Called too soon; nothing changed
    Skipped,
    /// Streams were drained and the scene updated
    Updated,
    /// The simulation announced its shutdown; the render loop should exit
    ShutdownRequested,
}

/// Consumer-side orchestrator
pub struct Updater {
    scene: Scene,
    streams: Arc<IncomingStreams>,
    limiter: RateLimiter,
    frame_timer: FrameTimer,
    terrain: TerrainCache,
    registry: EntityRegistry,
    shapes: ShapeGc,
    camera: CameraController,
    commands: CommandChannel,
    sim_info: SimInfo,
    frame_time: f64,
    scale: f64,
    scale_pending: bool,
    shutting_down: bool,
}

impl std::fmt::Debug for Updater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Updater")
            .field("registry", &self.registry)
            .field("shapes", &self.shapes.len())
            .field("camera", &self.camera)
            .field("frame_time", &self.frame_time)
            .field("scale", &self.scale)
            .field("shutting_down", &self.shutting_down)
            .finish()
    }
}

impl Updater {
    /// Build the scheduler and draw the default scene
    pub fn new(
        config: &ViewerConfig,
        scene: Scene,
        streams: Arc<IncomingStreams>,
        locator: Rc<dyn AssetLocator>,
        sink: impl CommandSink + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let terrain = TerrainCache::new(
            scene.clone(),
            Rc::clone(&locator),
            config.grid_size,
            config.grid_spacing,
            config.origin_length,
        );
        let mut registry = EntityRegistry::new(scene.clone(), locator);
        registry.set_trails_enabled(config.trails_enabled);

        log::info!(
            "Update scheduler ready: {} Hz, camera {:?}",
            config.max_update_rate,
            config.initial_camera_mode
        );

        Ok(Self {
            shapes: ShapeGc::new(scene.clone()),
            scene,
            streams,
            limiter: RateLimiter::new(config.max_update_rate),
            frame_timer: FrameTimer::new(),
            terrain,
            registry,
            camera: CameraController::new(config.initial_camera_mode, config.follow_distance),
            commands: CommandChannel::new(sink),
            sim_info: SimInfo::default(),
            frame_time: 0.0,
            scale: 1.0,
            scale_pending: false,
            shutting_down: false,
        })
    }

    /// Run one tick against the monotonic clock
    pub fn tick(&mut self) -> TickStatus {
        self.tick_at(Instant::now())
    }

    /// Run one tick as if the clock read `now`
    pub fn tick_at(&mut self, now: Instant) -> TickStatus {
        self.frame_timer.update(now);
        if !self.limiter.try_acquire(now) {
            log::trace!("Tick skipped by rate limiter");
            return TickStatus::Skipped;
        }

        self.update_terrain();
        self.update_visuals();
        self.update_frames();
        self.update_sim_info();
        self.update_shapes();
        self.update_scale();
        self.update_camera();
        self.update_overlay();

        if self.shutting_down {
            TickStatus::ShutdownRequested
        } else {
            TickStatus::Updated
        }
    }

    fn update_terrain(&mut self) {
        if let Some(utm) = self.streams.terrain.drain().pop() {
            self.terrain.apply(utm);
        }
    }

    fn update_visuals(&mut self) {
        for visual in self.streams.visuals.drain() {
            self.registry.set_visual(visual);
        }
    }

    fn update_frames(&mut self) {
        let frames = self.streams.frames.drain();
        let Some(last) = frames.last() else {
            return;
        };

        let flagged = self.registry.flag_inactive(&frames);
        if flagged > 0 {
            log::debug!("{} entities reported inactive", flagged);
        }
        self.frame_time = last.time;
        self.registry.upsert(&last.contacts);
        self.shapes.age();
    }

    fn update_sim_info(&mut self) {
        let infos = self.streams.sim_info.drain();
        let Some(last) = infos.last() else {
            return;
        };

        let shutdown_seen = infos.iter().any(|info| info.shutting_down);
        self.sim_info = last.clone();
        if shutdown_seen && !self.shutting_down {
            log::info!("Simulation is shutting down");
            self.shutting_down = true;
            self.commands.mark_torn_down();
            self.scene.request_close();
        }
    }

    fn update_shapes(&mut self) {
        let batches = self.streams.shapes.drain();
        let count = batches.len();
        for (i, batch) in batches.into_iter().enumerate() {
            self.shapes.create_all(batch.shapes);
            if i + 1 < count {
                self.shapes.age();
            }
        }
    }

    fn update_scale(&mut self) {
        if self.scale_pending {
            self.registry.rescale(self.scale);
            self.scale_pending = false;
        }
    }

    fn update_camera(&mut self) {
        if let Some(pose) = self.camera.update(self.registry.entities()) {
            self.scene.set_camera_pose(pose.position, pose.focal_point);
        }
    }

    fn update_overlay(&self) {
        let target = self.registry.get(self.camera.follow_id()).map(|actor| actor.contact());
        let telemetry = Telemetry {
            frame_time: self.frame_time,
            sim_info: &self.sim_info,
            fps: self.frame_timer.current_fps(),
            target,
        };
        OverlayText::format(&telemetry).publish(&self.scene);
    }

    // User triggers

    /// Cycle Follow, Free, Offset
    pub fn next_camera_mode(&mut self) {
        self.camera.next_mode();
    }

    /// Follow the next higher tracked id
    pub fn increment_follow_target(&mut self) {
        self.camera.increment_follow_target();
    }

    /// Follow the next lower tracked id
    pub fn decrement_follow_target(&mut self) {
        self.camera.decrement_follow_target();
    }

    /// Move the follow camera further away
    pub fn increment_follow_distance(&mut self) {
        self.camera.increment_follow_distance();
    }

    /// Move the follow camera closer
    pub fn decrement_follow_distance(&mut self) {
        self.camera.decrement_follow_distance();
    }

    /// Turn entity trails on or off
    pub fn toggle_trails(&mut self) {
        let enabled = !self.registry.trails_enabled();
        self.registry.set_trails_enabled(enabled);
    }

    /// Double the global entity scale
    pub fn increment_scale(&mut self) {
        self.set_scale(self.scale * 2.0);
    }

    /// Halve the global entity scale
    pub fn decrement_scale(&mut self) {
        self.set_scale(self.scale * 0.5);
    }

    /// Restore the global entity scale to 1
    pub fn reset_scale(&mut self) {
        self.set_scale(1.0);
    }

    /// Reset the scale and hand the camera back to the user
    pub fn reset_view(&mut self) {
        self.reset_scale();
        self.camera.set_mode(crate::camera::CameraMode::Free);
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
        self.scale_pending = true;
    }

    /// Send an increment-warp pulse
    pub fn increment_warp(&mut self) {
        self.commands.increment_warp();
    }

    /// Send a decrement-warp pulse
    pub fn decrement_warp(&mut self) {
        self.commands.decrement_warp();
    }

    /// Send a toggle-pause pulse
    pub fn toggle_pause(&mut self) {
        self.commands.toggle_pause();
    }

    /// Send a single-step pulse
    pub fn single_step(&mut self) {
        self.commands.single_step();
    }

    /// Send a request-cached pulse
    pub fn request_cached(&mut self) {
        self.commands.request_cached();
    }

    /// Tell the simulation the viewer is closing
    pub fn notify_shutting_down(&mut self) {
        self.commands.notify_shutting_down();
    }

    // Accessors

    /// Tracked entities
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Live ephemeral shapes
    pub fn shapes(&self) -> &ShapeGc {
        &self.shapes
    }

    /// Terrain descriptor cache
    pub fn terrain(&self) -> &TerrainCache {
        &self.terrain
    }

    /// Camera state machine
    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    /// Outgoing command channel
    pub fn commands(&self) -> &CommandChannel {
        &self.commands
    }

    /// Latest simulation status
    pub fn sim_info(&self) -> &SimInfo {
        &self.sim_info
    }

    /// Time stamp of the last applied frame
    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }

    /// Global scale factor, applied on the next effectful tick
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Whether the simulation announced its shutdown
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    /// Render-loop frame timing
    pub fn frame_timer(&self) -> &FrameTimer {
        &self.frame_timer
    }
}
