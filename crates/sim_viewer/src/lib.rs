//! # Sim Viewer
//!
//! Real-time synchronization core of a simulation visualizer. A producer
//! thread pushes world updates into per-stream queues; the render thread
//! calls [`Updater::tick`] at its own cadence and the core reconciles those
//! updates against a renderable scene.
//!
//! ## Features
//!
//! - **Rate-limited updates**: ticks called too often are free no-ops
//! - **Entity lifecycle**: create, refresh, dim and remove tracked entities
//! - **Ephemeral shapes**: time-to-live annotations aged by frame arrival
//! - **Camera follow**: Follow/Free/Offset modes with wraparound targeting
//! - **Terrain cache**: descriptors resolved once per name
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sim_viewer::prelude::*;
//! use std::{cell::RefCell, rc::Rc, sync::Arc};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ViewerConfig::default();
//!     let renderer = Rc::new(RefCell::new(HeadlessRenderer::new()));
//!     let streams = Arc::new(IncomingStreams::new());
//!     let (commands, _rx) = crossbeam_channel::unbounded();
//!     let locator = Rc::new(FileSearch::new(config.asset_search_paths.clone()));
//!
//!     let mut updater = Updater::new(&config, Scene::new(renderer), streams, locator, commands)?;
//!     while updater.tick() != TickStatus::ShutdownRequested {
//!         std::thread::sleep(std::time::Duration::from_millis(16));
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod protocol;
pub mod render;
pub mod shapes;
pub mod assets;
pub mod terrain;
pub mod registry;
pub mod camera;
pub mod overlay;
pub mod command;
pub mod streams;
pub mod updater;

pub use updater::{TickStatus, Updater};

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        Updater, TickStatus,
        assets::{AssetLocator, FileSearch},
        camera::CameraMode,
        command::CommandSink,
        config::{Config, ViewerConfig},
        foundation::math::{Vec3, Quat, Transform},
        protocol::{Color, Contact, ContactType, ContactVisual, Frame, GuiCommand, Shape, ShapeKind, Shapes, SimInfo, UtmTerrain},
        render::{Renderer, Scene, HeadlessRenderer, Geometry, Appearance, TextSlot},
        streams::IncomingStreams,
    };
}
