//! Renderer capability consumed by the synchronization core
//!
//! The core never builds draw calls itself. It describes primitives as
//! [`Geometry`] values, hands them to a [`Renderer`], and keeps the returned
//! [`RenderHandle`] for as long as the primitive should stay on screen.
//! Dropping the handle removes the primitive, so a handle is released
//! exactly once no matter which path discards it.

mod geometry;
mod headless;

pub use geometry::Geometry;
pub use headless::{HeadlessRenderer, PrimitiveRecord};

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::foundation::math::{Rgb, Transform, Vec3};

slotmap::new_key_type! {
    /// Identifier of one primitive owned by a renderer
    pub struct PrimitiveId;
}

/// Color and opacity of a primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    /// Flat color; `None` leaves the renderer default (e.g. a texture)
    pub color: Option<Rgb>,
    /// Opacity in `[0, 1]`
    pub opacity: f64,
}

impl Appearance {
    /// Opaque primitive with the given color
    pub fn opaque(color: Rgb) -> Self {
        Self {
            color: Some(color),
            opacity: 1.0,
        }
    }

    /// Primitive with the given color and opacity
    pub fn new(color: Rgb, opacity: f64) -> Self {
        Self {
            color: Some(color),
            opacity,
        }
    }

    /// Opaque primitive without a color override
    pub fn uncolored() -> Self {
        Self {
            color: None,
            opacity: 1.0,
        }
    }
}

/// Screen-space text overlay slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextSlot {
    /// Simulation time
    Time,
    /// Time warp
    Warp,
    /// Heading of the followed entity
    Heading,
    /// Altitude of the followed entity
    Altitude,
    /// Render frame rate
    Fps,
}

/// Drawing backend
///
/// Implementations own every primitive they hand out an id for. Calls with
/// an id that was already removed must be ignored.
pub trait Renderer {
    /// Add a primitive to the scene
    fn add_primitive(&mut self, geometry: Geometry, appearance: Appearance) -> PrimitiveId;

    /// Remove a primitive from the scene
    fn remove_primitive(&mut self, id: PrimitiveId);

    /// Place a primitive in the world
    fn set_transform(&mut self, id: PrimitiveId, transform: &Transform);

    /// Change the flat color of a primitive
    fn set_color(&mut self, id: PrimitiveId, color: Rgb);

    /// Change the opacity of a primitive
    fn set_opacity(&mut self, id: PrimitiveId, opacity: f64);

    /// Position the active camera
    fn set_camera_pose(&mut self, position: Vec3, focal_point: Vec3);

    /// Set the viewport background
    fn set_background_color(&mut self, color: Rgb);

    /// Replace the contents of a text overlay slot
    fn set_text(&mut self, slot: TextSlot, text: &str);

    /// The simulation is shutting down; the window owner should close
    fn request_close(&mut self) {}
}

/// Shared, single-threaded access to the renderer
///
/// Every component of the core holds a clone. Each method borrows the
/// renderer only for the duration of the call.
#[derive(Clone)]
pub struct Scene {
    renderer: Rc<RefCell<dyn Renderer>>,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene").finish_non_exhaustive()
    }
}

impl Scene {
    /// Wrap a shared renderer
    pub fn new<R: Renderer + 'static>(renderer: Rc<RefCell<R>>) -> Self {
        Self { renderer }
    }

    /// Add a primitive and take ownership of it
    pub fn add(&self, geometry: Geometry, appearance: Appearance) -> RenderHandle {
        let id = self.renderer.borrow_mut().add_primitive(geometry, appearance);
        RenderHandle {
            id,
            scene: self.clone(),
        }
    }

    /// Position the active camera
    pub fn set_camera_pose(&self, position: Vec3, focal_point: Vec3) {
        self.renderer.borrow_mut().set_camera_pose(position, focal_point);
    }

    /// Set the viewport background
    pub fn set_background_color(&self, color: Rgb) {
        self.renderer.borrow_mut().set_background_color(color);
    }

    /// Replace the contents of a text overlay slot
    pub fn set_text(&self, slot: TextSlot, text: &str) {
        self.renderer.borrow_mut().set_text(slot, text);
    }

    /// Ask the window owner to close
    pub fn request_close(&self) {
        self.renderer.borrow_mut().request_close();
    }
}

/// Owning handle to one renderer primitive
///
/// Removes the primitive from the renderer when dropped.
pub struct RenderHandle {
    id: PrimitiveId,
    scene: Scene,
}

impl fmt::Debug for RenderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RenderHandle").field(&self.id).finish()
    }
}

impl RenderHandle {
    /// Renderer-side id of the primitive
    pub fn id(&self) -> PrimitiveId {
        self.id
    }

    /// Place the primitive in the world
    pub fn set_transform(&self, transform: &Transform) {
        self.scene.renderer.borrow_mut().set_transform(self.id, transform);
    }

    /// Change the flat color
    pub fn set_color(&self, color: Rgb) {
        self.scene.renderer.borrow_mut().set_color(self.id, color);
    }

    /// Change the opacity
    pub fn set_opacity(&self, opacity: f64) {
        self.scene.renderer.borrow_mut().set_opacity(self.id, opacity);
    }
}

impl Drop for RenderHandle {
    fn drop(&mut self) {
        match self.scene.renderer.try_borrow_mut() {
            Ok(mut renderer) => renderer.remove_primitive(self.id),
            Err(_) => log::error!("Renderer busy while releasing primitive {:?}; primitive leaked", self.id),
        }
    }
}
