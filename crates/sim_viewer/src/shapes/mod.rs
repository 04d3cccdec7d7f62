//! Ephemeral shape garbage collection
//!
//! Shapes arrive from the simulation with a time-to-live counted in
//! authoritative frames. [`ShapeGc`] owns each live shape together with its
//! render handle and evicts it once the counter runs out, unless the shape
//! is persistent.

pub mod geometry;

use thiserror::Error;

use crate::protocol::Shape;
use crate::render::{Appearance, RenderHandle, Scene};

/// Opacities below this are treated as "unset" and render opaque
const OPACITY_EPSILON: f64 = 0.00001;

/// Shape construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    /// Wrong number of points for the shape kind
    #[error("invalid point count for {kind}: expected {expected}, got {actual}")]
    PointCount {
        /// Shape kind
        kind: &'static str,
        /// Accepted counts
        expected: String,
        /// Received count
        actual: usize,
    },
}

/// A live shape and the primitive drawing it
#[derive(Debug)]
struct LiveShape {
    shape: Shape,
    _handle: RenderHandle,
}

/// Owner of every live ephemeral shape
#[derive(Debug)]
pub struct ShapeGc {
    scene: Scene,
    shapes: Vec<LiveShape>,
}

impl ShapeGc {
    /// Create an empty collector drawing into `scene`
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            shapes: Vec::new(),
        }
    }

    /// Draw a shape and start tracking it
    ///
    /// A ttl of zero or less is raised to one: a freshly drawn shape always
    /// survives its first aging pass. Malformed shapes are rejected without
    /// touching the renderer.
    pub fn create(&mut self, mut shape: Shape) -> Result<(), ShapeError> {
        let geometry = geometry::build(&shape.kind, shape.color)?;

        // NaN counts as unset
        let opacity = if shape.opacity >= OPACITY_EPSILON { shape.opacity } else { 1.0 };
        let handle = self.scene.add(geometry, Appearance::new(shape.color.to_rgb(), opacity));

        if shape.ttl <= 0 {
            shape.ttl = 1;
        }
        self.shapes.push(LiveShape { shape, _handle: handle });
        Ok(())
    }

    /// Draw every shape in a batch, skipping and logging malformed ones
    pub fn create_all(&mut self, shapes: impl IntoIterator<Item = Shape>) {
        for shape in shapes {
            let kind = shape.kind.name();
            if let Err(e) = self.create(shape) {
                log::warn!("Skipping {} shape: {}", kind, e);
            }
        }
    }

    /// Decrement every ttl once and evict expired, non-persistent shapes
    pub fn age(&mut self) {
        let before = self.shapes.len();
        self.shapes.retain_mut(|live| {
            live.shape.ttl = live.shape.ttl.saturating_sub(1);
            live.shape.persistent || live.shape.ttl > 0
        });
        let evicted = before - self.shapes.len();
        if evicted > 0 {
            log::trace!("Evicted {} expired shapes", evicted);
        }
    }

    /// Number of live shapes
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Whether no shape is live
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Remaining ttl of each live shape, in creation order
    pub fn ttls(&self) -> Vec<i32> {
        self.shapes.iter().map(|live| live.shape.ttl).collect()
    }
}
