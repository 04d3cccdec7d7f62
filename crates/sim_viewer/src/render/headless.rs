//! Recording renderer without a graphics backend
//!
//! Keeps every primitive, the camera pose, the background and the text slots
//! in memory. Used by tests and by headless runs of the viewer.

use slotmap::SlotMap;
use std::collections::HashMap;

use super::{Appearance, Geometry, PrimitiveId, Renderer, TextSlot};
use crate::foundation::math::{Rgb, Transform, Vec3};

/// Current state of one recorded primitive
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveRecord {
    /// Geometry it was created with
    pub geometry: Geometry,
    /// Latest color and opacity
    pub appearance: Appearance,
    /// Latest placement
    pub transform: Transform,
}

/// [`Renderer`] that records calls instead of drawing
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    primitives: SlotMap<PrimitiveId, PrimitiveRecord>,
    camera_pose: Option<(Vec3, Vec3)>,
    background: Rgb,
    texts: HashMap<TextSlot, String>,
    added: usize,
    removed: usize,
    close_requested: bool,
}

impl HeadlessRenderer {
    /// Create an empty renderer
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a live primitive
    pub fn get(&self, id: PrimitiveId) -> Option<&PrimitiveRecord> {
        self.primitives.get(id)
    }

    /// Iterate over live primitives
    pub fn primitives(&self) -> impl Iterator<Item = (PrimitiveId, &PrimitiveRecord)> {
        self.primitives.iter()
    }

    /// Number of live primitives
    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    /// Number of live primitives whose geometry matches `pred`
    pub fn count_where(&self, pred: impl Fn(&Geometry) -> bool) -> usize {
        self.primitives.values().filter(|p| pred(&p.geometry)).count()
    }

    /// Primitives added since creation
    pub fn added_count(&self) -> usize {
        self.added
    }

    /// Primitives removed since creation
    pub fn removed_count(&self) -> usize {
        self.removed
    }

    /// Last camera pose as `(position, focal_point)`
    pub fn camera_pose(&self) -> Option<(Vec3, Vec3)> {
        self.camera_pose
    }

    /// Current background color
    pub fn background(&self) -> Rgb {
        self.background
    }

    /// Current contents of a text slot
    pub fn text(&self, slot: TextSlot) -> Option<&str> {
        self.texts.get(&slot).map(String::as_str)
    }

    /// Whether a close was requested
    pub fn close_requested(&self) -> bool {
        self.close_requested
    }
}

impl Renderer for HeadlessRenderer {
    fn add_primitive(&mut self, geometry: Geometry, appearance: Appearance) -> PrimitiveId {
        self.added += 1;
        self.primitives.insert(PrimitiveRecord {
            geometry,
            appearance,
            transform: Transform::default(),
        })
    }

    fn remove_primitive(&mut self, id: PrimitiveId) {
        if self.primitives.remove(id).is_some() {
            self.removed += 1;
        } else {
            log::warn!("Removing unknown primitive {:?}", id);
        }
    }

    fn set_transform(&mut self, id: PrimitiveId, transform: &Transform) {
        if let Some(p) = self.primitives.get_mut(id) {
            p.transform = *transform;
        }
    }

    fn set_color(&mut self, id: PrimitiveId, color: Rgb) {
        if let Some(p) = self.primitives.get_mut(id) {
            p.appearance.color = Some(color);
        }
    }

    fn set_opacity(&mut self, id: PrimitiveId, opacity: f64) {
        if let Some(p) = self.primitives.get_mut(id) {
            p.appearance.opacity = opacity;
        }
    }

    fn set_camera_pose(&mut self, position: Vec3, focal_point: Vec3) {
        self.camera_pose = Some((position, focal_point));
    }

    fn set_background_color(&mut self, color: Rgb) {
        self.background = color;
    }

    fn set_text(&mut self, slot: TextSlot, text: &str) {
        self.texts.insert(slot, text.to_string());
    }

    fn request_close(&mut self) {
        self.close_requested = true;
    }
}
