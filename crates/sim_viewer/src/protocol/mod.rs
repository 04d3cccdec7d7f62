//! Messages exchanged with the simulation
//!
//! Inbound streams (terrain, contact visuals, frames, sim info, shapes) are
//! produced by the transport thread; [`GuiCommand`] flows the other way.
//! Every message is plain owned data so it can cross the thread boundary.

mod shape;

pub use shape::{Shape, ShapeKind, Shapes};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::foundation::math::{Quat, Rgb, Vec3};

/// 8-bit RGB color as sent on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// White
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Create a color from its channels
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels normalized to the unit range
    pub fn to_rgb(self) -> Rgb {
        Rgb::new(
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }
}

/// Kind of simulated object, decides the body geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContactType {
    /// Rendered from a model file
    Mesh,
    /// Rendered as a pyramid pointing along +X
    Aircraft,
    /// Rendered as a unit sphere
    Sphere,
    /// Anything else; rendered as a unit sphere
    #[default]
    Other,
}

/// Snapshot of one simulated entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Identifier, unique within a frame
    pub id: i32,
    /// World position
    pub position: Vec3,
    /// World orientation
    pub orientation: Quat,
    /// Body kind
    pub contact_type: ContactType,
    /// `false` marks the entity for removal
    pub active: bool,
}

impl Contact {
    /// Active contact at `position` with identity orientation
    pub fn new(id: i32, position: Vec3) -> Self {
        Self {
            id,
            position,
            orientation: Quat::identity(),
            contact_type: ContactType::Other,
            active: true,
        }
    }

    /// Set the orientation
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the contact type
    pub fn with_type(mut self, contact_type: ContactType) -> Self {
        self.contact_type = contact_type;
        self
    }

    /// Mark the contact inactive
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// One authoritative world snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Simulation time in seconds
    pub time: f64,
    /// Entities present in this frame
    pub contacts: Vec<Contact>,
}

impl Frame {
    /// Create a frame
    pub fn new(time: f64, contacts: Vec<Contact>) -> Self {
        Self { time, contacts }
    }
}

/// How a contact visual colors its body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VisualMode {
    /// Body takes the visual's color
    #[default]
    Color,
    /// Body keeps its texture
    Textured,
}

/// Visual style for one entity id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactVisual {
    /// Entity this visual applies to
    pub id: i32,
    /// Model name, resolved through the asset locator
    pub name: String,
    /// Body and trail color
    pub color: Color,
    /// Body and label opacity
    pub opacity: f64,
    /// Model scale before the global scale factor
    pub scale: f64,
    /// Color vs texture
    pub visual_mode: VisualMode,
}

impl ContactVisual {
    /// Opaque, unit-scale visual in color mode
    pub fn new(id: i32, name: impl Into<String>, color: Color) -> Self {
        Self {
            id,
            name: name.into(),
            color,
            opacity: 1.0,
            scale: 1.0,
            visual_mode: VisualMode::Color,
        }
    }
}

/// Terrain, grid, origin axes and background settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtmTerrain {
    /// Cache key
    pub terrain_name: String,
    /// Load terrain geometry
    pub enable_terrain: bool,
    /// Show the ground grid
    pub enable_grid: bool,
    /// Grid extent
    pub grid_size: f64,
    /// Grid line spacing
    pub grid_spacing: f64,
    /// Show origin axes
    pub show_origin: bool,
    /// Origin axis length
    pub origin_length: f64,
    /// Background color
    pub background: Color,
    /// Resolved texture image, filled in on cache miss
    pub texture_file: Option<PathBuf>,
    /// Resolved terrain mesh, filled in on cache miss
    pub mesh_file: Option<PathBuf>,
    /// Offset subtracted from terrain vertices
    pub translate: Vec3,
}

impl Default for UtmTerrain {
    fn default() -> Self {
        Self {
            terrain_name: String::new(),
            enable_terrain: false,
            enable_grid: true,
            grid_size: 10_000.0,
            grid_spacing: 100.0,
            show_origin: true,
            origin_length: 1.0,
            background: Color::default(),
            texture_file: None,
            mesh_file: None,
            translate: Vec3::zeros(),
        }
    }
}

/// Simulation status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimInfo {
    /// Simulation time in seconds
    pub time: f64,
    /// Requested time warp
    pub desired_warp: f64,
    /// Achieved time warp
    pub actual_warp: f64,
    /// The simulation is terminating
    pub shutting_down: bool,
}

/// Pulse-style control record sent back to the simulation
///
/// At most one field is `true` in any record that leaves the viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuiCommand {
    /// Increase the time warp
    pub inc_warp: bool,
    /// Decrease the time warp
    pub dec_warp: bool,
    /// Pause or resume
    pub toggle_pause: bool,
    /// Advance one step while paused
    pub single_step: bool,
    /// Ask for cached state to be resent
    pub request_cached: bool,
    /// The viewer is closing
    pub shutting_down: bool,
}

impl GuiCommand {
    /// Number of fields currently set
    pub fn active_count(&self) -> usize {
        [
            self.inc_warp,
            self.dec_warp,
            self.toggle_pause,
            self.single_step,
            self.request_cached,
            self.shutting_down,
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_color_normalization() {
        let rgb = Color::new(255, 0, 51).to_rgb();
        assert_relative_eq!(rgb, Rgb::new(1.0, 0.0, 0.2), epsilon = 1e-12);
    }

    #[test]
    fn test_gui_command_active_count() {
        let mut cmd = GuiCommand::default();
        assert_eq!(cmd.active_count(), 0);
        cmd.toggle_pause = true;
        assert_eq!(cmd.active_count(), 1);
    }
}
